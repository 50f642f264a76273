//! Repository for the `users` table.

use keyholder_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{CreateUser, UpdateProfile, User, UserProfile};

/// Column list for `users` queries.
const COLUMNS: &str = "id, display_name, email, role, status, avatar_url, bio, country, \
                       created_at, updated_at";

/// Column list for public profile queries.
const PROFILE_COLUMNS: &str = "id, display_name, role, avatar_url, bio, country, created_at";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a user record, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (display_name, email, role) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.display_name)
            .bind(&input.email)
            .bind(&input.role)
            .fetch_one(pool)
            .await
    }

    /// Find a user by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List users, newest first.
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users \
             ORDER BY created_at DESC, id DESC \
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Change a user's account status. Returns `None` if the user does not exist.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET status = $2, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    /// Public profile of an active user.
    pub async fn find_profile(pool: &PgPool, id: DbId) -> Result<Option<UserProfile>, sqlx::Error> {
        let query = format!(
            "SELECT {PROFILE_COLUMNS} FROM users WHERE id = $1 AND status = 'active'"
        );
        sqlx::query_as::<_, UserProfile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Active users with `role` whose display name or country matches
    /// `pattern` (an `ILIKE` pattern), excluding `exclude_id`.
    pub async fn search(
        pool: &PgPool,
        role: &str,
        pattern: &str,
        exclude_id: DbId,
        limit: i64,
    ) -> Result<Vec<UserProfile>, sqlx::Error> {
        let query = format!(
            "SELECT {PROFILE_COLUMNS} FROM users \
             WHERE role = $1 AND status = 'active' AND id <> $3 \
               AND (display_name ILIKE $2 OR country ILIKE $2) \
             ORDER BY display_name, id \
             LIMIT $4"
        );
        sqlx::query_as::<_, UserProfile>(&query)
            .bind(role)
            .bind(pattern)
            .bind(exclude_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Overwrite the editable profile fields. Returns `None` if the user does
    /// not exist.
    pub async fn update_profile(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProfile,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET \
                display_name = $2, \
                bio = NULLIF(BTRIM($3), ''), \
                country = NULLIF(BTRIM($4), ''), \
                avatar_url = NULLIF(BTRIM($5), ''), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(input.display_name.trim())
            .bind(input.bio.as_deref())
            .bind(input.country.as_deref())
            .bind(input.avatar_url.as_deref())
            .fetch_optional(pool)
            .await
    }
}
