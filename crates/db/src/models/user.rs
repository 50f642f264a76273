//! User models and DTOs.

use keyholder_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub display_name: String,
    pub email: String,
    pub role: String,
    pub status: String,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub country: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// The fields of a user other people may see. No email, no account status.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserProfile {
    pub id: DbId,
    pub display_name: String,
    pub role: String,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub country: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for provisioning a user record.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub display_name: String,
    pub email: String,
    pub role: String,
}

/// DTO for a user editing their own profile. Role and email are fixed.
///
/// Empty `bio`, `country` and `avatar_url` values clear the field.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProfile {
    pub display_name: String,
    pub bio: Option<String>,
    pub country: Option<String>,
    pub avatar_url: Option<String>,
}

/// DTO for an admin changing a user's account status.
#[derive(Debug, Deserialize)]
pub struct UpdateUserStatus {
    pub status: String,
}
