//! Repository for the `tasks` table.

use keyholder_core::task::{Submission, TaskStatus};
use keyholder_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::task::{CreateTask, Task, TaskStatusCount};

/// Column list for `tasks` queries.
const COLUMNS: &str = "id, relationship_id, lock_id, created_by, title, description, \
    task_type, quiz_data, requires_photo, requires_text, time_reward_seconds, \
    time_penalty_seconds, status, submission_text, submission_photo_url, quiz_answer, \
    submitted_at, reviewed_at, reviewed_by, review_notes, created_at, updated_at";

/// Provides operations for tasks.
pub struct TaskRepo;

impl TaskRepo {
    /// Insert a pending task. `quiz_data` is the serialized quiz definition.
    pub async fn create(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        input: &CreateTask,
        quiz_data: Option<&serde_json::Value>,
        created_by: DbId,
    ) -> Result<Task, sqlx::Error> {
        let query = format!(
            "INSERT INTO tasks \
                (relationship_id, lock_id, created_by, title, description, task_type, \
                 quiz_data, requires_photo, requires_text, time_reward_seconds, \
                 time_penalty_seconds) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(input.relationship_id)
            .bind(input.lock_id)
            .bind(created_by)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.task_type)
            .bind(quiz_data)
            .bind(input.requires_photo)
            .bind(input.requires_text)
            .bind(input.time_reward_seconds)
            .bind(input.time_penalty_seconds)
            .fetch_one(&mut **tx)
            .await
    }

    /// Find a task by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE id = $1");
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Load a task inside a transaction, taking a row lock.
    pub async fn find_for_update(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Record a submission and move the task to `submitted`.
    pub async fn submit(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
        submission: &Submission<'_>,
        now: Timestamp,
    ) -> Result<Task, sqlx::Error> {
        let query = format!(
            "UPDATE tasks SET \
                status = $2, \
                submission_text = $3, \
                submission_photo_url = $4, \
                quiz_answer = $5, \
                submitted_at = $6, \
                updated_at = $6 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(TaskStatus::Submitted.as_str())
            .bind(submission.text)
            .bind(submission.photo_url)
            .bind(submission.quiz_answer)
            .bind(now)
            .fetch_one(&mut **tx)
            .await
    }

    /// Record a review outcome.
    pub async fn review(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
        status: TaskStatus,
        reviewed_by: DbId,
        review_notes: Option<&str>,
        now: Timestamp,
    ) -> Result<Task, sqlx::Error> {
        let query = format!(
            "UPDATE tasks SET \
                status = $2, \
                reviewed_by = $3, \
                review_notes = $4, \
                reviewed_at = $5, \
                updated_at = $5 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(status.as_str())
            .bind(reviewed_by)
            .bind(review_notes)
            .bind(now)
            .fetch_one(&mut **tx)
            .await
    }

    /// Tasks of a relationship, newest first, optionally filtered by status.
    pub async fn list_for_relationship(
        pool: &PgPool,
        relationship_id: DbId,
        status: Option<TaskStatus>,
    ) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tasks \
             WHERE relationship_id = $1 AND ($2::TEXT IS NULL OR status = $2) \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(relationship_id)
            .bind(status.map(TaskStatus::as_str))
            .fetch_all(pool)
            .await
    }

    /// Task counts per status across the given relationships.
    pub async fn counts_by_status(
        pool: &PgPool,
        relationship_ids: &[DbId],
    ) -> Result<Vec<TaskStatusCount>, sqlx::Error> {
        sqlx::query_as::<_, TaskStatusCount>(
            "SELECT status, COUNT(*) AS count FROM tasks \
             WHERE relationship_id = ANY($1) \
             GROUP BY status \
             ORDER BY status",
        )
        .bind(relationship_ids)
        .fetch_all(pool)
        .await
    }
}
