//! Task models and DTOs.

use keyholder_core::error::CoreError;
use keyholder_core::task::{QuizData, ReviewDecision, TaskRequirements, TaskStatus};
use keyholder_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `tasks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Task {
    pub id: DbId,
    pub relationship_id: DbId,
    pub lock_id: Option<DbId>,
    pub created_by: Option<DbId>,
    pub title: String,
    pub description: Option<String>,
    pub task_type: String,
    pub quiz_data: Option<serde_json::Value>,
    pub requires_photo: bool,
    pub requires_text: bool,
    pub time_reward_seconds: i64,
    pub time_penalty_seconds: i64,
    pub status: String,
    pub submission_text: Option<String>,
    pub submission_photo_url: Option<String>,
    pub quiz_answer: Option<i32>,
    pub submitted_at: Option<Timestamp>,
    pub reviewed_at: Option<Timestamp>,
    pub reviewed_by: Option<DbId>,
    pub review_notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Task {
    pub fn status(&self) -> Result<TaskStatus, CoreError> {
        self.status.parse()
    }

    pub fn requirements(&self) -> Result<TaskRequirements, CoreError> {
        Ok(TaskRequirements {
            task_type: self.task_type.parse()?,
            requires_photo: self.requires_photo,
            requires_text: self.requires_text,
            quiz: self.quiz_data.as_ref().map(QuizData::from_value).transpose()?,
        })
    }
}

/// DTO for assigning a task.
#[derive(Debug, Deserialize)]
pub struct CreateTask {
    pub relationship_id: DbId,
    pub lock_id: Option<DbId>,
    pub title: String,
    pub description: Option<String>,
    pub task_type: String,
    pub quiz_data: Option<QuizData>,
    #[serde(default)]
    pub requires_photo: bool,
    #[serde(default = "default_true")]
    pub requires_text: bool,
    #[serde(default)]
    pub time_reward_seconds: i64,
    #[serde(default)]
    pub time_penalty_seconds: i64,
}

fn default_true() -> bool {
    true
}

/// DTO for a sub handing in a task.
#[derive(Debug, Default, Deserialize)]
pub struct SubmitTask {
    pub submission_text: Option<String>,
    pub submission_photo_url: Option<String>,
    pub quiz_answer: Option<i32>,
}

/// DTO for a keyholder's review.
#[derive(Debug, Deserialize)]
pub struct ReviewTask {
    pub decision: ReviewDecision,
    pub review_notes: Option<String>,
}

/// Query parameters for listing tasks.
#[derive(Debug, Deserialize)]
pub struct TaskListParams {
    pub relationship_id: DbId,
    pub status: Option<String>,
}

/// Count of tasks in one status.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TaskStatusCount {
    pub status: String,
    pub count: i64,
}
