//! Task lifecycle rules and the review side-effect on lock time.
//!
//! A keyholder assigns a task, the sub submits it, the keyholder reviews it.
//! Approval subtracts the task's reward from the linked lock; rejection adds
//! its penalty.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/* --------------------------------------------------------------------------
Constants
-------------------------------------------------------------------------- */

/// Maximum length of a task title.
pub const MAX_TASK_TITLE_LENGTH: usize = 200;

/// Maximum length of a written submission or review note.
pub const MAX_TASK_TEXT_LENGTH: usize = 5_000;

/// A quiz needs at least this many answer options.
pub const MIN_QUIZ_OPTIONS: usize = 2;

/// A quiz accepts at most this many answer options.
pub const MAX_QUIZ_OPTIONS: usize = 6;

/// Largest reward or penalty a single task may carry (30 days).
pub const MAX_TASK_TIME_SECS: i64 = 30 * 86_400;

/* --------------------------------------------------------------------------
Enums
-------------------------------------------------------------------------- */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Submitted,
    Approved,
    Rejected,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Submitted => "submitted",
            TaskStatus::Approved => "approved",
            TaskStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "submitted" => Ok(TaskStatus::Submitted),
            "approved" => Ok(TaskStatus::Approved),
            "rejected" => Ok(TaskStatus::Rejected),
            other => Err(CoreError::Validation(format!(
                "Invalid task status '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    CheckIn,
    Quiz,
    Proof,
}

impl TaskType {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskType::CheckIn => "check_in",
            TaskType::Quiz => "quiz",
            TaskType::Proof => "proof",
        }
    }
}

impl FromStr for TaskType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "check_in" => Ok(TaskType::CheckIn),
            "quiz" => Ok(TaskType::Quiz),
            "proof" => Ok(TaskType::Proof),
            other => Err(CoreError::Validation(format!(
                "Invalid task type '{other}'. Must be one of: check_in, quiz, proof"
            ))),
        }
    }
}

/// Keyholder's verdict on a submitted task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approve,
    Reject,
}

impl ReviewDecision {
    pub fn resulting_status(self) -> TaskStatus {
        match self {
            ReviewDecision::Approve => TaskStatus::Approved,
            ReviewDecision::Reject => TaskStatus::Rejected,
        }
    }

    /// Signed change to apply to the linked lock: the reward comes off on
    /// approval, the penalty goes on after a rejection.
    pub fn lock_time_change(self, reward_seconds: i64, penalty_seconds: i64) -> i64 {
        match self {
            ReviewDecision::Approve => -reward_seconds.max(0),
            ReviewDecision::Reject => penalty_seconds.max(0),
        }
    }

    /// Reason text stored on the lock history entry.
    pub fn history_reason(self, task_title: &str) -> String {
        match self {
            ReviewDecision::Approve => format!("Task approved: {task_title}"),
            ReviewDecision::Reject => format!("Task rejected: {task_title}"),
        }
    }
}

/* --------------------------------------------------------------------------
Quiz
-------------------------------------------------------------------------- */

/// Quiz definition stored in `tasks.quiz_data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizData {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
}

impl QuizData {
    pub fn from_value(value: &serde_json::Value) -> Result<Self, CoreError> {
        serde_json::from_value(value.clone())
            .map_err(|e| CoreError::Validation(format!("Invalid quiz data: {e}")))
    }

    pub fn is_correct(&self, answer: usize) -> bool {
        answer == self.correct_answer
    }
}

/// Validate a quiz definition at task creation.
pub fn validate_quiz(quiz: &QuizData) -> Result<(), CoreError> {
    if quiz.question.trim().is_empty() {
        return Err(CoreError::Validation(
            "Quiz question must not be empty".to_string(),
        ));
    }
    if quiz.options.len() < MIN_QUIZ_OPTIONS || quiz.options.len() > MAX_QUIZ_OPTIONS {
        return Err(CoreError::Validation(format!(
            "Quiz must have between {MIN_QUIZ_OPTIONS} and {MAX_QUIZ_OPTIONS} options"
        )));
    }
    if quiz.options.iter().any(|o| o.trim().is_empty()) {
        return Err(CoreError::Validation(
            "Quiz options must not be empty".to_string(),
        ));
    }
    if quiz.correct_answer >= quiz.options.len() {
        return Err(CoreError::Validation(format!(
            "Correct answer index {} is out of range",
            quiz.correct_answer
        )));
    }
    Ok(())
}

/* --------------------------------------------------------------------------
Creation
-------------------------------------------------------------------------- */

/// Validate a task title.
pub fn validate_task_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation(
            "Task title must not be empty".to_string(),
        ));
    }
    if title.chars().count() > MAX_TASK_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Task title must be at most {MAX_TASK_TITLE_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate a task's reward and penalty amounts.
pub fn validate_time_amounts(reward_seconds: i64, penalty_seconds: i64) -> Result<(), CoreError> {
    for (label, value) in [("reward", reward_seconds), ("penalty", penalty_seconds)] {
        if value < 0 {
            return Err(CoreError::Validation(format!(
                "Time {label} must not be negative"
            )));
        }
        if value > MAX_TASK_TIME_SECS {
            return Err(CoreError::Validation(format!(
                "Time {label} must not exceed {MAX_TASK_TIME_SECS} seconds"
            )));
        }
    }
    Ok(())
}

/// Validate that quiz data is present exactly when the task is a quiz.
pub fn validate_task_shape(task_type: TaskType, quiz: Option<&QuizData>) -> Result<(), CoreError> {
    match (task_type, quiz) {
        (TaskType::Quiz, Some(q)) => validate_quiz(q),
        (TaskType::Quiz, None) => Err(CoreError::Validation(
            "Quiz tasks require quiz data".to_string(),
        )),
        (_, Some(_)) => Err(CoreError::Validation(
            "Only quiz tasks may carry quiz data".to_string(),
        )),
        (_, None) => Ok(()),
    }
}

/* --------------------------------------------------------------------------
Submission / review
-------------------------------------------------------------------------- */

/// What a task asks of the sub.
#[derive(Debug, Clone)]
pub struct TaskRequirements {
    pub task_type: TaskType,
    pub requires_photo: bool,
    pub requires_text: bool,
    pub quiz: Option<QuizData>,
}

/// What the sub handed in.
#[derive(Debug, Clone, Copy, Default)]
pub struct Submission<'a> {
    pub text: Option<&'a str>,
    pub photo_url: Option<&'a str>,
    pub quiz_answer: Option<i32>,
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

/// Only pending tasks can be submitted.
pub fn ensure_can_submit(status: TaskStatus) -> Result<(), CoreError> {
    if status == TaskStatus::Pending {
        Ok(())
    } else {
        Err(CoreError::Conflict(format!(
            "Task is {status} and can no longer be submitted"
        )))
    }
}

/// Only submitted tasks can be reviewed.
pub fn ensure_can_review(status: TaskStatus) -> Result<(), CoreError> {
    if status == TaskStatus::Submitted {
        Ok(())
    } else {
        Err(CoreError::Conflict(format!(
            "Task is {status}; only submitted tasks can be reviewed"
        )))
    }
}

/// Check a submission against the task's requirements.
///
/// Returns whether a quiz answer is correct (`None` for non-quiz tasks).
pub fn validate_submission(
    requirements: &TaskRequirements,
    submission: &Submission<'_>,
) -> Result<Option<bool>, CoreError> {
    if submission
        .text
        .is_some_and(|t| t.chars().count() > MAX_TASK_TEXT_LENGTH)
    {
        return Err(CoreError::Validation(format!(
            "Submission text must be at most {MAX_TASK_TEXT_LENGTH} characters"
        )));
    }

    match requirements.task_type {
        TaskType::Quiz => {
            let quiz = requirements.quiz.as_ref().ok_or_else(|| {
                CoreError::Internal("Quiz task is missing its quiz data".to_string())
            })?;
            let answer = submission.quiz_answer.ok_or_else(|| {
                CoreError::Validation("Quiz tasks require an answer".to_string())
            })?;
            let index = usize::try_from(answer)
                .ok()
                .filter(|i| *i < quiz.options.len())
                .ok_or_else(|| {
                    CoreError::Validation(format!("Answer index {answer} is out of range"))
                })?;
            Ok(Some(quiz.is_correct(index)))
        }
        TaskType::Proof => {
            if requirements.requires_photo && is_blank(submission.photo_url) {
                return Err(CoreError::Validation(
                    "This task requires a photo".to_string(),
                ));
            }
            if requirements.requires_text && is_blank(submission.text) {
                return Err(CoreError::Validation(
                    "This task requires a written answer".to_string(),
                ));
            }
            Ok(None)
        }
        TaskType::CheckIn => Ok(None),
    }
}
