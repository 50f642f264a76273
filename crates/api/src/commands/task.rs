//! Task commands: assign, submit, review.
//!
//! Reviewing a task that is linked to a lock changes the lock's time in the
//! same transaction: approval takes the reward off, rejection adds the
//! penalty. Capability flags are not consulted for this; the amounts were
//! agreed when the task was assigned.

use keyholder_core::error::CoreError;
use keyholder_core::notifications;
use keyholder_core::task::{
    ensure_can_review, ensure_can_submit, validate_submission, validate_task_shape,
    validate_task_title, validate_time_amounts, ReviewDecision, Submission, TaskType,
    MAX_TASK_TEXT_LENGTH,
};
use keyholder_core::types::{DbId, Timestamp};
use keyholder_db::models::lock::Lock;
use keyholder_db::models::lock_history::LockHistoryEntry;
use keyholder_db::models::task::{CreateTask, ReviewTask, SubmitTask, Task};
use keyholder_db::repositories::{LockRepo, NotificationRepo, RelationshipRepo, TaskRepo};
use serde::Serialize;
use sqlx::PgPool;

use super::lock::append_history;
use crate::access;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;

/// A submitted task, with quiz correctness when the task is a quiz.
#[derive(Debug, Serialize)]
pub struct SubmitOutcome {
    pub task: Task,
    pub quiz_correct: Option<bool>,
}

/// A reviewed task and, when its lock was adjusted, the lock and history row.
#[derive(Debug, Serialize)]
pub struct ReviewOutcome {
    pub task: Task,
    pub lock: Option<Lock>,
    pub history: Option<LockHistoryEntry>,
}

/// Assign a task in an active relationship. Only the keyholder may do this.
pub async fn create_task(
    pool: &PgPool,
    actor: &AuthUser,
    input: &CreateTask,
) -> AppResult<Task> {
    validate_task_title(&input.title)?;
    validate_time_amounts(input.time_reward_seconds, input.time_penalty_seconds)?;
    let task_type: TaskType = input.task_type.parse()?;
    validate_task_shape(task_type, input.quiz_data.as_ref())?;
    let quiz_json = input
        .quiz_data
        .as_ref()
        .map(serde_json::to_value)
        .transpose()
        .map_err(|e| AppError::InternalError(format!("Failed to encode quiz: {e}")))?;

    let mut tx = pool.begin().await?;

    let rel = RelationshipRepo::find_for_share(&mut tx, input.relationship_id)
        .await?
        .ok_or_else(|| access::not_found("Relationship", input.relationship_id))?;
    access::ensure_keyholder(&rel, actor)?;
    access::ensure_active(&rel)?;

    if let Some(lock_id) = input.lock_id {
        let lock = LockRepo::find_for_share(&mut tx, lock_id)
            .await?
            .ok_or_else(|| access::not_found("Lock", lock_id))?;
        if lock.relationship_id != rel.id {
            return Err(CoreError::Validation(
                "The lock belongs to a different relationship".to_string(),
            )
            .into());
        }
        let status = lock.to_state()?.status;
        if status.is_terminal() {
            return Err(CoreError::Conflict(format!(
                "Lock {lock_id} is {status}; tasks can only be linked to running or paused locks"
            ))
            .into());
        }
    }

    let task = TaskRepo::create(&mut tx, input, quiz_json.as_ref(), actor.user_id).await?;
    NotificationRepo::insert(
        &mut tx,
        &notifications::task_assigned(rel.sub_id, &task.title),
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        task_id = task.id,
        relationship_id = rel.id,
        lock_id = ?task.lock_id,
        user_id = actor.user_id,
        task_type = %task.task_type,
        "Task created"
    );

    Ok(task)
}

/// Hand in a pending task. Only the sub may do this.
pub async fn submit_task(
    pool: &PgPool,
    actor: &AuthUser,
    task_id: DbId,
    input: &SubmitTask,
    now: Timestamp,
) -> AppResult<SubmitOutcome> {
    let mut tx = pool.begin().await?;

    let task = TaskRepo::find_for_update(&mut tx, task_id)
        .await?
        .ok_or_else(|| access::not_found("Task", task_id))?;
    let rel = RelationshipRepo::find_for_share(&mut tx, task.relationship_id)
        .await?
        .ok_or_else(|| access::not_found("Relationship", task.relationship_id))?;
    access::ensure_sub(&rel, actor)?;
    ensure_can_submit(task.status()?)?;

    let submission = Submission {
        text: trimmed(input.submission_text.as_deref()),
        photo_url: trimmed(input.submission_photo_url.as_deref()),
        quiz_answer: input.quiz_answer,
    };
    let quiz_correct = validate_submission(&task.requirements()?, &submission)?;

    let task = TaskRepo::submit(&mut tx, task.id, &submission, now).await?;
    NotificationRepo::insert(
        &mut tx,
        &notifications::task_submitted(rel.keyholder_id, &task.title),
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        task_id = task.id,
        user_id = actor.user_id,
        quiz_correct = ?quiz_correct,
        "Task submitted"
    );

    Ok(SubmitOutcome { task, quiz_correct })
}

/// Approve or reject a submitted task. Only the keyholder may do this.
pub async fn review_task(
    pool: &PgPool,
    actor: &AuthUser,
    task_id: DbId,
    input: &ReviewTask,
    now: Timestamp,
) -> AppResult<ReviewOutcome> {
    let notes = trimmed(input.review_notes.as_deref());
    if notes.is_some_and(|n| n.chars().count() > MAX_TASK_TEXT_LENGTH) {
        return Err(CoreError::Validation(format!(
            "Review notes must be at most {MAX_TASK_TEXT_LENGTH} characters"
        ))
        .into());
    }

    let mut tx = pool.begin().await?;

    let task = TaskRepo::find_for_update(&mut tx, task_id)
        .await?
        .ok_or_else(|| access::not_found("Task", task_id))?;
    let rel = RelationshipRepo::find_for_share(&mut tx, task.relationship_id)
        .await?
        .ok_or_else(|| access::not_found("Relationship", task.relationship_id))?;
    access::ensure_keyholder(&rel, actor)?;
    ensure_can_review(task.status()?)?;

    let decision = input.decision;
    let reviewed = TaskRepo::review(
        &mut tx,
        task.id,
        decision.resulting_status(),
        actor.user_id,
        notes,
        now,
    )
    .await?;

    let change = decision.lock_time_change(task.time_reward_seconds, task.time_penalty_seconds);
    let mut lock_update = None;

    if let Some(lock_id) = task.lock_id.filter(|_| change != 0) {
        let lock = LockRepo::find_for_update(&mut tx, lock_id)
            .await?
            .ok_or_else(|| access::not_found("Lock", lock_id))?;
        let state = lock.to_state()?;

        if state.status.is_terminal() {
            tracing::info!(
                task_id = task.id,
                lock_id,
                status = %state.status,
                "Lock already finished; review leaves its time unchanged"
            );
        } else {
            let transition = state.apply_time_change(change, now)?;
            let updated = LockRepo::update_state(&mut tx, lock.id, &transition.state).await?;
            let reason = decision.history_reason(&task.title);
            let history =
                append_history(&mut tx, lock.id, actor, &transition, Some(&reason), now).await?;
            NotificationRepo::insert(
                &mut tx,
                &notifications::lock_time_changed(rel.sub_id, &updated.name, change),
            )
            .await?;
            lock_update = Some((updated, history));
        }
    }

    NotificationRepo::insert(
        &mut tx,
        &notifications::task_reviewed(
            rel.sub_id,
            &reviewed.title,
            decision == ReviewDecision::Approve,
        ),
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        task_id = reviewed.id,
        user_id = actor.user_id,
        decision = ?decision,
        lock_id = ?task.lock_id,
        time_change_seconds = if lock_update.is_some() { change } else { 0 },
        "Task reviewed"
    );

    let (lock, history) = match lock_update {
        Some((lock, history)) => (Some(lock), Some(history)),
        None => (None, None),
    };
    Ok(ReviewOutcome {
        task: reviewed,
        lock,
        history,
    })
}

fn trimmed(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
