//! Lock commands: create, pause, resume, adjust time, complete, cancel.

use keyholder_core::lock::{
    validate_lock_name, validate_reason, LockCapabilities, LockError, LockState, LockTransition,
    TimeDelta,
};
use keyholder_core::notifications;
use keyholder_core::types::{DbId, Timestamp};
use keyholder_db::models::lock::{AdjustLockTime, CreateLock, Lock};
use keyholder_db::models::lock_history::{LockHistoryEntry, NewHistoryEntry};
use keyholder_db::repositories::{LockHistoryRepo, LockRepo, NotificationRepo, RelationshipRepo};
use serde::Serialize;
use sqlx::PgPool;

use crate::access;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;

/// The lock as persisted after a command, with the history row it appended.
#[derive(Debug, Serialize)]
pub struct LockOutcome {
    pub lock: Lock,
    pub history: LockHistoryEntry,
}

/// Create a lock in an active relationship. Only the keyholder may do this.
pub async fn create_lock(
    pool: &PgPool,
    actor: &AuthUser,
    input: &CreateLock,
    now: Timestamp,
) -> AppResult<LockOutcome> {
    validate_lock_name(&input.name)?;
    let duration = TimeDelta::from_parts(input.days, input.hours, input.minutes)?;
    let transition = LockState::create(duration.seconds(), now)?;
    let capabilities = input.capabilities();

    let mut tx = pool.begin().await?;

    let rel = RelationshipRepo::find_for_share(&mut tx, input.relationship_id)
        .await?
        .ok_or_else(|| access::not_found("Relationship", input.relationship_id))?;
    access::ensure_keyholder(&rel, actor)?;
    access::ensure_active(&rel)?;

    let lock = LockRepo::insert(
        &mut tx,
        rel.id,
        input.name.trim(),
        input.description.as_deref(),
        &transition.state,
        &capabilities,
    )
    .await?;
    let history = append_history(&mut tx, lock.id, actor, &transition, None, now).await?;
    NotificationRepo::insert(
        &mut tx,
        &notifications::lock_created(access::counterpart_of(&rel, actor), &lock.name),
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        lock_id = lock.id,
        relationship_id = rel.id,
        user_id = actor.user_id,
        duration_seconds = lock.initial_duration_seconds,
        "Lock created"
    );

    Ok(LockOutcome { lock, history })
}

pub async fn pause_lock(
    pool: &PgPool,
    actor: &AuthUser,
    lock_id: DbId,
    reason: Option<&str>,
    now: Timestamp,
) -> AppResult<LockOutcome> {
    run(pool, actor, lock_id, reason, now, |state, _| state.pause(now)).await
}

pub async fn resume_lock(
    pool: &PgPool,
    actor: &AuthUser,
    lock_id: DbId,
    reason: Option<&str>,
    now: Timestamp,
) -> AppResult<LockOutcome> {
    run(pool, actor, lock_id, reason, now, |state, _| state.resume(now)).await
}

pub async fn complete_lock(
    pool: &PgPool,
    actor: &AuthUser,
    lock_id: DbId,
    reason: Option<&str>,
    now: Timestamp,
) -> AppResult<LockOutcome> {
    run(pool, actor, lock_id, reason, now, |state, _| state.complete(now)).await
}

pub async fn cancel_lock(
    pool: &PgPool,
    actor: &AuthUser,
    lock_id: DbId,
    reason: Option<&str>,
    now: Timestamp,
) -> AppResult<LockOutcome> {
    run(pool, actor, lock_id, reason, now, |state, _| state.cancel(now)).await
}

/// Manually add or remove time, subject to the lock's capability flags.
///
/// A zero delta is rejected before the lock is even loaded.
pub async fn adjust_lock_time(
    pool: &PgPool,
    actor: &AuthUser,
    lock_id: DbId,
    input: &AdjustLockTime,
    now: Timestamp,
) -> AppResult<LockOutcome> {
    let delta = TimeDelta::from_parts(input.days, input.hours, input.minutes)?;
    if delta.is_zero() {
        return Err(LockError::ZeroDelta.into());
    }
    let direction = input.direction;
    run(
        pool,
        actor,
        lock_id,
        input.reason.as_deref(),
        now,
        |state, capabilities| state.adjust_time(direction, delta, capabilities, now),
    )
    .await
}

/// Shared body of every command on an existing lock.
async fn run<F>(
    pool: &PgPool,
    actor: &AuthUser,
    lock_id: DbId,
    reason: Option<&str>,
    now: Timestamp,
    op: F,
) -> AppResult<LockOutcome>
where
    F: FnOnce(&LockState, &LockCapabilities) -> Result<LockTransition, LockError>,
{
    validate_reason(reason)?;

    let mut tx = pool.begin().await?;

    let lock = LockRepo::find_for_update(&mut tx, lock_id)
        .await?
        .ok_or_else(|| access::not_found("Lock", lock_id))?;
    let rel = RelationshipRepo::find_for_share(&mut tx, lock.relationship_id)
        .await?
        .ok_or_else(|| access::not_found("Relationship", lock.relationship_id))?;
    access::ensure_keyholder(&rel, actor)?;

    let transition = op(&lock.to_state()?, &lock.capabilities())?;

    let updated = LockRepo::update_state(&mut tx, lock.id, &transition.state).await?;
    let history = append_history(&mut tx, lock.id, actor, &transition, reason, now).await?;
    NotificationRepo::insert(
        &mut tx,
        &notifications::lock_event(
            access::counterpart_of(&rel, actor),
            transition.action,
            &updated.name,
            transition.time_change_seconds,
        ),
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        lock_id = updated.id,
        user_id = actor.user_id,
        action = %transition.action,
        time_change_seconds = transition.time_change_seconds,
        remaining_seconds = updated.remaining_seconds,
        status = %updated.status,
        "Lock updated"
    );

    Ok(LockOutcome {
        lock: updated,
        history,
    })
}

pub(crate) async fn append_history(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    lock_id: DbId,
    actor: &AuthUser,
    transition: &LockTransition,
    reason: Option<&str>,
    now: Timestamp,
) -> AppResult<LockHistoryEntry> {
    let entry = NewHistoryEntry {
        lock_id,
        action: transition.action,
        performed_by: Some(actor.user_id),
        time_change_seconds: transition.time_change_seconds,
        reason: reason.map(str::trim).filter(|r| !r.is_empty()),
    };
    Ok(LockHistoryRepo::insert(tx, &entry, now).await?)
}
