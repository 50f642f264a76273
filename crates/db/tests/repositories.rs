//! Integration tests for the repository layer against a real database.

use assert_matches::assert_matches;
use chrono::{Duration, TimeZone, Utc};
use keyholder_core::lock::{LockAction, LockCapabilities, LockState, LockStatus};
use keyholder_core::lock_stats::{total_locked_seconds, Window};
use keyholder_core::notifications;
use keyholder_core::relationship::RelationshipStatus;
use keyholder_core::task::{Submission, TaskStatus};
use keyholder_core::types::{DbId, Timestamp};
use keyholder_db::models::lock::Lock;
use keyholder_db::models::lock_history::NewHistoryEntry;
use keyholder_db::models::relationship::Relationship;
use keyholder_db::models::task::CreateTask;
use keyholder_db::models::user::{CreateUser, UpdateProfile};
use keyholder_db::repositories::{
    LockHistoryRepo, LockRepo, NotificationRepo, RelationshipRepo, StatsRepo, TaskRepo, UserRepo,
};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn t0() -> Timestamp {
    Utc.with_ymd_and_hms(2026, 4, 1, 9, 0, 0).unwrap()
}

async fn new_user(pool: &PgPool, name: &str, role: &str) -> DbId {
    UserRepo::create(
        pool,
        &CreateUser {
            display_name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            role: role.to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

async fn active_relationship(pool: &PgPool) -> Relationship {
    let keyholder = new_user(pool, "Kara", "keyholder").await;
    let sub = new_user(pool, "Sam", "sub").await;
    let mut tx = pool.begin().await.unwrap();
    let rel = RelationshipRepo::create(&mut tx, keyholder, sub, keyholder)
        .await
        .unwrap();
    let rel = RelationshipRepo::update_status(&mut tx, rel.id, RelationshipStatus::Active, t0())
        .await
        .unwrap();
    tx.commit().await.unwrap();
    rel
}

async fn new_lock(pool: &PgPool, rel: &Relationship, duration: i64) -> Lock {
    let transition = LockState::create(duration, t0()).unwrap();
    let mut tx = pool.begin().await.unwrap();
    let lock = LockRepo::insert(
        &mut tx,
        rel.id,
        "Weekend",
        None,
        &transition.state,
        &LockCapabilities::default(),
    )
    .await
    .unwrap();
    LockHistoryRepo::insert(
        &mut tx,
        &NewHistoryEntry {
            lock_id: lock.id,
            action: transition.action,
            performed_by: Some(rel.keyholder_id),
            time_change_seconds: 0,
            reason: None,
        },
        t0(),
    )
    .await
    .unwrap();
    tx.commit().await.unwrap();
    lock
}

// ---------------------------------------------------------------------------
// Relationships
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_relationship_activation_stamps_started_at(pool: PgPool) {
    let rel = active_relationship(&pool).await;
    assert_eq!(rel.status().unwrap(), RelationshipStatus::Active);
    assert_eq!(rel.started_at, Some(t0()));
    assert_eq!(rel.ended_at, None);

    let listed = RelationshipRepo::list_for_user(&pool, rel.sub_id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].keyholder_name, "Kara");
    assert_eq!(listed[0].sub_name, "Sam");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_open_pair_is_unique_until_ended(pool: PgPool) {
    let rel = active_relationship(&pool).await;

    let mut tx = pool.begin().await.unwrap();
    let dup = RelationshipRepo::create(&mut tx, rel.keyholder_id, rel.sub_id, rel.sub_id).await;
    assert_matches!(dup, Err(sqlx::Error::Database(ref e)) if e.constraint() == Some("uq_relationships_open_pair"));
    drop(tx);

    let mut tx = pool.begin().await.unwrap();
    RelationshipRepo::update_status(&mut tx, rel.id, RelationshipStatus::Ended, t0())
        .await
        .unwrap();
    let again = RelationshipRepo::create(&mut tx, rel.keyholder_id, rel.sub_id, rel.sub_id).await;
    assert!(again.is_ok());
    tx.commit().await.unwrap();
}

// ---------------------------------------------------------------------------
// Locks and history
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_lock_state_round_trips(pool: PgPool) {
    let rel = active_relationship(&pool).await;
    let lock = new_lock(&pool, &rel, 86_400).await;

    let state = lock.to_state().unwrap();
    assert_eq!(state.status, LockStatus::Active);
    assert_eq!(state.remaining_seconds, 86_400);
    assert_eq!(state.started_at, t0());
    assert_eq!(lock.capabilities(), LockCapabilities::default());

    let paused = state.pause(t0() + Duration::hours(1)).unwrap();
    let mut tx = pool.begin().await.unwrap();
    let locked = LockRepo::find_for_update(&mut tx, lock.id).await.unwrap().unwrap();
    assert_eq!(locked.id, lock.id);
    let updated = LockRepo::update_state(&mut tx, lock.id, &paused.state).await.unwrap();
    tx.commit().await.unwrap();

    assert_eq!(updated.status, "paused");
    assert_eq!(updated.remaining_seconds, 82_800);
    assert_eq!(updated.paused_at, Some(t0() + Duration::hours(1)));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_negative_remaining_is_rejected_by_schema(pool: PgPool) {
    let rel = active_relationship(&pool).await;
    let lock = new_lock(&pool, &rel, 600).await;

    let result = sqlx::query("UPDATE locks SET remaining_seconds = -1 WHERE id = $1")
        .bind(lock.id)
        .execute(&pool)
        .await;
    assert!(result.is_err());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_history_rows_are_immutable(pool: PgPool) {
    let rel = active_relationship(&pool).await;
    let lock = new_lock(&pool, &rel, 600).await;

    let result = sqlx::query("UPDATE lock_history SET reason = 'edited' WHERE lock_id = $1")
        .bind(lock.id)
        .execute(&pool)
        .await;
    assert!(result.is_err());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_history_sign_must_match_action(pool: PgPool) {
    let rel = active_relationship(&pool).await;
    let lock = new_lock(&pool, &rel, 600).await;

    let mut tx = pool.begin().await.unwrap();
    let result = LockHistoryRepo::insert(
        &mut tx,
        &NewHistoryEntry {
            lock_id: lock.id,
            action: LockAction::TimeRemoved,
            performed_by: None,
            time_change_seconds: 60,
            reason: None,
        },
        t0(),
    )
    .await;
    assert!(result.is_err());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_history_points_feed_locked_time(pool: PgPool) {
    let rel = active_relationship(&pool).await;
    let lock = new_lock(&pool, &rel, 86_400).await;

    let mut tx = pool.begin().await.unwrap();
    for (action, offset) in [(LockAction::Paused, 3_600), (LockAction::Resumed, 7_200)] {
        LockHistoryRepo::insert(
            &mut tx,
            &NewHistoryEntry {
                lock_id: lock.id,
                action,
                performed_by: Some(rel.keyholder_id),
                time_change_seconds: 0,
                reason: None,
            },
            t0() + Duration::seconds(offset),
        )
        .await
        .unwrap();
    }
    tx.commit().await.unwrap();

    let now = t0() + Duration::seconds(10_800);
    let rows = LockHistoryRepo::points_for_locks(&pool, &[lock.id], now)
        .await
        .unwrap();
    let points: Vec<_> = rows.iter().map(|r| r.to_point().unwrap()).collect();
    assert_eq!(points.len(), 3);

    let window = Window {
        start: t0(),
        end: now,
    };
    assert_eq!(total_locked_seconds(&points, &window, now), 3_600 + 3_600);

    let history = LockHistoryRepo::list_for_lock(&pool, lock.id).await.unwrap();
    assert_eq!(history[0].action, "resumed");
    assert_eq!(history[0].performer_name.as_deref(), Some("Kara"));
    assert_eq!(history.last().unwrap().action, "created");
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_task_submit_and_review(pool: PgPool) {
    let rel = active_relationship(&pool).await;
    let lock = new_lock(&pool, &rel, 86_400).await;

    let input = CreateTask {
        relationship_id: rel.id,
        lock_id: Some(lock.id),
        title: "Morning check-in".to_string(),
        description: None,
        task_type: "check_in".to_string(),
        quiz_data: None,
        requires_photo: false,
        requires_text: false,
        time_reward_seconds: 3_600,
        time_penalty_seconds: 1_800,
    };

    let mut tx = pool.begin().await.unwrap();
    let task = TaskRepo::create(&mut tx, &input, None, rel.keyholder_id)
        .await
        .unwrap();
    assert_eq!(task.status().unwrap(), TaskStatus::Pending);

    let submitted = TaskRepo::submit(&mut tx, task.id, &Submission::default(), t0())
        .await
        .unwrap();
    assert_eq!(submitted.status, "submitted");
    assert_eq!(submitted.submitted_at, Some(t0()));

    let reviewed = TaskRepo::review(
        &mut tx,
        task.id,
        TaskStatus::Approved,
        rel.keyholder_id,
        Some("Good"),
        t0(),
    )
    .await
    .unwrap();
    tx.commit().await.unwrap();

    assert_eq!(reviewed.status, "approved");
    assert_eq!(reviewed.reviewed_by, Some(rel.keyholder_id));

    let approved =
        TaskRepo::list_for_relationship(&pool, rel.id, Some(TaskStatus::Approved))
            .await
            .unwrap();
    assert_eq!(approved.len(), 1);
    let pending = TaskRepo::list_for_relationship(&pool, rel.id, Some(TaskStatus::Pending))
        .await
        .unwrap();
    assert!(pending.is_empty());

    let counts = TaskRepo::counts_by_status(&pool, &[rel.id]).await.unwrap();
    assert_eq!(counts.len(), 1);
    assert_eq!(counts[0].status, "approved");
    assert_eq!(counts[0].count, 1);
}

// ---------------------------------------------------------------------------
// Notifications and stats
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_notification_read_flow(pool: PgPool) {
    let rel = active_relationship(&pool).await;

    let mut tx = pool.begin().await.unwrap();
    let first = NotificationRepo::insert(&mut tx, &notifications::lock_created(rel.sub_id, "A"))
        .await
        .unwrap();
    NotificationRepo::insert(&mut tx, &notifications::lock_paused(rel.sub_id, "A"))
        .await
        .unwrap();
    tx.commit().await.unwrap();

    assert_eq!(NotificationRepo::unread_count(&pool, rel.sub_id).await.unwrap(), 2);
    assert!(NotificationRepo::mark_read(&pool, first, rel.sub_id).await.unwrap());
    assert!(!NotificationRepo::mark_read(&pool, first, rel.sub_id).await.unwrap());
    assert!(!NotificationRepo::mark_read(&pool, first, rel.keyholder_id).await.unwrap());

    let unread = NotificationRepo::list_for_user(&pool, rel.sub_id, true, 50, 0)
        .await
        .unwrap();
    assert_eq!(unread.len(), 1);
    assert_eq!(unread[0].notification_type, "lock_paused");

    assert_eq!(NotificationRepo::mark_all_read(&pool, rel.sub_id).await.unwrap(), 1);
    assert_eq!(NotificationRepo::unread_count(&pool, rel.sub_id).await.unwrap(), 0);

    assert!(!NotificationRepo::delete(&pool, first, rel.keyholder_id).await.unwrap());
    assert!(NotificationRepo::delete(&pool, first, rel.sub_id).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_platform_stats_counts(pool: PgPool) {
    let rel = active_relationship(&pool).await;
    new_lock(&pool, &rel, 600).await;

    let stats = StatsRepo::platform(&pool).await.unwrap();
    assert_eq!(stats.total_users, 2);
    assert_eq!(stats.active_users, 2);
    assert_eq!(stats.active_relationships, 1);
    assert_eq!(stats.total_locks, 1);
    assert_eq!(stats.active_locks, 1);
    assert_eq!(stats.total_tasks, 0);
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_search_treats_wildcards_literally(pool: PgPool) {
    let keyholder = new_user(&pool, "Kara", "keyholder").await;
    new_user(&pool, "100% Sub", "sub").await;
    new_user(&pool, "1000 Sub", "sub").await;

    let pattern = keyholder_core::profile::search_pattern("0%").unwrap();
    let found = UserRepo::search(&pool, "sub", &pattern, keyholder, 10)
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].display_name, "100% Sub");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_profile_update_clears_blank_fields(pool: PgPool) {
    let id = new_user(&pool, "Sam", "sub").await;
    let input = UpdateProfile {
        display_name: "Sam".to_string(),
        bio: Some("Hello".to_string()),
        country: Some("   ".to_string()),
        avatar_url: None,
    };
    let user = UserRepo::update_profile(&pool, id, &input)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.bio.as_deref(), Some("Hello"));
    assert_eq!(user.country, None);

    let profile = UserRepo::find_profile(&pool, id).await.unwrap().unwrap();
    assert_eq!(profile.bio.as_deref(), Some("Hello"));
    assert_matches!(UserRepo::update_profile(&pool, 9_999, &input).await, Ok(None));
}
