//! HTTP-level integration tests for the `/locks` endpoints and the
//! task-review side effect on lock time.

mod common;

use assert_matches::assert_matches;
use axum::http::StatusCode;
use chrono::{DateTime, Duration, TimeZone, Utc};
use common::{
    active_pair, auth_user, body_json, build_test_app, build_test_app_with_config, create_lock,
    get_auth, post_empty_auth, post_json_auth, test_config, token_for,
};
use keyholder_api::commands;
use keyholder_api::error::AppError;
use keyholder_core::lock::{LockError, LockStatus};
use keyholder_core::task::ReviewDecision;
use keyholder_db::models::lock::{CreateLock, LockCommandBody};
use keyholder_db::models::task::{CreateTask, ReviewTask, SubmitTask};
use keyholder_db::repositories::{LockHistoryRepo, NotificationRepo};
use serde_json::json;
use sqlx::PgPool;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 4, 1, 9, 0, 0).unwrap()
}

fn one_day_lock(relationship_id: i64) -> CreateLock {
    CreateLock {
        relationship_id,
        name: "Weekend".to_string(),
        description: None,
        days: 1,
        hours: 0,
        minutes: 0,
        allow_keyholder_add_time: None,
        allow_keyholder_remove_time: None,
        allow_sub_request_time: None,
    }
}

// ---------------------------------------------------------------------------
// Create and read
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_lock_returns_201_with_timer(pool: PgPool) {
    let pair = active_pair(&pool).await;
    let lock = create_lock(&pool, &pair, json!({ "name": "Weekend", "days": 1 })).await;

    assert_eq!(lock["status"], "active");
    assert_eq!(lock["initial_duration_seconds"], 86_400);
    assert_eq!(lock["remaining_seconds"], 86_400);
    assert!(lock["timer"]["remaining_seconds"].as_i64().unwrap() <= 86_400);
    assert!(lock["timer"]["ends_at"].is_string());

    let notifications = NotificationRepo::list_for_user(&pool, pair.sub.id, false, 10, 0)
        .await
        .unwrap();
    assert_eq!(notifications[0].notification_type, "lock_created");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_lock_with_zero_duration_is_rejected(pool: PgPool) {
    let pair = active_pair(&pool).await;
    let app = build_test_app(pool);
    let body = json!({ "relationship_id": pair.relationship_id, "name": "Nothing" });
    let response = post_json_auth(app, "/api/v1/locks", body, &token_for(&pair.keyholder)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_lock_above_configured_cap_is_rejected(pool: PgPool) {
    let pair = active_pair(&pool).await;
    let mut config = test_config();
    config.limits.max_lock_duration_secs = 7 * 86_400;
    let token = token_for(&pair.keyholder);

    let app = build_test_app_with_config(pool.clone(), config.clone());
    let body = json!({ "relationship_id": pair.relationship_id, "name": "Long", "days": 8 });
    let response = post_json_auth(app, "/api/v1/locks", body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let app = build_test_app_with_config(pool, config);
    let body = json!({ "relationship_id": pair.relationship_id, "name": "Week", "days": 7 });
    let response = post_json_auth(app, "/api/v1/locks", body, &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_sub_cannot_create_lock(pool: PgPool) {
    let pair = active_pair(&pool).await;
    let app = build_test_app(pool);
    let body = json!({ "relationship_id": pair.relationship_id, "name": "Mine", "hours": 2 });
    let response = post_json_auth(app, "/api/v1/locks", body, &token_for(&pair.sub)).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "FORBIDDEN");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_outsider_cannot_read_lock(pool: PgPool) {
    let pair = active_pair(&pool).await;
    let lock = create_lock(&pool, &pair, json!({ "name": "Weekend", "hours": 3 })).await;
    let outsider = common::create_user(&pool, "Olli", "sub").await;

    let app = build_test_app(pool);
    let response = get_auth(
        app,
        &format!("/api/v1/locks/{}", lock["id"]),
        &token_for(&outsider),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_locks_for_relationship(pool: PgPool) {
    let pair = active_pair(&pool).await;
    create_lock(&pool, &pair, json!({ "name": "First", "hours": 1 })).await;
    create_lock(&pool, &pair, json!({ "name": "Second", "hours": 2 })).await;

    let app = build_test_app(pool);
    let response = get_auth(
        app,
        &format!("/api/v1/locks?relationship_id={}", pair.relationship_id),
        &token_for(&pair.sub),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
}

// ---------------------------------------------------------------------------
// Commands over HTTP
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_pause_and_resume_record_history(pool: PgPool) {
    let pair = active_pair(&pool).await;
    let lock = create_lock(&pool, &pair, json!({ "name": "Weekend", "days": 1 })).await;
    let token = token_for(&pair.keyholder);
    let id = lock["id"].as_i64().unwrap();

    let app = build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/locks/{id}/pause"),
        json!({ "reason": "Doctor visit" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["lock"]["status"], "paused");
    assert_eq!(json["data"]["history"]["action"], "paused");
    assert_eq!(json["data"]["history"]["reason"], "Doctor visit");
    assert!(json["data"]["lock"]["timer"]["ends_at"].is_null());

    let app = build_test_app(pool.clone());
    let response = post_json_auth(app, &format!("/api/v1/locks/{id}/resume"), json!({}), &token)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = build_test_app(pool);
    let response = get_auth(app, &format!("/api/v1/locks/{id}/history"), &token).await;
    let json = body_json(response).await;
    let actions: Vec<_> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|h| h["action"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(actions, ["resumed", "paused", "created"]);
    assert_eq!(json["data"][0]["performer_name"], "Kira");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_state_commands_accept_a_request_without_body(pool: PgPool) {
    let pair = active_pair(&pool).await;
    let lock = create_lock(&pool, &pair, json!({ "name": "Weekend", "days": 1 })).await;
    let token = token_for(&pair.keyholder);
    let id = lock["id"].as_i64().unwrap();

    let app = build_test_app(pool.clone());
    let response = post_empty_auth(app, &format!("/api/v1/locks/{id}/pause"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["lock"]["status"], "paused");
    assert!(json["data"]["history"]["reason"].is_null());

    for (action, status) in [("resume", "active"), ("complete", "completed")] {
        let app = build_test_app(pool.clone());
        let response = post_empty_auth(app, &format!("/api/v1/locks/{id}/{action}"), &token).await;
        assert_eq!(response.status(), StatusCode::OK, "{action}");
        assert_eq!(body_json(response).await["data"]["lock"]["status"], status);
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_adjust_with_zero_delta_returns_400(pool: PgPool) {
    let pair = active_pair(&pool).await;
    let lock = create_lock(&pool, &pair, json!({ "name": "Weekend", "days": 1 })).await;

    let app = build_test_app(pool);
    let response = post_json_auth(
        app,
        &format!("/api/v1/locks/{}/time", lock["id"]),
        json!({ "direction": "add", "days": 0, "hours": 0, "minutes": 0 }),
        &token_for(&pair.keyholder),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "ZERO_DELTA");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_remove_time_without_capability_returns_403(pool: PgPool) {
    let pair = active_pair(&pool).await;
    let lock = create_lock(&pool, &pair, json!({ "name": "Weekend", "days": 1 })).await;

    let app = build_test_app(pool);
    let response = post_json_auth(
        app,
        &format!("/api/v1/locks/{}/time", lock["id"]),
        json!({ "direction": "remove", "hours": 1 }),
        &token_for(&pair.keyholder),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "CAPABILITY_DENIED");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_add_time_records_signed_change(pool: PgPool) {
    let pair = active_pair(&pool).await;
    let lock = create_lock(&pool, &pair, json!({ "name": "Weekend", "days": 1 })).await;

    let app = build_test_app(pool);
    let response = post_json_auth(
        app,
        &format!("/api/v1/locks/{}/time", lock["id"]),
        json!({ "direction": "add", "hours": 2, "reason": "Late reply" }),
        &token_for(&pair.keyholder),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["history"]["action"], "time_added");
    assert_eq!(json["data"]["history"]["time_change_seconds"], 7_200);
    assert!(json["data"]["lock"]["remaining_seconds"].as_i64().unwrap() > 86_400);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_completed_lock_rejects_pause_with_409(pool: PgPool) {
    let pair = active_pair(&pool).await;
    let lock = create_lock(&pool, &pair, json!({ "name": "Weekend", "hours": 4 })).await;
    let token = token_for(&pair.keyholder);
    let id = lock["id"].as_i64().unwrap();

    let app = build_test_app(pool.clone());
    let response =
        post_json_auth(app, &format!("/api/v1/locks/{id}/complete"), json!({}), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["lock"]["remaining_seconds"], 0);
    assert_eq!(json["data"]["lock"]["timer"]["completed_fraction"], 1.0);

    let app = build_test_app(pool);
    let response =
        post_json_auth(app, &format!("/api/v1/locks/{id}/pause"), json!({}), &token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "INVALID_TRANSITION");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_sub_cannot_cancel_lock(pool: PgPool) {
    let pair = active_pair(&pool).await;
    let lock = create_lock(&pool, &pair, json!({ "name": "Weekend", "hours": 4 })).await;

    let app = build_test_app(pool);
    let response = post_json_auth(
        app,
        &format!("/api/v1/locks/{}/cancel", lock["id"]),
        json!({}),
        &token_for(&pair.sub),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Commands with explicit clocks
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_pause_after_an_hour_stores_82800(pool: PgPool) {
    let pair = active_pair(&pool).await;
    let keyholder = auth_user(&pair.keyholder);

    let created = commands::lock::create_lock(
        &pool,
        &keyholder,
        &one_day_lock(pair.relationship_id),
        t0(),
    )
    .await
    .unwrap();
    let paused = commands::lock::pause_lock(
        &pool,
        &keyholder,
        created.lock.id,
        None,
        t0() + Duration::hours(1),
    )
    .await
    .unwrap();

    assert_eq!(paused.lock.status, "paused");
    assert_eq!(paused.lock.remaining_seconds, 82_800);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_approved_reward_takes_time_off_lock(pool: PgPool) {
    let pair = active_pair(&pool).await;
    let keyholder = auth_user(&pair.keyholder);
    let sub = auth_user(&pair.sub);

    let lock = commands::lock::create_lock(
        &pool,
        &keyholder,
        &one_day_lock(pair.relationship_id),
        t0(),
    )
    .await
    .unwrap()
    .lock;
    commands::lock::pause_lock(&pool, &keyholder, lock.id, None, t0() + Duration::hours(1))
        .await
        .unwrap();

    let task = commands::task::create_task(
        &pool,
        &keyholder,
        &CreateTask {
            relationship_id: pair.relationship_id,
            lock_id: Some(lock.id),
            title: "Morning run".to_string(),
            description: None,
            task_type: "check_in".to_string(),
            quiz_data: None,
            requires_photo: false,
            requires_text: false,
            time_reward_seconds: 3_600,
            time_penalty_seconds: 1_800,
        },
    )
    .await
    .unwrap();
    commands::task::submit_task(
        &pool,
        &sub,
        task.id,
        &SubmitTask::default(),
        t0() + Duration::hours(2),
    )
    .await
    .unwrap();

    let outcome = commands::task::review_task(
        &pool,
        &keyholder,
        task.id,
        &ReviewTask {
            decision: ReviewDecision::Approve,
            review_notes: None,
        },
        t0() + Duration::hours(3),
    )
    .await
    .unwrap();

    assert_eq!(outcome.task.status, "approved");
    let updated = outcome.lock.expect("lock should be adjusted");
    assert_eq!(updated.remaining_seconds, 79_200);

    let history = outcome.history.expect("history row should be appended");
    assert_eq!(history.action, "time_removed");
    assert_eq!(history.time_change_seconds, -3_600);
    assert_eq!(history.reason.as_deref(), Some("Task approved: Morning run"));

    let rows = LockHistoryRepo::list_for_lock(&pool, lock.id).await.unwrap();
    let removals = rows.iter().filter(|r| r.action == "time_removed").count();
    assert_eq!(removals, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_review_leaves_finished_lock_untouched(pool: PgPool) {
    let pair = active_pair(&pool).await;
    let keyholder = auth_user(&pair.keyholder);
    let sub = auth_user(&pair.sub);

    let lock = commands::lock::create_lock(
        &pool,
        &keyholder,
        &one_day_lock(pair.relationship_id),
        t0(),
    )
    .await
    .unwrap()
    .lock;
    let task = commands::task::create_task(
        &pool,
        &keyholder,
        &CreateTask {
            relationship_id: pair.relationship_id,
            lock_id: Some(lock.id),
            title: "Write lines".to_string(),
            description: None,
            task_type: "proof".to_string(),
            quiz_data: None,
            requires_photo: false,
            requires_text: true,
            time_reward_seconds: 0,
            time_penalty_seconds: 7_200,
        },
    )
    .await
    .unwrap();
    commands::task::submit_task(
        &pool,
        &sub,
        task.id,
        &SubmitTask {
            submission_text: Some("Done".to_string()),
            ..SubmitTask::default()
        },
        t0() + Duration::minutes(30),
    )
    .await
    .unwrap();
    commands::lock::cancel_lock(&pool, &keyholder, lock.id, None, t0() + Duration::hours(1))
        .await
        .unwrap();

    let outcome = commands::task::review_task(
        &pool,
        &keyholder,
        task.id,
        &ReviewTask {
            decision: ReviewDecision::Reject,
            review_notes: Some("Too short".to_string()),
        },
        t0() + Duration::hours(2),
    )
    .await
    .unwrap();

    assert_eq!(outcome.task.status, "rejected");
    assert!(outcome.lock.is_none());
    assert!(outcome.history.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_terminal_lock_error_is_typed(pool: PgPool) {
    let pair = active_pair(&pool).await;
    let keyholder = auth_user(&pair.keyholder);
    let lock = commands::lock::create_lock(
        &pool,
        &keyholder,
        &one_day_lock(pair.relationship_id),
        t0(),
    )
    .await
    .unwrap()
    .lock;
    commands::lock::complete_lock(&pool, &keyholder, lock.id, None, t0() + Duration::hours(1))
        .await
        .unwrap();

    let body = LockCommandBody::default();
    let err = commands::lock::resume_lock(
        &pool,
        &keyholder,
        lock.id,
        body.reason.as_deref(),
        t0() + Duration::hours(2),
    )
    .await
    .unwrap_err();
    assert_matches!(
        err,
        AppError::Lock(LockError::InvalidTransition {
            from: LockStatus::Completed,
            ..
        })
    );
}
