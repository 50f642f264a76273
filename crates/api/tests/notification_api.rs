//! HTTP-level integration tests for the `/notifications` endpoints.

mod common;

use axum::http::StatusCode;
use common::{
    active_pair, body_json, build_test_app, create_lock, delete_auth, get_auth, post_json_auth,
    token_for,
};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_notification_read_flow(pool: PgPool) {
    let pair = active_pair(&pool).await;
    create_lock(&pool, &pair, json!({ "name": "Weekend", "days": 1 })).await;
    // The sub was invited and then told about the lock.
    let token = token_for(&pair.sub);

    let app = build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/notifications/unread-count", &token).await;
    assert_eq!(body_json(response).await["data"]["count"], 2);

    let app = build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/notifications", &token).await;
    let json = body_json(response).await;
    let newest = &json["data"][0];
    assert_eq!(newest["notification_type"], "lock_created");
    assert_eq!(newest["link"], "/locks");
    let newest_id = newest["id"].as_i64().unwrap();

    let app = build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/notifications/{newest_id}/read"),
        json!({}),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/notifications?unread_only=true", &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    let app = build_test_app(pool.clone());
    let response = post_json_auth(app, "/api/v1/notifications/read-all", json!({}), &token).await;
    assert_eq!(body_json(response).await["data"]["marked_read"], 1);

    let app = build_test_app(pool);
    let response = get_auth(app, "/api/v1/notifications/unread-count", &token).await;
    assert_eq!(body_json(response).await["data"]["count"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_cannot_touch_someone_elses_notification(pool: PgPool) {
    let pair = active_pair(&pool).await;

    let app = build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/notifications", &token_for(&pair.keyholder)).await;
    let json = body_json(response).await;
    let accepted_id = json["data"][0]["id"].as_i64().unwrap();

    let app = build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/notifications/{accepted_id}/read"),
        json!({}),
        &token_for(&pair.sub),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let app = build_test_app(pool.clone());
    let response = delete_auth(
        app,
        &format!("/api/v1/notifications/{accepted_id}"),
        &token_for(&pair.sub),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let app = build_test_app(pool);
    let response = delete_auth(
        app,
        &format!("/api/v1/notifications/{accepted_id}"),
        &token_for(&pair.keyholder),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_limit_is_clamped(pool: PgPool) {
    let pair = active_pair(&pool).await;
    for name in ["One", "Two", "Three"] {
        create_lock(&pool, &pair, json!({ "name": name, "hours": 1 })).await;
    }

    let app = build_test_app(pool);
    let response = get_auth(
        app,
        "/api/v1/notifications?limit=0",
        &token_for(&pair.sub),
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}
