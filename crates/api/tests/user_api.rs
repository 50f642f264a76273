//! HTTP-level integration tests for profiles and partner search.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, create_user, get_auth, put_json_auth, token_for};
use keyholder_db::repositories::UserRepo;
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_own_profile(pool: PgPool) {
    let sub = create_user(&pool, "Sam", "sub").await;
    let token = token_for(&sub);

    let app = build_test_app(pool.clone());
    let response = put_json_auth(
        app,
        "/api/v1/users/me",
        json!({ "display_name": "  Sammy ", "bio": "Runner", "country": "PL", "avatar_url": "" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["display_name"], "Sammy");
    assert_eq!(json["data"]["country"], "PL");
    assert!(json["data"]["avatar_url"].is_null());
    assert_eq!(json["data"]["role"], "sub");

    let app = build_test_app(pool);
    let me = body_json(get_auth(app, "/api/v1/users/me", &token).await).await;
    assert_eq!(me["data"]["bio"], "Runner");
    assert_eq!(me["data"]["email"], "sam@test.com");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invalid_profile_is_rejected(pool: PgPool) {
    let sub = create_user(&pool, "Sam", "sub").await;
    let token = token_for(&sub);

    for body in [
        json!({ "display_name": "" }),
        json!({ "display_name": "Sam", "bio": "b".repeat(501) }),
        json!({ "display_name": "Sam", "avatar_url": "ftp://files/me.png" }),
    ] {
        let app = build_test_app(pool.clone());
        let response = put_json_auth(app, "/api/v1/users/me", body, &token).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_public_profile_hides_private_fields(pool: PgPool) {
    let keyholder = create_user(&pool, "Kira", "keyholder").await;
    let sub = create_user(&pool, "Sam", "sub").await;

    let app = build_test_app(pool.clone());
    let response = get_auth(
        app,
        &format!("/api/v1/users/{}", keyholder.id),
        &token_for(&sub),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["display_name"], "Kira");
    assert!(json["data"].get("email").is_none());
    assert!(json["data"].get("status").is_none());

    UserRepo::update_status(&pool, keyholder.id, "banned").await.unwrap();
    let app = build_test_app(pool);
    let response = get_auth(
        app,
        &format!("/api/v1/users/{}", keyholder.id),
        &token_for(&sub),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_search_finds_partners_by_name_or_country(pool: PgPool) {
    let keyholder = create_user(&pool, "Kira", "keyholder").await;
    create_user(&pool, "Kimberly", "sub").await;
    let nordic = create_user(&pool, "Nils", "sub").await;
    create_user(&pool, "Kimi", "keyholder").await;
    let suspended = create_user(&pool, "Kit", "sub").await;
    UserRepo::update_status(&pool, suspended.id, "suspended")
        .await
        .unwrap();
    sqlx::query("UPDATE users SET country = 'Norway' WHERE id = $1")
        .bind(nordic.id)
        .execute(&pool)
        .await
        .unwrap();
    let token = token_for(&keyholder);

    let app = build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/users/search?q=ki", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let names: Vec<_> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["display_name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["Kimberly"]);

    let app = build_test_app(pool);
    let response = get_auth(app, "/api/v1/users/search?q=norw", &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"][0]["id"], nordic.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_search_input_is_checked(pool: PgPool) {
    let sub = create_user(&pool, "Sam", "sub").await;
    let admin = create_user(&pool, "Ada", "admin").await;

    for (uri, token) in [
        ("/api/v1/users/search?q=k", token_for(&sub)),
        ("/api/v1/users/search?q=sam&role=sub", token_for(&sub)),
        ("/api/v1/users/search?q=sam", token_for(&admin)),
    ] {
        let app = build_test_app(pool.clone());
        let response = get_auth(app, uri, &token).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
    }

    let app = build_test_app(pool);
    let response = get_auth(app, "/api/v1/users/search?q=sa&role=sub", &token_for(&admin)).await;
    let json = body_json(response).await;
    assert_eq!(json["data"][0]["display_name"], "Sam");
}
