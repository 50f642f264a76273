#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use keyholder_api::auth::jwt::{generate_access_token, JwtConfig};
use keyholder_api::config::{LimitsConfig, ServerConfig};
use keyholder_api::middleware::auth::AuthUser;
use keyholder_api::routes;
use keyholder_api::state::AppState;
use keyholder_db::models::user::{CreateUser, User};
use keyholder_db::repositories::UserRepo;

pub const TEST_ORIGIN: &str = "http://localhost:3001";

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test-secret-for-integration-tests".to_string(),
        issuer: None,
        access_token_expiry_mins: 15,
    }
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec![TEST_ORIGIN.to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        limits: LimitsConfig::default(),
        jwt: test_jwt_config(),
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
///
/// This mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack that production uses.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_config(pool, test_config())
}

/// [`build_test_app`] with a caller-supplied configuration, for tests that
/// tighten limits.
pub fn build_test_app_with_config(pool: PgPool, config: ServerConfig) -> Router {
    let state = AppState {
        pool,
        config: Arc::new(config),
    };

    let cors = CorsLayer::new()
        .allow_origin([TEST_ORIGIN.parse().unwrap()])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Users and tokens
// ---------------------------------------------------------------------------

pub async fn create_user(pool: &PgPool, name: &str, role: &str) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            display_name: name.to_string(),
            email: format!("{}@test.com", name.to_lowercase()),
            role: role.to_string(),
        },
    )
    .await
    .expect("user creation should succeed")
}

pub fn token_for(user: &User) -> String {
    generate_access_token(user.id, &user.role, &test_jwt_config())
        .expect("token generation should succeed")
}

pub fn auth_user(user: &User) -> AuthUser {
    AuthUser {
        user_id: user.id,
        role: user.role.parse().expect("fixture users have known roles"),
    }
}

/// A keyholder, a sub and the id of an accepted relationship between them.
pub struct Pair {
    pub keyholder: User,
    pub sub: User,
    pub relationship_id: i64,
}

/// Invite and accept through the API so the fixture follows the same path
/// real users do.
pub async fn active_pair(pool: &PgPool) -> Pair {
    let keyholder = create_user(pool, "Kira", "keyholder").await;
    let sub = create_user(pool, "Sam", "sub").await;

    let app = build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/relationships",
        serde_json::json!({ "invitee_id": sub.id }),
        &token_for(&keyholder),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let relationship_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let app = build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/relationships/{relationship_id}/accept"),
        serde_json::json!({}),
        &token_for(&sub),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    Pair {
        keyholder,
        sub,
        relationship_id,
    }
}

/// Create a lock through the API and return its JSON (`data.lock`).
pub async fn create_lock(
    pool: &PgPool,
    pair: &Pair,
    body: serde_json::Value,
) -> serde_json::Value {
    let mut body = body;
    body["relationship_id"] = serde_json::json!(pair.relationship_id);
    let app = build_test_app(pool.clone());
    let response = post_json_auth(app, "/api/v1/locks", body, &token_for(&pair.keyholder)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["lock"].clone()
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

fn json_request(
    method: Method,
    uri: &str,
    body: &serde_json::Value,
    token: Option<&str>,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn empty_request(method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, empty_request(Method::GET, uri, None)).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, empty_request(Method::GET, uri, Some(token))).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, json_request(Method::POST, uri, &body, Some(token))).await
}

/// POST with a bearer token, no body and no content type.
pub async fn post_empty_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, empty_request(Method::POST, uri, Some(token))).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, json_request(Method::PUT, uri, &body, Some(token))).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, empty_request(Method::DELETE, uri, Some(token))).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
