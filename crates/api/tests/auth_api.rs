//! Token authentication behaviour.

mod common;

use axum::body::Body;
use axum::http::header::AUTHORIZATION;
use axum::http::{Request, StatusCode};
use common::{body_json, get, get_auth};
use sqlx::PgPool;
use tower::ServiceExt;

use groundwork_api::config::ServerConfig;
use groundwork_api::router;
use groundwork_api::state::AppState;

#[sqlx::test(migrations = "../db/migrations")]
async fn missing_token_is_rejected(pool: PgPool) {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(pool, common::fixture_root(dir.path()));

    let response = get(app, "/api/v1/configurations").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn wrong_token_is_rejected(pool: PgPool) {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(pool, common::fixture_root(dir.path()));

    let response = app
        .oneshot(
            Request::get("/api/v1/configurations")
                .header(AUTHORIZATION, "Token wrong-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unconfigured_token_fails_closed(pool: PgPool) {
    let dir = tempfile::tempdir().unwrap();
    let mut config: ServerConfig = common::test_config(common::fixture_root(dir.path()));
    config.api_token = None;
    let app = router::build(AppState::new(pool, config));

    // Even a request presenting some token is rejected.
    let response = app
        .oneshot(
            Request::get("/api/v1/configurations")
                .header(AUTHORIZATION, "Token anything")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn valid_token_lists_configurations(pool: PgPool) {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(pool, common::fixture_root(dir.path()));

    let response = get_auth(app, "/api/v1/configurations").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"], serde_json::json!(["net"]));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn health_does_not_require_a_token(pool: PgPool) {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(pool, common::fixture_root(dir.path()));

    let response = get(app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
}
