use std::path::{Path, PathBuf};

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use groundwork_api::config::ServerConfig;
use groundwork_api::router;
use groundwork_api::state::AppState;

/// Token used by every authenticated test request.
pub const TEST_TOKEN: &str = "test-token";

/// Build a test `ServerConfig` pointing at the given configuration root.
pub fn test_config(config_root: PathBuf) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        request_timeout_secs: 30,
        api_token: Some(TEST_TOKEN.to_string()),
        config_root,
        dedup_cooldown_secs: 60,
        heartbeat_timeout_secs: 120,
    }
}

/// Build the full application router with all middleware layers, using
/// the given database pool and configuration root. Mirrors the router
/// construction in `main.rs` so integration tests exercise the same
/// middleware stack that production uses.
pub fn build_test_app(pool: PgPool, config_root: PathBuf) -> Router {
    router::build(AppState::new(pool, test_config(config_root)))
}

/// Create a configuration root with one valid configuration named `net`.
pub fn fixture_root(dir: &Path) -> PathBuf {
    let root = dir.join("configurations");
    std::fs::create_dir(&root).unwrap();
    let net = root.join("net");
    std::fs::create_dir(&net).unwrap();
    std::fs::write(net.join("main.tf"), "resource \"null_resource\" \"noop\" {}\n").unwrap();
    root
}

pub async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn get_auth(app: Router, uri: &str) -> Response {
    app.oneshot(
        Request::get(uri)
            .header(AUTHORIZATION, format!("Token {TEST_TOKEN}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// POST with the test token and a form-encoded body of variables.
pub async fn post_form(app: Router, uri: &str, form: &str) -> Response {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(AUTHORIZATION, format!("Token {TEST_TOKEN}"))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn body_string(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}
