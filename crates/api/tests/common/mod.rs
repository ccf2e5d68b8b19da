#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use candidates_api::auth::jwt::JwtConfig;
use candidates_api::auth::password::hash_password;
use candidates_api::config::{GateConfig, ServerConfig, StorageConfig};
use candidates_api::router::build_app_router;
use candidates_api::state::AppState;
use candidates_store::backend::BackendKind;
use candidates_store::memory::MemoryBackend;
use candidates_store::CandidateService;

pub const TEST_USERNAME: &str = "admin";
pub const TEST_PASSWORD: &str = "ALFAROUQ";

/// Build a test `ServerConfig` with safe defaults and the in-memory backend.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        },
        gate: GateConfig {
            username: TEST_USERNAME.to_string(),
            password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
        },
        storage: StorageConfig {
            kind: BackendKind::Memory,
            data_file: PathBuf::from("unused.json"),
            sheets: None,
        },
    }
}

/// Build the full application router over an empty in-memory collection.
///
/// Goes through [`build_app_router`] so integration tests exercise the same
/// middleware stack (CORS, request ID, timeout, tracing, panic recovery)
/// that production uses.
pub async fn build_test_app() -> Router {
    let config = test_config();
    let state = AppState {
        config: Arc::new(config.clone()),
        candidates: Arc::new(CandidateService::open(MemoryBackend::new()).await),
        sheet: None,
    };
    build_app_router(state, &config)
}

/// Build the application over a JSON file at `path`, the way the binary
/// does with `STORAGE_BACKEND=file`.
pub async fn build_file_app(path: &Path) -> Router {
    let mut config = test_config();
    config.storage.kind = BackendKind::File;
    config.storage.data_file = path.to_path_buf();
    let state = AppState::open(config.clone())
        .await
        .expect("file backend should open");
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.expect("request should be served")
}

fn request(method: Method, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match token {
        Some(token) => builder.header("authorization", format!("Bearer {token}")),
        None => builder,
    }
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, request(Method::GET, uri, None).body(Body::empty()).unwrap()).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(
        app,
        request(Method::GET, uri, Some(token))
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(
        app,
        request(Method::POST, uri, None)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(
        app,
        request(Method::POST, uri, Some(token))
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(
        app,
        request(Method::POST, uri, Some(token))
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

pub async fn post_csv_auth(app: Router, uri: &str, csv: &str, token: &str) -> Response<Body> {
    send(
        app,
        request(Method::POST, uri, Some(token))
            .header("content-type", "text/csv")
            .body(Body::from(csv.to_string()))
            .unwrap(),
    )
    .await
}

pub async fn post_bytes_auth(
    app: Router,
    uri: &str,
    content_type: &str,
    bytes: Vec<u8>,
    token: &str,
) -> Response<Body> {
    send(
        app,
        request(Method::POST, uri, Some(token))
            .header("content-type", content_type)
            .body(Body::from(bytes))
            .unwrap(),
    )
    .await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(
        app,
        request(Method::PUT, uri, Some(token))
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(
        app,
        request(Method::DELETE, uri, Some(token))
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).expect("body should be JSON")
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).expect("body should be UTF-8")
}

/// Log in with the test credential and return the access token.
pub async fn login(app: Router) -> String {
    let body = serde_json::json!({ "username": TEST_USERNAME, "password": TEST_PASSWORD });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    body_json(response).await["access_token"]
        .as_str()
        .expect("access_token")
        .to_string()
}
