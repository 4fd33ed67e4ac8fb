#![allow(dead_code)]

use std::path::{Path, PathBuf};

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use scholar_api::auth::jwt::{generate_access_token, JwtConfig};
use scholar_api::config::{
    PaymentConfig, PaymentPluginKind, ScheduledTaskConfig, ServerConfig, SessionConfig,
};
use scholar_api::router::build_app_router;
use scholar_api::state::AppState;
use scholar_core::roles::{ROLE_AUTHOR, ROLE_MANAGER, ROLE_SITE_ADMIN};
use scholar_db::models::journal::CreateJournal;
use scholar_db::repositories::JournalRepo;

pub const TEST_JWT_SECRET: &str = "test-secret-for-integration-tests";

/// Build a test `ServerConfig` with safe defaults.
///
/// Payments use no plugin and scheduled task logs go to `log_dir`.
pub fn test_config(log_dir: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: "postgres://unused".to_string(),
        base_url: "http://journal.test".to_string(),
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        show_upgrade_warning: true,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            access_token_expiry_mins: 15,
        },
        payments: PaymentConfig {
            plugin: PaymentPluginKind::None,
            manual_instructions: String::new(),
            cleanup_odds: 100,
        },
        scheduled_tasks: ScheduledTaskConfig {
            enabled: false,
            log_dir: log_dir.to_path_buf(),
            tick_secs: 60,
        },
        sessions: SessionConfig {
            lifetime_hours: 2,
            remember_days: 30,
        },
    }
}

/// Config with the manual payment plugin enabled.
pub fn manual_payments_config(log_dir: &Path) -> ServerConfig {
    let mut config = test_config(log_dir);
    config.payments.plugin = PaymentPluginKind::Manual;
    config.payments.manual_instructions = "Send a cheque to the editorial office.".to_string();
    config
}

/// Migrate the database and build the full application router.
pub async fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, test_config(&unused_log_dir())).await
}

/// Like [`build_test_app`] with a custom configuration.
pub async fn build_test_app_with(pool: PgPool, config: ServerConfig) -> Router {
    scholar_db::run_migrations(&pool).await.unwrap();
    let state = AppState::new(pool, config.clone());
    build_app_router(state, &config)
}

fn unused_log_dir() -> PathBuf {
    std::env::temp_dir().join("scholar-api-tests-unused-logs")
}

// ---------------------------------------------------------------------------
// Tokens and fixtures
// ---------------------------------------------------------------------------

fn token(user_id: i64, role: &str) -> String {
    let config = JwtConfig {
        secret: TEST_JWT_SECRET.to_string(),
        access_token_expiry_mins: 15,
    };
    generate_access_token(user_id, role, &config).unwrap()
}

pub fn admin_token() -> String {
    token(1, ROLE_SITE_ADMIN)
}

pub fn manager_token() -> String {
    token(2, ROLE_MANAGER)
}

pub fn author_token() -> String {
    token(3, ROLE_AUTHOR)
}

/// Create a journal directly in the database and return its id.
pub async fn create_journal(pool: &PgPool, path: &str) -> i64 {
    scholar_db::run_migrations(pool).await.unwrap();
    JournalRepo::create(
        pool,
        &CreateJournal {
            path: path.to_string(),
            primary_locale: "en".to_string(),
            name: Some(format!("Journal {path}")),
            enabled: None,
        },
    )
    .await
    .unwrap()
    .id
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

/// Unauthenticated GET.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Collect a response body as bytes.
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}
