//! HTTP-level tests for queued and completed payments.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_journal, get_auth, manager_token, post_auth, post_json_auth, put_json_auth};
use serde_json::json;
use sqlx::PgPool;

async fn enable_payments(app: axum::Router, journal_id: i64) {
    let uri = format!("/api/v1/journals/{journal_id}/settings");
    let body = json!({ "payments_enabled": true, "currency": "usd" });
    let response = put_json_auth(app, &uri, body, &manager_token()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["payments_enabled"], true);
    assert_eq!(json["data"]["currency"], "USD");
}

#[sqlx::test(migrations = false)]
async fn queueing_without_a_plugin_is_a_conflict(pool: PgPool) {
    let journal_id = create_journal(&pool, "jcs").await;
    let app = common::build_test_app(pool).await;
    enable_payments(app.clone(), journal_id).await;

    let uri = format!("/api/v1/journals/{journal_id}/payments/queue");
    let body = json!({ "amount": 10.0, "payment_type": 1 });
    let response = post_json_auth(app.clone(), &uri, body, &manager_token()).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let uri = format!("/api/v1/journals/{journal_id}/payments/configuration");
    let response = get_auth(app, &uri, &manager_token()).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = false)]
async fn manual_plugin_needs_payments_enabled(pool: PgPool) {
    let journal_id = create_journal(&pool, "jcs").await;
    let log_dir = tempfile::tempdir().unwrap();
    let app =
        common::build_test_app_with(pool, common::manual_payments_config(log_dir.path())).await;

    let uri = format!("/api/v1/journals/{journal_id}/payments/queue");
    let body = json!({ "amount": 10.0, "currency_code": "EUR", "payment_type": 1 });
    let response = post_json_auth(app, &uri, body, &manager_token()).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = false)]
async fn queue_and_fulfill_with_manual_plugin(pool: PgPool) {
    let journal_id = create_journal(&pool, "jcs").await;
    let log_dir = tempfile::tempdir().unwrap();
    let app =
        common::build_test_app_with(pool, common::manual_payments_config(log_dir.path())).await;
    enable_payments(app.clone(), journal_id).await;
    let token = manager_token();

    let uri = format!("/api/v1/journals/{journal_id}/payments/queue");
    let body = json!({
        "amount": 25.5,
        "payment_type": 2,
        "user_id": 7,
        "request_url": "http://journal.test/article/3",
    });
    let response = post_json_auth(app.clone(), &uri, body, &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let queued_id = json["data"]["id"].as_i64().unwrap();
    assert_eq!(json["data"]["currency_code"], "USD");
    assert_eq!(json["data"]["context_id"], journal_id);

    let base = format!("/api/v1/journals/{journal_id}/payments/queued/{queued_id}");
    let response = get_auth(app.clone(), &format!("{base}/form"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["queued_payment_id"], queued_id);
    assert_eq!(json["data"]["instructions"], "Send a cheque to the editorial office.");

    let response = post_auth(app.clone(), &format!("{base}/fulfill"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["fulfilled"], true);

    // The queued payment is gone once fulfilled.
    let response = get_auth(app.clone(), &base, &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let uri = format!("/api/v1/journals/{journal_id}/payments/completed");
    let response = get_auth(app, &uri, &token).await;
    let json = body_json(response).await;
    let completed = json["data"].as_array().unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0]["amount"], 25.5);
    assert_eq!(completed[0]["user_id"], 7);
}

#[sqlx::test(migrations = false)]
async fn queued_payment_of_another_journal_is_not_found(pool: PgPool) {
    let first = create_journal(&pool, "first").await;
    let second = create_journal(&pool, "second").await;
    let log_dir = tempfile::tempdir().unwrap();
    let app =
        common::build_test_app_with(pool, common::manual_payments_config(log_dir.path())).await;
    enable_payments(app.clone(), first).await;

    let uri = format!("/api/v1/journals/{first}/payments/queue");
    let body = json!({ "amount": 5.0, "payment_type": 1 });
    let response = post_json_auth(app.clone(), &uri, body, &manager_token()).await;
    let queued_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let uri = format!("/api/v1/journals/{second}/payments/queued/{queued_id}");
    let response = get_auth(app, &uri, &manager_token()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
