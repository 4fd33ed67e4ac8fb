//! HTTP-level tests for journal announcements.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{body_json, create_journal, delete_auth, get_auth, manager_token, post_json_auth, put_json_auth};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = false)]
async fn announcement_lifecycle(pool: PgPool) {
    let journal_id = create_journal(&pool, "jcs").await;
    let app = common::build_test_app(pool).await;
    let token = manager_token();
    let base = format!("/api/v1/journals/{journal_id}");

    let body = json!({ "name": { "en": "Call for papers" } });
    let response = post_json_auth(app.clone(), &format!("{base}/announcement-types"), body, &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let type_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let body = json!({
        "type_id": type_id,
        "title": { "en": "Special issue" },
        "description_short": { "en": "Submit by June" },
    });
    let response = post_json_auth(app.clone(), &format!("{base}/announcements"), body, &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let id = json["data"]["id"].as_i64().unwrap();
    assert_eq!(json["data"]["assoc_id"], journal_id);
    assert_eq!(json["data"]["type_id"], type_id);

    let body = json!({ "title": { "en": "Special issue on compilers" } });
    let response =
        put_json_auth(app.clone(), &format!("{base}/announcements/{id}"), body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_auth(app.clone(), &format!("{base}/announcements/{id}"), &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["settings"]["title"]["en"], "Special issue on compilers");

    let response =
        delete_auth(app.clone(), &format!("{base}/announcements/{id}"), &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(app, &format!("{base}/announcements/{id}"), &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = false)]
async fn active_listing_hides_expired_announcements(pool: PgPool) {
    let journal_id = create_journal(&pool, "jcs").await;
    let app = common::build_test_app(pool).await;
    let token = manager_token();
    let uri = format!("/api/v1/journals/{journal_id}/announcements");

    let yesterday = (Utc::now() - Duration::days(1)).date_naive();
    let body = json!({ "title": { "en": "Old" }, "date_expire": yesterday });
    post_json_auth(app.clone(), &uri, body, &token).await;
    let body = json!({ "title": { "en": "Current" } });
    post_json_auth(app.clone(), &uri, body, &token).await;

    let json = body_json(get_auth(app.clone(), &uri, &token).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);

    let json = body_json(get_auth(app, &format!("{uri}?active_only=true"), &token).await).await;
    let active = json["data"].as_array().unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0]["settings"]["title"]["en"], "Current");
}

#[sqlx::test(migrations = false)]
async fn announcements_stay_within_their_journal(pool: PgPool) {
    let journal_id = create_journal(&pool, "jcs").await;
    let other = create_journal(&pool, "other").await;
    let app = common::build_test_app(pool).await;
    let token = manager_token();

    let body = json!({ "name": { "en": "News" } });
    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/journals/{other}/announcement-types"),
        body,
        &token,
    )
    .await;
    let foreign_type = body_json(response).await["data"]["id"].as_i64().unwrap();

    let body = json!({ "title": { "en": "Hello" }, "type_id": foreign_type });
    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/journals/{journal_id}/announcements"),
        body,
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json!({ "title": {} });
    let response = post_json_auth(
        app,
        &format!("/api/v1/journals/{journal_id}/announcements"),
        body,
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
