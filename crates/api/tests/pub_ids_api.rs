//! HTTP-level tests for the public identifiers form.

mod common;

use axum::http::StatusCode;
use common::{author_token, body_json, create_journal, delete_auth, get_auth, manager_token, put_json_auth};
use serde_json::json;
use sqlx::PgPool;

fn form_uri(journal_id: i64, kind: &str, id: i64) -> String {
    format!("/api/v1/journals/{journal_id}/pub-ids/{kind}/{id}")
}

#[sqlx::test(migrations = false)]
async fn publisher_id_is_saved_and_shown(pool: PgPool) {
    let journal_id = create_journal(&pool, "jcs").await;
    let app = common::build_test_app(pool).await;
    let uri = form_uri(journal_id, "publication", 11);

    let body = json!({ "publisher_id": "  art-2024-11 ", "stage_id": 5 });
    let response = put_json_auth(app.clone(), &uri, body, &manager_token()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["publisher_id"], "art-2024-11");
    assert_eq!(json["data"]["stage_id"], 5);

    let response = get_auth(app, &uri, &manager_token()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["publisher_id"], "art-2024-11");
    assert_eq!(
        json["data"]["pub_object"]["stored_pub_ids"]["publisher-id"],
        "art-2024-11"
    );
}

#[sqlx::test(migrations = false)]
async fn format_errors_answer_422_with_field_errors(pool: PgPool) {
    let journal_id = create_journal(&pool, "jcs").await;
    let app = common::build_test_app(pool).await;

    let long = "x".repeat(256);
    let cases = [
        ("publication", "12345", "editor.publicIdentificationNumericNotAllowed"),
        ("publication", "a/b", "editor.publicIdentificationPatternNotAllowed"),
        ("submission-file", "3-7", "editor.publicIdentificationPatternNotAllowed"),
        ("publication", long.as_str(), "validator.maxLength"),
    ];
    for (kind, value, message) in cases {
        let body = json!({ "publisher_id": value });
        let response =
            put_json_auth(app.clone(), &form_uri(journal_id, kind, 1), body, &manager_token()).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY, "{kind} {value}");
        let json = body_json(response).await;
        assert_eq!(json["code"], "FORM_INVALID");
        assert_eq!(json["errors"][0]["field"], "publisher_id");
        assert_eq!(json["errors"][0]["message"], message);
    }
}

#[sqlx::test(migrations = false)]
async fn duplicate_publisher_id_for_same_type_is_rejected(pool: PgPool) {
    let journal_id = create_journal(&pool, "jcs").await;
    let app = common::build_test_app(pool).await;
    let body = json!({ "publisher_id": "shared-id" });

    let response = put_json_auth(
        app.clone(),
        &form_uri(journal_id, "publication", 1),
        body.clone(),
        &manager_token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Saving the same object again is fine.
    let response = put_json_auth(
        app.clone(),
        &form_uri(journal_id, "publication", 1),
        body.clone(),
        &manager_token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = put_json_auth(
        app,
        &form_uri(journal_id, "publication", 2),
        body,
        &manager_token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(
        json["errors"][0]["message"],
        "editor.publicIdentificationExistsForTheSameType"
    );
}

#[sqlx::test(migrations = false)]
async fn clearing_removes_the_stored_id(pool: PgPool) {
    let journal_id = create_journal(&pool, "jcs").await;
    let app = common::build_test_app(pool).await;
    let uri = form_uri(journal_id, "issue", 4);

    let body = json!({ "publisher_id": "vol-1" });
    put_json_auth(app.clone(), &uri, body, &manager_token()).await;

    let response = delete_auth(app.clone(), &format!("{uri}/publisher-id"), &manager_token()).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let json = body_json(get_auth(app, &uri, &manager_token()).await).await;
    assert!(json["data"]["publisher_id"].is_null());
}

#[sqlx::test(migrations = false)]
async fn unknown_kind_and_non_manager_are_rejected(pool: PgPool) {
    let journal_id = create_journal(&pool, "jcs").await;
    let app = common::build_test_app(pool).await;

    let response = get_auth(app.clone(), &form_uri(journal_id, "galley", 1), &manager_token()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get_auth(app, &form_uri(journal_id, "publication", 1), &author_token()).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = false)]
async fn objects_of_another_journal_are_not_found(pool: PgPool) {
    let journal_id = create_journal(&pool, "jcs").await;
    let other = create_journal(&pool, "other").await;
    let app = common::build_test_app(pool).await;

    let body = json!({ "publisher_id": "jcs-10" });
    let response = put_json_auth(
        app.clone(),
        &form_uri(journal_id, "submission", 10),
        body,
        &manager_token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let uri = form_uri(other, "submission", 10);
    let response = get_auth(app.clone(), &uri, &manager_token()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = json!({ "publisher_id": "other-10" });
    let response = put_json_auth(app.clone(), &uri, body, &manager_token()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get_auth(app, &form_uri(journal_id, "submission", 10), &manager_token()).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["publisher_id"], "jcs-10");
}
