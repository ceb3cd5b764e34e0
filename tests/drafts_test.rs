mod common;

use axum::http::{Method, StatusCode};
use chrono::NaiveDate;
use ironlog::db::DbPool;
use ironlog::repositories::Repositories;
use serde_json::{json, Value};
use tokio_test::assert_ok;
use tower::ServiceExt;

async fn open_draft(app: &axum::Router, session_id: Option<i64>) -> (String, Value) {
    let response = app
        .clone()
        .oneshot(common::json_request(
            Method::POST,
            "/api/drafts",
            json!({ "session_id": session_id }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = common::body_json(response).await;
    assert_ok!(uuid::Uuid::parse_str(json["draft_id"].as_str().unwrap()));
    (
        json["draft_id"].as_str().unwrap().to_string(),
        json["view"].clone(),
    )
}

async fn send(app: &axum::Router, draft_id: &str, command: Value) -> (StatusCode, String) {
    let response = app
        .clone()
        .oneshot(common::json_request(
            Method::POST,
            &format!("/api/drafts/{}/commands", draft_id),
            command,
        ))
        .await
        .unwrap();
    let status = response.status();
    (status, common::body_string(response).await)
}

async fn sets_in_db(pool: &DbPool) -> usize {
    Repositories::new(pool.clone())
        .sets
        .find_all()
        .await
        .unwrap()
        .len()
}

#[tokio::test]
async fn test_new_draft_shows_routine_rows() {
    let pool = common::setup_test_db();
    common::create_test_exercise(&pool, "Squat", Some("Legs"), true, 0).await;
    common::create_test_exercise(&pool, "Curl", Some("Biceps"), false, 1).await;
    let app = common::create_test_app(pool);

    let (_, view) = open_draft(&app, None).await;

    let rows = view["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], "Squat");
    assert_eq!(rows[0]["sets"][0]["weight"], "");
    assert_eq!(rows[0]["sets"][0]["weight_placeholder"], "kg");
    assert_eq!(rows[0]["previous_volume"], "N/A");
    assert_eq!(view["session_id"], Value::Null);
}

#[tokio::test]
async fn test_record_set_and_save() {
    let pool = common::setup_test_db();
    let squat = common::create_test_exercise(&pool, "Squat", Some("Legs"), true, 0).await;
    let app = common::create_test_app(pool.clone());
    let (draft_id, _) = open_draft(&app, None).await;

    let (status, body) = send(
        &app,
        &draft_id,
        json!({"type": "update_set", "exercise_id": squat.id, "set_index": 0, "weight": "100", "reps": "5"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let view: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(view["rows"][0]["sets"][0]["is_record"], true);
    assert_eq!(view["rows"][0]["volume"], "500.0");

    let (status, _) = send(
        &app,
        &draft_id,
        json!({"type": "add_set", "exercise_id": squat.id}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let response = app
        .clone()
        .oneshot(common::json_request(
            Method::POST,
            &format!("/api/drafts/{}/save", draft_id),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let saved = common::body_json(response).await;
    assert_eq!(saved["sets_saved"], 1);
    assert_eq!(sets_in_db(&pool).await, 1);

    let response = app
        .oneshot(common::get(&format!("/api/drafts/{}", draft_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleting_last_set_is_rejected() {
    let pool = common::setup_test_db();
    let squat = common::create_test_exercise(&pool, "Squat", Some("Legs"), true, 0).await;
    let app = common::create_test_app(pool);
    let (draft_id, _) = open_draft(&app, None).await;

    let (status, body) = send(
        &app,
        &draft_id,
        json!({"type": "delete_set", "exercise_id": squat.id}),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body, "Each exercise must have at least one set.");
}

#[tokio::test]
async fn test_edit_existing_session_replaces_sets() {
    let pool = common::setup_test_db();
    let squat = common::create_test_exercise(&pool, "Squat", Some("Legs"), true, 0).await;
    let session = common::create_test_session(
        &pool,
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        Some(600),
    )
    .await;
    common::create_test_sets(&pool, session.id, squat.id, &[(100.0, 5), (100.0, 5)]).await;
    let app = common::create_test_app(pool.clone());

    let (draft_id, view) = open_draft(&app, Some(session.id)).await;
    assert_eq!(view["title"], "Workout Session - 01/06/2024");
    assert_eq!(view["rows"][0]["sets"].as_array().unwrap().len(), 2);
    assert_eq!(view["rows"][0]["volume"], "1000.0");

    let (status, _) = send(
        &app,
        &draft_id,
        json!({"type": "delete_set", "exercise_id": squat.id}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let response = app
        .oneshot(common::json_request(
            Method::POST,
            &format!("/api/drafts/{}/save", draft_id),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let saved = common::body_json(response).await;
    assert_eq!(saved["session_id"], session.id);
    assert_eq!(sets_in_db(&pool).await, 1);
}

#[tokio::test]
async fn test_add_exercise_to_draft() {
    let pool = common::setup_test_db();
    common::create_test_exercise(&pool, "Squat", Some("Legs"), true, 0).await;
    let app = common::create_test_app(pool);
    let (draft_id, _) = open_draft(&app, None).await;
    let uri = format!("/api/drafts/{}/exercises", draft_id);

    let response = app
        .clone()
        .oneshot(common::json_request(
            Method::POST,
            &uri,
            json!({"name": "  Lunge "}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = common::body_json(response).await;
    assert_eq!(json["exercise"]["name"], "Lunge");
    assert_eq!(json["view"]["rows"].as_array().unwrap().len(), 2);

    let response = app
        .oneshot(common::json_request(
            Method::POST,
            &uri,
            json!({"name": "Squat"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_discard_draft() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool);
    let (draft_id, _) = open_draft(&app, None).await;
    let uri = format!("/api/drafts/{}", draft_id);

    let response = app.clone().oneshot(common::delete(&uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.oneshot(common::delete(&uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_open_missing_session_is_not_found() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool);

    let response = app
        .oneshot(common::json_request(
            Method::POST,
            "/api/drafts",
            json!({"session_id": 42}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_session_removes_sets() {
    let pool = common::setup_test_db();
    let squat = common::create_test_exercise(&pool, "Squat", Some("Legs"), true, 0).await;
    let session = common::create_test_session(
        &pool,
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        None,
    )
    .await;
    common::create_test_sets(&pool, session.id, squat.id, &[(100.0, 5)]).await;
    let app = common::create_test_app(pool.clone());
    let uri = format!("/api/sessions/{}", session.id);

    let response = app.clone().oneshot(common::delete(&uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(sets_in_db(&pool).await, 0);

    let response = app.oneshot(common::delete(&uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
