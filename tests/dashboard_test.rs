mod common;

use axum::http::StatusCode;
use chrono::{Local, NaiveDate};
use tower::ServiceExt;

#[tokio::test]
async fn test_dashboard_renders_empty_state() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool);

    let response = app.oneshot(common::get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_string(response).await;
    assert!(body.contains("No records yet. Go lift!"));
    assert!(body.contains("<strong id=\"streak\">0</strong>"));
}

#[tokio::test]
async fn test_dashboard_lists_personal_records() {
    let pool = common::setup_test_db();
    let squat = common::create_test_exercise(&pool, "Squat", Some("Legs"), true, 0).await;
    let today = Local::now().date_naive();
    let session = common::create_test_session(&pool, today, Some(1800)).await;
    common::create_test_sets(&pool, session.id, squat.id, &[(100.0, 5), (120.0, 3)]).await;
    let app = common::create_test_app(pool);

    let response = app.oneshot(common::get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_string(response).await;
    assert!(body.contains("Squat"));
    assert!(body.contains("120 kg x 3 reps"));
    assert!(!body.contains("No records yet"));
}

#[tokio::test]
async fn test_summary_counts_today() {
    let pool = common::setup_test_db();
    let today = Local::now().date_naive();
    common::create_test_session(&pool, today, None).await;
    let app = common::create_test_app(pool);

    let response = app.oneshot(common::get("/api/summary")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = common::body_json(response).await;
    assert_eq!(json["streak"], 1);
    assert_eq!(json["this_week"], 1);
    assert_eq!(json["this_month"], 1);
    assert_eq!(json["this_year"], 1);
}

#[tokio::test]
async fn test_charts_and_exercise_selection() {
    let pool = common::setup_test_db();
    let bench = common::create_test_exercise(&pool, "Bench Press", Some("Chest"), true, 0).await;
    let squat = common::create_test_exercise(&pool, "Squat", Some("Legs"), true, 1).await;
    let first = common::create_test_session(
        &pool,
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        Some(3600),
    )
    .await;
    let second = common::create_test_session(
        &pool,
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
        None,
    )
    .await;
    common::create_test_sets(&pool, first.id, bench.id, &[(80.0, 5)]).await;
    common::create_test_sets(&pool, first.id, squat.id, &[(100.0, 5)]).await;
    common::create_test_sets(&pool, second.id, squat.id, &[(110.0, 5)]).await;
    let app = common::create_test_app(pool);

    let response = app
        .clone()
        .oneshot(common::get("/api/dashboard"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = common::body_json(response).await;
    assert_eq!(json["selected_exercise_id"], bench.id);
    assert_eq!(json["exercise_volume"]["values"], serde_json::json!([400.0]));
    assert_eq!(
        json["session_volume"]["labels"],
        serde_json::json!(["01/06/2024", "03/06/2024"])
    );
    assert_eq!(json["duration"]["values"], serde_json::json!([60.0]));

    let uri = format!("/api/dashboard?exercise_id={}", squat.id);
    let response = app.clone().oneshot(common::get(&uri)).await.unwrap();
    let json = common::body_json(response).await;
    assert_eq!(json["selected_exercise_id"], squat.id);
    assert_eq!(
        json["exercise_volume"]["values"],
        serde_json::json!([500.0, 550.0])
    );

    let uri = format!("/api/dashboard/exercises/{}", squat.id);
    let response = app.clone().oneshot(common::get(&uri)).await.unwrap();
    let json = common::body_json(response).await;
    assert_eq!(json["label"], "Volume for Squat (kg)");

    let response = app
        .oneshot(common::get("/api/dashboard/exercises/999"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_calendar_events() {
    let pool = common::setup_test_db();
    let session = common::create_test_session(
        &pool,
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        None,
    )
    .await;
    let app = common::create_test_app(pool);

    let response = app.oneshot(common::get("/api/calendar")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = common::body_json(response).await;
    let events = json.as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["session_id"], session.id);
    assert_eq!(events[0]["start"], "2024-06-01");
    assert_eq!(events[0]["all_day"], true);
}

#[tokio::test]
async fn test_dashboard_page_renders_charts_and_calendar() {
    let pool = common::setup_test_db();
    let bench = common::create_test_exercise(&pool, "Bench Press", Some("Chest"), true, 0).await;
    let session = common::create_test_session(
        &pool,
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        Some(1800),
    )
    .await;
    common::create_test_sets(&pool, session.id, bench.id, &[(100.0, 5)]).await;
    let app = common::create_test_app(pool);

    let uri = format!("/?exercise_id={}", bench.id);
    let response = app.clone().oneshot(common::get(&uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_string(response).await;
    assert!(body.contains("<caption>Total Volume (kg)</caption>"));
    assert!(body.contains("<caption>Volume for Bench Press (kg)</caption>"));
    assert!(body.contains("<th>01/06/2024</th><td>500</td>"));
    assert!(body.contains(" selected>Bench Press</option>"));
    assert!(body.contains(&format!("href=\"/sessions/{}/edit\"", session.id)));

    let response = app.oneshot(common::get("/?exercise_id=999")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
