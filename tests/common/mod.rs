#![allow(dead_code)]

use axum::{body::Body, response::Response, Router};
use chrono::NaiveDate;
use http::{header, Method, Request};
use http_body_util::BodyExt;
use serde_json::Value;

use ironlog::db::{create_memory_pool, DbPool};
use ironlog::migrations::run_migrations_for_tests;
use ironlog::models::{Exercise, NewWorkoutSet, WorkoutSession};
use ironlog::repositories::{NewExercise, Repositories};
use ironlog::services::DraftStore;

pub fn setup_test_db() -> DbPool {
    let pool = create_memory_pool().expect("Failed to create test database");
    run_migrations_for_tests(&pool).expect("Failed to run migrations");
    pool
}

pub fn create_test_app(pool: DbPool) -> Router {
    use ironlog::handlers::{backup, dashboard, health, routine, sessions, settings};

    let repos = Repositories::new(pool.clone());

    let health_state = health::HealthState { pool };
    let dashboard_state = dashboard::DashboardState {
        repos: repos.clone(),
    };
    let sessions_state = sessions::SessionsState {
        repos: repos.clone(),
        drafts: DraftStore::new(),
    };
    let routine_state = routine::RoutineState {
        repos: repos.clone(),
    };
    let settings_state = settings::SettingsState {
        repos: repos.clone(),
    };
    let backup_state = backup::BackupState { repos };

    ironlog::routes::create_router(
        health_state,
        dashboard_state,
        sessions_state,
        routine_state,
        settings_state,
        backup_state,
    )
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// A form post as the browser sends it.
pub fn form_request(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub const MULTIPART_BOUNDARY: &str = "ironlog-test-boundary";

/// A multipart upload with text fields and one JSON file field.
pub fn multipart_request(uri: &str, fields: &[(&str, &str)], file: (&str, &str)) -> Request<Body> {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
            MULTIPART_BOUNDARY, name, value
        ));
    }
    let (name, contents) = file;
    body.push_str(&format!(
        "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"backup.json\"\r\nContent-Type: application/json\r\n\r\n{}\r\n--{}--\r\n",
        MULTIPART_BOUNDARY, name, contents, MULTIPART_BOUNDARY
    ));

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", MULTIPART_BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn location(response: &Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string()
}

pub async fn body_string(response: Response) -> String {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8_lossy(&body).to_string()
}

pub async fn body_json(response: Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

// Test data creation helpers
pub async fn create_test_exercise(
    pool: &DbPool,
    name: &str,
    muscle_group: Option<&str>,
    is_in_routine: bool,
    ordering: i64,
) -> Exercise {
    let repos = Repositories::new(pool.clone());
    repos
        .exercises
        .create(NewExercise {
            name: name.to_string(),
            muscle_group: muscle_group.map(str::to_string),
            is_in_routine,
            ordering,
        })
        .await
        .unwrap()
}

pub async fn create_test_session(
    pool: &DbPool,
    date: NaiveDate,
    duration: Option<i64>,
) -> WorkoutSession {
    let repos = Repositories::new(pool.clone());
    repos.sessions.create_session(date, duration).await.unwrap()
}

/// Inserts `(weight, reps)` pairs as sets 1..n of one exercise.
pub async fn create_test_sets(
    pool: &DbPool,
    session_id: i64,
    exercise_id: i64,
    sets: &[(f64, i64)],
) {
    let repos = Repositories::new(pool.clone());
    let sets = sets
        .iter()
        .enumerate()
        .map(|(i, &(weight, reps))| NewWorkoutSet {
            workout_session_id: session_id,
            exercise_id,
            set_number: i as i64 + 1,
            weight,
            reps,
        })
        .collect();
    repos.sets.insert_many(sets).await.unwrap();
}
