use axum::{http::StatusCode, response::IntoResponse};
use http_body_util::BodyExt;
use ironlog::error::AppError;

async fn body_of(error: AppError) -> (StatusCode, String) {
    let response = error.into_response();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8_lossy(&body).to_string())
}

#[test]
fn test_not_found_returns_404() {
    let error = AppError::NotFound("Resource not found".to_string());
    let response = error.into_response();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[test]
fn test_bad_request_returns_400() {
    let error = AppError::BadRequest("Invalid input".to_string());
    let response = error.into_response();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[test]
fn test_validation_returns_422() {
    let error = AppError::Validation("Invalid field".to_string());
    let response = error.into_response();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_internal_hides_details() {
    let (status, body) = body_of(AppError::Internal("join error".to_string())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Internal error");
}

#[tokio::test]
async fn test_restore_errors_carry_user_messages() {
    let (status, body) = body_of(AppError::ConfirmationRequired).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Restore cancelled.");

    let (status, body) = body_of(AppError::InvalidBackup("bad file".to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Restore failed: bad file");

    let (status, body) = body_of(AppError::RestoreInterrupted("disk full".to_string())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        "Restore failed: disk full. Data may be in an inconsistent state."
    );
}
