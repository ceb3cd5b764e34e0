use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid backup file: {0}")]
    InvalidBackup(String),

    #[error("Restore cancelled: type RESTORE to confirm")]
    ConfirmationRequired,

    #[error("Restore failed after wiping data: {0}")]
    RestoreInterrupted(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether the backend rejected a write because of a UNIQUE constraint.
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            AppError::Database(rusqlite::Error::SqliteFailure(err, _))
                if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        )
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Database(_)
            | AppError::Pool(_)
            | AppError::RestoreInterrupted(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_)
            | AppError::InvalidBackup(_)
            | AppError::ConfirmationRequired => StatusCode::BAD_REQUEST,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    /// Text shown to the user. Server faults stay generic.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Database(_) | AppError::Pool(_) => "Database error".to_string(),
            AppError::NotFound(msg) | AppError::BadRequest(msg) | AppError::Validation(msg) => {
                msg.clone()
            }
            AppError::InvalidBackup(msg) => format!("Restore failed: {}", msg),
            AppError::ConfirmationRequired => "Restore cancelled.".to_string(),
            AppError::RestoreInterrupted(msg) => format!(
                "Restore failed: {}. Data may be in an inconsistent state.",
                msg
            ),
            AppError::Internal(_) => "Internal error".to_string(),
        }
    }

    /// Logs failures the user cannot fix themselves.
    pub fn log(&self) {
        match self {
            AppError::Database(e) => tracing::error!("Database error: {:?}", e),
            AppError::Pool(e) => tracing::error!("Pool error: {:?}", e),
            AppError::InvalidBackup(msg) => tracing::error!("Restore rejected: {}", msg),
            AppError::RestoreInterrupted(msg) => tracing::error!("Restore interrupted: {}", msg),
            AppError::Internal(msg) => tracing::error!("Internal error: {}", msg),
            _ => {}
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        (self.status(), self.user_message()).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
