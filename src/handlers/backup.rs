use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Local;
use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;
use crate::repositories::Repositories;
use crate::services::backup::{self, RestoreReport};

#[derive(Clone)]
pub struct BackupState {
    pub repos: Repositories,
}

#[derive(Debug, Deserialize)]
pub struct RestoreRequest {
    #[serde(default)]
    pub confirmation: String,
    pub backup: Value,
}

pub async fn download(State(state): State<BackupState>) -> Result<Response> {
    let body = backup::export(&state.repos).await?.to_json_pretty()?;
    let filename = backup::backup_filename(Local::now());

    tracing::info!("Backup exported as {}", filename);
    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response())
}

pub async fn restore(
    State(state): State<BackupState>,
    Json(request): Json<RestoreRequest>,
) -> Result<Json<RestoreReport>> {
    let report = backup::restore(&state.repos, &request.confirmation, request.backup).await?;
    Ok(Json(report))
}
