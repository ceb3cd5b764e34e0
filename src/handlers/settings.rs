use askama::Template;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::{Settings, UpdateSettings};
use crate::repositories::Repositories;
use crate::services::backup::{self, RestoreReport};
use crate::version::GIT_VERSION;

#[derive(Clone)]
pub struct SettingsState {
    pub repos: Repositories,
}

#[derive(Template)]
#[template(path = "settings/index.html")]
struct SettingsTemplate {
    settings: Settings,
    git_version: &'static str,
    error: Option<String>,
    notice: Option<String>,
}

/// The settings form as the browser posts it: an unchecked checkbox is left
/// out entirely.
#[derive(Debug, Deserialize)]
pub struct SettingsForm {
    pub rest_timer_duration: i64,
    pub play_sound_on_timer_end: Option<String>,
}

async fn render(
    state: &SettingsState,
    error: Option<AppError>,
    notice: Option<String>,
) -> Result<Response> {
    let status = error.as_ref().map_or(StatusCode::OK, AppError::status);
    let template = SettingsTemplate {
        settings: state.repos.settings.get().await?,
        git_version: GIT_VERSION,
        error: error.map(|e| e.user_message()),
        notice,
    };
    Ok((
        status,
        Html(
            template
                .render()
                .map_err(|e| AppError::Internal(e.to_string()))?,
        ),
    )
        .into_response())
}

fn validate(update: &UpdateSettings) -> Result<()> {
    if update.rest_timer_duration <= 0 {
        return Err(AppError::Validation(
            "Rest timer duration must be a positive number of seconds.".to_string(),
        ));
    }
    Ok(())
}

async fn apply(state: &SettingsState, update: UpdateSettings) -> Result<Settings> {
    validate(&update)?;
    let settings = state
        .repos
        .settings
        .update(update.rest_timer_duration, update.play_sound_on_timer_end)
        .await?;

    tracing::info!(
        "Settings updated: rest timer {}s, sound {}",
        settings.rest_timer_duration,
        settings.play_sound_on_timer_end
    );
    Ok(settings)
}

pub async fn index(State(state): State<SettingsState>) -> Result<Response> {
    render(&state, None, None).await
}

pub async fn submit(
    State(state): State<SettingsState>,
    Form(form): Form<SettingsForm>,
) -> Result<Response> {
    let update = UpdateSettings {
        rest_timer_duration: form.rest_timer_duration,
        play_sound_on_timer_end: form.play_sound_on_timer_end.is_some(),
    };
    match apply(&state, update).await {
        Ok(_) => Ok(Redirect::to("/settings").into_response()),
        Err(e @ AppError::Validation(_)) => render(&state, Some(e), None).await,
        Err(e) => Err(e),
    }
}

pub async fn show(State(state): State<SettingsState>) -> Result<Json<Settings>> {
    Ok(Json(state.repos.settings.get().await?))
}

pub async fn update(
    State(state): State<SettingsState>,
    Json(form): Json<UpdateSettings>,
) -> Result<Json<Settings>> {
    Ok(Json(apply(&state, form).await?))
}

struct RestoreUpload {
    confirmation: String,
    backup: Option<Value>,
}

async fn read_upload(mut multipart: Multipart) -> Result<RestoreUpload> {
    let mut upload = RestoreUpload {
        confirmation: String::new(),
        backup: None,
    };
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        match field.name() {
            Some("confirmation") => {
                upload.confirmation = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
            }
            Some("backup") => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                let document = serde_json::from_slice(&bytes).map_err(|e| {
                    AppError::InvalidBackup(format!("the file is not valid JSON ({})", e))
                })?;
                upload.backup = Some(document);
            }
            _ => {}
        }
    }
    Ok(upload)
}

fn restore_notice(report: &RestoreReport) -> String {
    format!(
        "Restore complete: {} exercises, {} sessions and {} sets.",
        report.exercises, report.workout_sessions, report.sets
    )
}

/// Restore from the settings page upload. The outcome is shown on the page.
pub async fn restore_submit(
    State(state): State<SettingsState>,
    multipart: Multipart,
) -> Result<Response> {
    let outcome = match read_upload(multipart).await {
        Ok(RestoreUpload {
            confirmation,
            backup: Some(document),
        }) => backup::restore(&state.repos, &confirmation, document).await,
        Ok(RestoreUpload { backup: None, .. }) => Err(AppError::InvalidBackup(
            "no backup file was uploaded".to_string(),
        )),
        Err(e) => Err(e),
    };

    match outcome {
        Ok(report) => render(&state, None, Some(restore_notice(&report))).await,
        Err(e) => {
            e.log();
            render(&state, Some(e), None).await
        }
    }
}
