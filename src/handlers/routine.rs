use askama::Template;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::Exercise;
use crate::repositories::Repositories;
use crate::services::routine::{RoutineCommand, RoutineManager, RoutineView};

#[derive(Clone)]
pub struct RoutineState {
    pub repos: Repositories,
}

#[derive(Template)]
#[template(path = "routine/index.html")]
struct RoutineTemplate {
    routine: Vec<Exercise>,
    available: Vec<Exercise>,
    all: Vec<Exercise>,
    muscle_groups: Vec<&'static str>,
    error: Option<String>,
}

/// One form per button on the routine page; `action` names the command.
#[derive(Debug, Deserialize)]
pub struct RoutineForm {
    pub action: String,
    pub id: Option<i64>,
    pub name: Option<String>,
    pub muscle_group: Option<String>,
}

impl TryFrom<RoutineForm> for RoutineCommand {
    type Error = AppError;

    fn try_from(form: RoutineForm) -> Result<Self> {
        let id = || {
            form.id
                .ok_or_else(|| AppError::BadRequest("Missing exercise id".to_string()))
        };
        let command = match form.action.as_str() {
            "add_to_routine" => RoutineCommand::AddToRoutine { id: id()? },
            "remove_from_routine" => RoutineCommand::RemoveFromRoutine { id: id()? },
            "move_up" => RoutineCommand::MoveUp { id: id()? },
            "move_down" => RoutineCommand::MoveDown { id: id()? },
            "rename" => RoutineCommand::Rename {
                id: id()?,
                name: form.name.clone().unwrap_or_default(),
            },
            "delete" => RoutineCommand::Delete { id: id()? },
            "create" => RoutineCommand::Create {
                name: form.name.clone().unwrap_or_default(),
                muscle_group: form.muscle_group.clone().unwrap_or_default(),
            },
            other => return Err(AppError::BadRequest(format!("Unknown action '{}'", other))),
        };
        Ok(command)
    }
}

fn render(view: RoutineView, error: Option<AppError>) -> Result<Response> {
    let status = error
        .as_ref()
        .map_or(axum::http::StatusCode::OK, AppError::status);
    let template = RoutineTemplate {
        routine: view.routine,
        available: view.available,
        all: view.all,
        muscle_groups: view.muscle_groups,
        error: error.map(|e| e.user_message()),
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

pub async fn index(State(state): State<RoutineState>) -> Result<Response> {
    let view = RoutineManager::load(&state.repos).await?.view();
    render(view, None)
}

pub async fn submit(
    State(state): State<RoutineState>,
    Form(form): Form<RoutineForm>,
) -> Result<Response> {
    let command = RoutineCommand::try_from(form)?;
    let mut manager = RoutineManager::load(&state.repos).await?;
    match manager.dispatch(&state.repos, command).await {
        Ok(()) => Ok(Redirect::to("/routine").into_response()),
        Err(e @ AppError::Validation(_)) => render(manager.view(), Some(e)),
        Err(e) => Err(e),
    }
}

pub async fn list(State(state): State<RoutineState>) -> Result<Json<RoutineView>> {
    let manager = RoutineManager::load(&state.repos).await?;
    Ok(Json(manager.view()))
}

pub async fn command(
    State(state): State<RoutineState>,
    Json(command): Json<RoutineCommand>,
) -> Result<Json<RoutineView>> {
    let mut manager = RoutineManager::load(&state.repos).await?;
    manager.dispatch(&state.repos, command).await?;
    Ok(Json(manager.view()))
}
