use askama::Template;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::Exercise;
use crate::repositories::Repositories;
use crate::services::drafts::{run_command, DraftStore, SharedEditor};
use crate::services::editor::{self, EditorCommand, EditorView, SavedSession, SessionEditor};

#[derive(Clone)]
pub struct SessionsState {
    pub repos: Repositories,
    pub drafts: DraftStore,
}

#[derive(Debug, Default, Deserialize)]
pub struct OpenDraft {
    pub session_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct AddExercise {
    pub name: String,
}

#[derive(Serialize)]
pub struct DraftResponse {
    pub draft_id: Uuid,
    pub view: EditorView,
}

#[derive(Serialize)]
pub struct ExerciseAdded {
    pub exercise: Exercise,
    pub view: EditorView,
}

#[derive(Template)]
#[template(path = "sessions/edit.html")]
struct EditorTemplate {
    draft_id: Uuid,
    view: EditorView,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetForm {
    pub exercise_id: i64,
    pub set_index: usize,
    #[serde(default)]
    pub weight: String,
    #[serde(default)]
    pub reps: String,
}

#[derive(Debug, Deserialize)]
pub struct ExerciseForm {
    pub exercise_id: i64,
}

// JSON API

pub async fn open_draft(
    State(state): State<SessionsState>,
    Json(form): Json<OpenDraft>,
) -> Result<(StatusCode, Json<DraftResponse>)> {
    let editor = SessionEditor::load(&state.repos, form.session_id).await?;
    let (draft_id, editor) = state.drafts.open(editor);
    let view = editor.lock().await.view();

    tracing::debug!("Opened draft {} for {:?}", draft_id, form.session_id);
    Ok((StatusCode::CREATED, Json(DraftResponse { draft_id, view })))
}

pub async fn show_draft(
    State(state): State<SessionsState>,
    Path(draft_id): Path<Uuid>,
) -> Result<Json<EditorView>> {
    let editor = state.drafts.get(&draft_id).await?;
    let view = editor.lock().await.view();
    Ok(Json(view))
}

pub async fn command(
    State(state): State<SessionsState>,
    Path(draft_id): Path<Uuid>,
    Json(command): Json<EditorCommand>,
) -> Result<Json<EditorView>> {
    let editor = state.drafts.get(&draft_id).await?;
    let view = run_command(&state.repos, &editor, command).await?;
    Ok(Json(view))
}

pub async fn add_exercise(
    State(state): State<SessionsState>,
    Path(draft_id): Path<Uuid>,
    Json(form): Json<AddExercise>,
) -> Result<(StatusCode, Json<ExerciseAdded>)> {
    let editor = state.drafts.get(&draft_id).await?;
    let mut editor = editor.lock().await;
    let exercise = editor.add_exercise(&state.repos, &form.name).await?;
    let view = editor.view();
    Ok((StatusCode::CREATED, Json(ExerciseAdded { exercise, view })))
}

/// Saves and closes the draft. A failed save leaves the draft open so it
/// can be retried.
pub async fn save(
    State(state): State<SessionsState>,
    Path(draft_id): Path<Uuid>,
) -> Result<Json<SavedSession>> {
    let saved = save_draft(&state, draft_id).await?;
    Ok(Json(saved))
}

pub async fn discard(
    State(state): State<SessionsState>,
    Path(draft_id): Path<Uuid>,
) -> Result<StatusCode> {
    discard_draft(&state, draft_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_session(
    State(state): State<SessionsState>,
    Path(session_id): Path<i64>,
) -> Result<StatusCode> {
    editor::delete_session(&state.repos, session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn save_draft(state: &SessionsState, draft_id: Uuid) -> Result<SavedSession> {
    let editor = state.drafts.get(&draft_id).await?;
    let saved = editor.lock().await.save(&state.repos).await?;
    state.drafts.remove(&draft_id);
    Ok(saved)
}

async fn discard_draft(state: &SessionsState, draft_id: Uuid) -> Result<()> {
    let editor = state.drafts.get(&draft_id).await?;
    state.drafts.remove(&draft_id);
    editor.lock().await.close();
    tracing::debug!("Discarded draft {}", draft_id);
    Ok(())
}

// Pages

fn draft_url(draft_id: Uuid) -> String {
    format!("/drafts/{}", draft_id)
}

async fn open_page(state: &SessionsState, session_id: Option<i64>) -> Result<Redirect> {
    let editor = SessionEditor::load(&state.repos, session_id).await?;
    let (draft_id, _) = state.drafts.open(editor);
    tracing::debug!("Opened draft {} for {:?}", draft_id, session_id);
    Ok(Redirect::to(&draft_url(draft_id)))
}

fn render_editor(draft_id: Uuid, view: EditorView, error: Option<AppError>) -> Result<Response> {
    let status = error.as_ref().map_or(StatusCode::OK, AppError::status);
    let template = EditorTemplate {
        draft_id,
        view,
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

/// Runs a page action and redirects back to the editor. Validation
/// failures re-render the editor with the message instead.
async fn after_action(
    draft_id: Uuid,
    editor: &SharedEditor,
    outcome: Result<()>,
) -> Result<Response> {
    match outcome {
        Ok(()) => Ok(Redirect::to(&draft_url(draft_id)).into_response()),
        Err(e @ AppError::Validation(_)) => {
            let view = editor.lock().await.view();
            render_editor(draft_id, view, Some(e))
        }
        Err(e) => Err(e),
    }
}

pub async fn new_page(State(state): State<SessionsState>) -> Result<Redirect> {
    open_page(&state, None).await
}

pub async fn edit_page(
    State(state): State<SessionsState>,
    Path(session_id): Path<i64>,
) -> Result<Redirect> {
    open_page(&state, Some(session_id)).await
}

pub async fn editor_page(
    State(state): State<SessionsState>,
    Path(draft_id): Path<Uuid>,
) -> Result<Response> {
    let editor = state.drafts.get(&draft_id).await?;
    let view = editor.lock().await.view();
    render_editor(draft_id, view, None)
}

async fn page_command(
    state: &SessionsState,
    draft_id: Uuid,
    command: EditorCommand,
) -> Result<Response> {
    let editor = state.drafts.get(&draft_id).await?;
    let outcome = run_command(&state.repos, &editor, command).await.map(|_| ());
    after_action(draft_id, &editor, outcome).await
}

pub async fn update_set_submit(
    State(state): State<SessionsState>,
    Path(draft_id): Path<Uuid>,
    Form(form): Form<SetForm>,
) -> Result<Response> {
    let command = EditorCommand::UpdateSet {
        exercise_id: form.exercise_id,
        set_index: form.set_index,
        weight: form.weight,
        reps: form.reps,
    };
    page_command(&state, draft_id, command).await
}

pub async fn add_set_submit(
    State(state): State<SessionsState>,
    Path(draft_id): Path<Uuid>,
    Form(form): Form<ExerciseForm>,
) -> Result<Response> {
    let command = EditorCommand::AddSet {
        exercise_id: form.exercise_id,
    };
    page_command(&state, draft_id, command).await
}

pub async fn delete_set_submit(
    State(state): State<SessionsState>,
    Path(draft_id): Path<Uuid>,
    Form(form): Form<ExerciseForm>,
) -> Result<Response> {
    let command = EditorCommand::DeleteSet {
        exercise_id: form.exercise_id,
    };
    page_command(&state, draft_id, command).await
}

pub async fn remove_exercise_submit(
    State(state): State<SessionsState>,
    Path(draft_id): Path<Uuid>,
    Form(form): Form<ExerciseForm>,
) -> Result<Response> {
    let command = EditorCommand::RemoveExercise {
        exercise_id: form.exercise_id,
    };
    page_command(&state, draft_id, command).await
}

pub async fn pause_submit(
    State(state): State<SessionsState>,
    Path(draft_id): Path<Uuid>,
) -> Result<Response> {
    page_command(&state, draft_id, EditorCommand::TogglePause).await
}

pub async fn add_exercise_submit(
    State(state): State<SessionsState>,
    Path(draft_id): Path<Uuid>,
    Form(form): Form<AddExercise>,
) -> Result<Response> {
    let editor = state.drafts.get(&draft_id).await?;
    let outcome = editor
        .lock()
        .await
        .add_exercise(&state.repos, &form.name)
        .await
        .map(|_| ());
    after_action(draft_id, &editor, outcome).await
}

pub async fn finish_submit(
    State(state): State<SessionsState>,
    Path(draft_id): Path<Uuid>,
) -> Result<Redirect> {
    save_draft(&state, draft_id).await?;
    Ok(Redirect::to("/"))
}

pub async fn discard_submit(
    State(state): State<SessionsState>,
    Path(draft_id): Path<Uuid>,
) -> Result<Redirect> {
    discard_draft(&state, draft_id).await?;
    Ok(Redirect::to("/"))
}

pub async fn delete_session_submit(
    State(state): State<SessionsState>,
    Path(session_id): Path<i64>,
) -> Result<Redirect> {
    editor::delete_session(&state.repos, session_id).await?;
    Ok(Redirect::to("/"))
}
