use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::handlers::{backup, dashboard, health, routine, sessions, settings};

pub fn create_router(
    health_state: health::HealthState,
    dashboard_state: dashboard::DashboardState,
    sessions_state: sessions::SessionsState,
    routine_state: routine::RoutineState,
    settings_state: settings::SettingsState,
    backup_state: backup::BackupState,
) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .with_state(health_state)
        // Dashboard
        .route("/", get(dashboard::index))
        .route("/api/dashboard", get(dashboard::charts))
        .route(
            "/api/dashboard/exercises/{id}",
            get(dashboard::exercise_series),
        )
        .route("/api/summary", get(dashboard::summary))
        .route("/api/records", get(dashboard::records))
        .route("/api/calendar", get(dashboard::calendar))
        .with_state(dashboard_state)
        // Session editor drafts
        .route("/api/drafts", post(sessions::open_draft))
        .route(
            "/api/drafts/{id}",
            get(sessions::show_draft).delete(sessions::discard),
        )
        .route("/api/drafts/{id}/commands", post(sessions::command))
        .route("/api/drafts/{id}/exercises", post(sessions::add_exercise))
        .route("/api/drafts/{id}/save", post(sessions::save))
        .route("/api/sessions/{id}", delete(sessions::delete_session))
        // Session editor pages
        .route("/sessions/new", get(sessions::new_page))
        .route("/sessions/{id}/edit", get(sessions::edit_page))
        .route("/sessions/{id}/delete", post(sessions::delete_session_submit))
        .route("/drafts/{id}", get(sessions::editor_page))
        .route("/drafts/{id}/sets", post(sessions::update_set_submit))
        .route("/drafts/{id}/sets/add", post(sessions::add_set_submit))
        .route("/drafts/{id}/sets/delete", post(sessions::delete_set_submit))
        .route(
            "/drafts/{id}/exercises/new",
            post(sessions::add_exercise_submit),
        )
        .route(
            "/drafts/{id}/exercises/remove",
            post(sessions::remove_exercise_submit),
        )
        .route("/drafts/{id}/pause", post(sessions::pause_submit))
        .route("/drafts/{id}/finish", post(sessions::finish_submit))
        .route("/drafts/{id}/discard", post(sessions::discard_submit))
        .with_state(sessions_state)
        // Routine
        .route("/routine", get(routine::index).post(routine::submit))
        .route("/api/exercises", get(routine::list))
        .route("/api/routine", post(routine::command))
        .with_state(routine_state)
        // Settings
        .route("/settings", get(settings::index).post(settings::submit))
        .route("/settings/restore", post(settings::restore_submit))
        .route(
            "/api/settings",
            get(settings::show).put(settings::update),
        )
        .with_state(settings_state)
        // Backup
        .route("/api/backup", get(backup::download))
        .route("/api/restore", post(backup::restore))
        .with_state(backup_state)
}
