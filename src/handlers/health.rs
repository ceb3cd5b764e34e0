use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::db::{self, DbPool};
use crate::version::GIT_VERSION;

#[derive(Clone)]
pub struct HealthState {
    pub pool: DbPool,
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    git_version: &'static str,
}

/// Reports "ok" only when the database answers a trivial query.
pub async fn health_check(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let ping = db::interact(&state.pool, |conn| {
        Ok(conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?)
    })
    .await;

    let (code, status) = match ping {
        Ok(_) => (StatusCode::OK, "ok"),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    };

    (
        code,
        Json(HealthResponse {
            status,
            git_version: GIT_VERSION,
        }),
    )
}
