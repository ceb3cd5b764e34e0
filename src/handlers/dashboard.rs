use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::repositories::Repositories;
use crate::services::dashboard::{
    activity_summary, calendar_events, CalendarEvent, ChartSeries, Dashboard, DashboardCharts,
};
use crate::services::dates::ActivitySummary;
use crate::services::records::{personal_records, PersonalRecordEntry};

#[derive(Clone)]
pub struct DashboardState {
    pub repos: Repositories,
}

#[derive(Template)]
#[template(path = "dashboard/index.html")]
struct DashboardTemplate {
    summary: ActivitySummary,
    records: Vec<PersonalRecordEntry>,
    charts: DashboardCharts,
    series: Vec<ChartSeries>,
    events: Vec<CalendarEvent>,
}

#[derive(Debug, Deserialize)]
pub struct ChartsQuery {
    pub exercise_id: Option<i64>,
}

pub async fn index(
    State(state): State<DashboardState>,
    Query(query): Query<ChartsQuery>,
) -> Result<Response> {
    let summary = activity_summary(&state.repos).await?;
    let records = personal_records(&state.repos).await?;
    let mut dashboard = Dashboard::load(&state.repos).await?;
    if let Some(exercise_id) = query.exercise_id {
        dashboard.select_exercise(exercise_id)?;
    }
    let charts = dashboard.into_charts();
    let series = [
        Some(charts.muscle_groups.clone()),
        Some(charts.session_volume.clone()),
        charts.exercise_volume.clone(),
        Some(charts.duration.clone()),
    ]
    .into_iter()
    .flatten()
    .collect();
    let sessions = state.repos.sessions.find_all_sessions().await?;

    let template = DashboardTemplate {
        summary,
        records,
        charts,
        series,
        events: calendar_events(&sessions),
    };

    Ok(Html(
        template
            .render()
            .map_err(|e| AppError::Internal(e.to_string()))?,
    )
    .into_response())
}

pub async fn charts(
    State(state): State<DashboardState>,
    Query(query): Query<ChartsQuery>,
) -> Result<Json<DashboardCharts>> {
    let mut dashboard = Dashboard::load(&state.repos).await?;
    if let Some(exercise_id) = query.exercise_id {
        dashboard.select_exercise(exercise_id)?;
    }
    Ok(Json(dashboard.into_charts()))
}

pub async fn exercise_series(
    State(state): State<DashboardState>,
    Path(exercise_id): Path<i64>,
) -> Result<Json<ChartSeries>> {
    let mut dashboard = Dashboard::load(&state.repos).await?;
    let series = dashboard.select_exercise(exercise_id)?.clone();
    Ok(Json(series))
}

pub async fn summary(State(state): State<DashboardState>) -> Result<Json<ActivitySummary>> {
    Ok(Json(activity_summary(&state.repos).await?))
}

pub async fn records(
    State(state): State<DashboardState>,
) -> Result<Json<Vec<PersonalRecordEntry>>> {
    Ok(Json(personal_records(&state.repos).await?))
}

pub async fn calendar(State(state): State<DashboardState>) -> Result<Json<Vec<CalendarEvent>>> {
    let sessions = state.repos.sessions.find_all_sessions().await?;
    Ok(Json(calendar_events(&sessions)))
}
