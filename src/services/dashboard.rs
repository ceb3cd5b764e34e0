//! Chart series, activity badges and calendar events for the dashboard.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::exercise::OTHER_GROUP;
use crate::models::{Exercise, SessionWithSets, WorkoutSession};
use crate::repositories::Repositories;
use crate::services::dates::{calendar_title, format_date, today, ActivitySummary};

/// Labels plus values, as handed to the chart widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub label: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl ChartSeries {
    fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            labels: Vec::new(),
            values: Vec::new(),
        }
    }

    fn push(&mut self, label: String, value: f64) {
        self.labels.push(label);
        self.values.push(value);
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Label and value pairs, for rendering the series as a table.
    pub fn points(&self) -> Vec<(&str, f64)> {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
            .collect()
    }
}

/// Volume per muscle group in first-seen order.
pub fn muscle_group_distribution(sessions: &[SessionWithSets]) -> ChartSeries {
    let mut series = ChartSeries::new("Volume by Muscle Group");
    let mut index: HashMap<String, usize> = HashMap::new();

    for set in sessions.iter().flat_map(|session| &session.sets) {
        let group = set
            .muscle_group
            .clone()
            .unwrap_or_else(|| OTHER_GROUP.to_string());
        match index.get(&group) {
            Some(&i) => series.values[i] += set.set.volume,
            None => {
                index.insert(group.clone(), series.values.len());
                series.push(group, set.set.volume);
            }
        }
    }
    series
}

pub fn session_volume_series(sessions: &[SessionWithSets]) -> ChartSeries {
    let mut series = ChartSeries::new("Total Volume (kg)");
    for session in sessions {
        let volume = session.sets.iter().map(|set| set.set.volume).sum();
        series.push(format_date(session.session.date), volume);
    }
    series
}

/// Per-session volume for one exercise. Sessions without volume for it are
/// left out.
pub fn exercise_volume_series(sessions: &[SessionWithSets], exercise: &Exercise) -> ChartSeries {
    let mut series = ChartSeries::new(format!("Volume for {} (kg)", exercise.name));
    for session in sessions {
        let volume: f64 = session
            .sets
            .iter()
            .filter(|set| set.set.exercise_id == exercise.id)
            .map(|set| set.set.volume)
            .sum();
        if volume > 0.0 {
            series.push(format_date(session.session.date), volume);
        }
    }
    series
}

/// Minutes, one decimal. Sessions with no recorded duration are skipped.
pub fn duration_series(sessions: &[SessionWithSets]) -> ChartSeries {
    let mut series = ChartSeries::new("Duration (minutes)");
    for session in sessions {
        if let Some(seconds) = session.session.duration {
            let minutes = (seconds as f64 / 60.0 * 10.0).round() / 10.0;
            series.push(format_date(session.session.date), minutes);
        }
    }
    series
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseOption {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardCharts {
    pub exercises: Vec<ExerciseOption>,
    pub selected_exercise_id: Option<i64>,
    pub muscle_groups: ChartSeries,
    pub session_volume: ChartSeries,
    pub exercise_volume: Option<ChartSeries>,
    pub duration: ChartSeries,
}

/// Loaded history plus the computed series. Changing the selected exercise
/// recomputes only the per-exercise series.
#[derive(Debug)]
pub struct Dashboard {
    sessions: Vec<SessionWithSets>,
    exercises: Vec<Exercise>,
    charts: DashboardCharts,
}

impl Dashboard {
    pub fn new(sessions: Vec<SessionWithSets>, exercises: Vec<Exercise>) -> Self {
        let charts = DashboardCharts {
            exercises: exercises
                .iter()
                .map(|e| ExerciseOption {
                    id: e.id,
                    name: e.name.clone(),
                })
                .collect(),
            selected_exercise_id: None,
            muscle_groups: muscle_group_distribution(&sessions),
            session_volume: session_volume_series(&sessions),
            exercise_volume: None,
            duration: duration_series(&sessions),
        };
        let mut dashboard = Self {
            sessions,
            exercises,
            charts,
        };
        if let Some(first) = dashboard.exercises.first().map(|e| e.id) {
            dashboard.recompute_exercise(first);
        }
        dashboard
    }

    pub async fn load(repos: &Repositories) -> Result<Self> {
        let sessions = repos.sessions.find_sessions_with_sets().await?;
        let exercises = repos.exercises.find_all().await?;
        Ok(Self::new(sessions, exercises))
    }

    pub fn charts(&self) -> &DashboardCharts {
        &self.charts
    }

    pub fn into_charts(self) -> DashboardCharts {
        self.charts
    }

    pub fn select_exercise(&mut self, exercise_id: i64) -> Result<&ChartSeries> {
        if !self.recompute_exercise(exercise_id) {
            return Err(AppError::NotFound("Exercise not found".to_string()));
        }
        self.charts
            .exercise_volume
            .as_ref()
            .ok_or_else(|| AppError::Internal("exercise series missing".to_string()))
    }

    fn recompute_exercise(&mut self, exercise_id: i64) -> bool {
        match self.exercises.iter().find(|e| e.id == exercise_id) {
            Some(exercise) => {
                self.charts.exercise_volume =
                    Some(exercise_volume_series(&self.sessions, exercise));
                self.charts.selected_exercise_id = Some(exercise_id);
                true
            }
            None => false,
        }
    }
}

pub async fn activity_summary(repos: &Repositories) -> Result<ActivitySummary> {
    let dates = repos.sessions.find_session_dates().await?;
    Ok(ActivitySummary::from_dates(dates, today()))
}

/// One all-day event per session; clicking it opens the session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEvent {
    pub title: String,
    pub start: NaiveDate,
    pub all_day: bool,
    pub session_id: i64,
}

pub fn calendar_events(sessions: &[WorkoutSession]) -> Vec<CalendarEvent> {
    sessions
        .iter()
        .map(|session| CalendarEvent {
            title: calendar_title(session.created_at),
            start: session.date,
            all_day: true,
            session_id: session.id,
        })
        .collect()
}
