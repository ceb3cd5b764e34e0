//! Full-database export and destructive restore.
//!
//! Restore wipes every table and re-inserts the backup. Ids in the file are
//! not reused: exercises are matched back by name and sessions by date, so
//! both must be unique within the file. That is checked before the wipe.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::settings::DEFAULT_REST_TIMER_SECONDS;
use crate::models::{Exercise, NewWorkoutSet, Settings, WorkoutSession, WorkoutSet};
use crate::repositories::{NewExercise, Repositories};
use crate::services::dates::parse_stored_date;

pub const CONFIRMATION_PHRASE: &str = "RESTORE";

const REQUIRED_TABLES: [&str; 3] = ["exercises", "workout_sessions", "sets"];

/// Every row of every table, ids included.
#[derive(Debug, Clone, Serialize)]
pub struct Backup {
    pub exercises: Vec<Exercise>,
    pub workout_sessions: Vec<WorkoutSession>,
    pub sets: Vec<WorkoutSet>,
    pub settings: Vec<Settings>,
}

impl Backup {
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| AppError::Internal(e.to_string()))
    }
}

pub async fn export(repos: &Repositories) -> Result<Backup> {
    let backup = Backup {
        exercises: repos.exercises.find_all().await?,
        workout_sessions: repos.sessions.find_all_sessions().await?,
        sets: repos.sets.find_all().await?,
        settings: repos.settings.find_all().await?,
    };
    tracing::info!(
        "Exported backup: {} exercises, {} sessions, {} sets",
        backup.exercises.len(),
        backup.workout_sessions.len(),
        backup.sets.len()
    );
    Ok(backup)
}

/// `workout-backup-YYYY-MM-DD_HH-MM-SS.json`
pub fn backup_filename(now: DateTime<Local>) -> String {
    format!("workout-backup-{}.json", now.format("%Y-%m-%d_%H-%M-%S"))
}

// Restore-side rows are lenient: older files may lack the routine columns,
// timestamps or settings.

#[derive(Debug, Deserialize)]
struct ExerciseRow {
    id: i64,
    name: String,
    #[serde(default)]
    muscle_group: Option<String>,
    #[serde(default)]
    is_in_routine: Option<bool>,
    #[serde(default)]
    ordering: Option<i64>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct SessionRow {
    id: i64,
    date: String,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    duration: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct SetRow {
    workout_session_id: i64,
    exercise_id: i64,
    #[serde(default)]
    set_number: i64,
    weight: f64,
    reps: i64,
}

#[derive(Debug, Deserialize)]
struct SettingsRow {
    id: i64,
    #[serde(default)]
    rest_timer_duration: Option<i64>,
    #[serde(default)]
    play_sound_on_timer_end: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RestoreDocument {
    exercises: Vec<ExerciseRow>,
    workout_sessions: Vec<SessionRow>,
    sets: Vec<SetRow>,
    #[serde(default)]
    settings: Option<Vec<SettingsRow>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RestoreReport {
    pub settings: usize,
    pub exercises: usize,
    pub workout_sessions: usize,
    pub sets: usize,
    /// Sets whose session or exercise could not be matched.
    pub discarded_sets: usize,
}

fn check_structure(document: &Value) -> Result<()> {
    for table in REQUIRED_TABLES {
        if !document.get(table).is_some_and(Value::is_array) {
            return Err(AppError::InvalidBackup(format!(
                "Invalid backup file structure: '{}' is missing",
                table
            )));
        }
    }
    Ok(())
}

fn check_unique<'a, T, I>(values: I, what: &str) -> Result<()>
where
    T: std::hash::Hash + Eq + std::fmt::Display + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut seen = HashSet::new();
    for value in values {
        if !seen.insert(value) {
            return Err(AppError::InvalidBackup(format!(
                "duplicate {} '{}'",
                what, value
            )));
        }
    }
    Ok(())
}

fn interrupted(error: AppError) -> AppError {
    AppError::RestoreInterrupted(error.to_string())
}

/// Replaces the whole database with the backup. Nothing is deleted until the
/// confirmation, the structure and the natural keys have all been checked.
/// There is no rollback once the wipe has started.
pub async fn restore(
    repos: &Repositories,
    confirmation: &str,
    document: Value,
) -> Result<RestoreReport> {
    if confirmation != CONFIRMATION_PHRASE {
        return Err(AppError::ConfirmationRequired);
    }
    check_structure(&document)?;

    let document: RestoreDocument =
        serde_json::from_value(document).map_err(|e| AppError::InvalidBackup(e.to_string()))?;

    let mut session_dates = Vec::with_capacity(document.workout_sessions.len());
    for session in &document.workout_sessions {
        let date = parse_stored_date(&session.date).map_err(|_| {
            AppError::InvalidBackup(format!("invalid session date '{}'", session.date))
        })?;
        session_dates.push(date);
    }
    check_unique(document.exercises.iter().map(|e| &e.name), "exercise name")?;
    check_unique(session_dates.iter(), "session date")?;

    tracing::info!("Restoring backup, wiping existing data");
    repos.sets.delete_all().await.map_err(interrupted)?;
    repos.sessions.delete_all_sessions().await.map_err(interrupted)?;
    repos.exercises.delete_all().await.map_err(interrupted)?;
    repos.settings.delete_all().await.map_err(interrupted)?;

    let mut report = RestoreReport::default();

    let settings: Vec<Settings> = document
        .settings
        .unwrap_or_default()
        .into_iter()
        .map(|row| Settings {
            id: row.id,
            rest_timer_duration: row.rest_timer_duration.unwrap_or(DEFAULT_REST_TIMER_SECONDS),
            play_sound_on_timer_end: row.play_sound_on_timer_end.unwrap_or(true),
        })
        .collect();
    report.settings = repos
        .settings
        .insert_all(settings)
        .await
        .map_err(interrupted)?;

    let mut exercise_ids: HashMap<i64, i64> = HashMap::new();
    let mut ids_by_name: HashMap<String, i64> = HashMap::new();
    for (index, row) in document.exercises.iter().enumerate() {
        let new = NewExercise {
            name: row.name.clone(),
            muscle_group: row.muscle_group.clone(),
            is_in_routine: row.is_in_routine.unwrap_or(true),
            ordering: row.ordering.unwrap_or(index as i64),
        };
        let created = repos
            .exercises
            .create_at(new, row.created_at.unwrap_or_else(Utc::now))
            .await
            .map_err(interrupted)?;
        ids_by_name.insert(created.name, created.id);
        report.exercises += 1;
    }
    for row in &document.exercises {
        if let Some(&new_id) = ids_by_name.get(&row.name) {
            exercise_ids.insert(row.id, new_id);
        }
    }

    let mut session_ids: HashMap<i64, i64> = HashMap::new();
    let mut ids_by_date: HashMap<NaiveDate, i64> = HashMap::new();
    for (row, date) in document.workout_sessions.iter().zip(&session_dates) {
        let created = repos
            .sessions
            .create_session_at(*date, row.created_at.unwrap_or_else(Utc::now), row.duration)
            .await
            .map_err(interrupted)?;
        ids_by_date.insert(created.date, created.id);
        report.workout_sessions += 1;
    }
    for (row, date) in document.workout_sessions.iter().zip(&session_dates) {
        if let Some(&new_id) = ids_by_date.get(date) {
            session_ids.insert(row.id, new_id);
        }
    }

    let mut sets = Vec::with_capacity(document.sets.len());
    for row in &document.sets {
        match (
            session_ids.get(&row.workout_session_id),
            exercise_ids.get(&row.exercise_id),
        ) {
            (Some(&workout_session_id), Some(&exercise_id)) => sets.push(NewWorkoutSet {
                workout_session_id,
                exercise_id,
                set_number: row.set_number,
                weight: row.weight,
                reps: row.reps,
            }),
            _ => {
                tracing::debug!(
                    "Discarding set for session {} / exercise {}",
                    row.workout_session_id,
                    row.exercise_id
                );
                report.discarded_sets += 1;
            }
        }
    }
    report.sets = repos.sets.insert_many(sets).await.map_err(interrupted)?;

    tracing::info!(
        "Restore complete: {} exercises, {} sessions, {} sets ({} discarded)",
        report.exercises,
        report.workout_sessions,
        report.sets,
        report.discarded_sets
    );
    Ok(report)
}
