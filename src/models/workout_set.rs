use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::FromSqliteRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSet {
    pub id: i64,
    pub workout_session_id: i64,
    pub exercise_id: i64,
    pub set_number: i64,
    pub weight: f64,
    pub reps: i64,
    /// Computed by the database as weight * reps.
    pub volume: f64,
}

impl FromSqliteRow for WorkoutSet {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            workout_session_id: row.get("workout_session_id")?,
            exercise_id: row.get("exercise_id")?,
            set_number: row.get("set_number")?,
            weight: row.get("weight")?,
            reps: row.get("reps")?,
            volume: row.get::<_, Option<f64>>("volume")?.unwrap_or(0.0),
        })
    }
}

/// A set about to be written. Volume is left to the database.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWorkoutSet {
    pub workout_session_id: i64,
    pub exercise_id: i64,
    pub set_number: i64,
    pub weight: f64,
    pub reps: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SetWithExercise {
    pub set: WorkoutSet,
    pub exercise_name: String,
    pub muscle_group: Option<String>,
}

impl FromSqliteRow for SetWithExercise {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            set: WorkoutSet::from_row(row)?,
            exercise_name: row.get("exercise_name")?,
            muscle_group: row.get("muscle_group")?,
        })
    }
}

/// A session together with every set logged in it.
#[derive(Debug, Clone, Serialize)]
pub struct SessionWithSets {
    pub session: crate::models::WorkoutSession,
    pub sets: Vec<SetWithExercise>,
}

/// Heaviest set ever logged for an exercise, ties broken by reps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PersonalBest {
    pub weight: f64,
    pub reps: i64,
}

impl FromSqliteRow for PersonalBest {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            weight: row.get("weight")?,
            reps: row.get("reps")?,
        })
    }
}
