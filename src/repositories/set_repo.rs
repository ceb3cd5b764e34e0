use rusqlite::OptionalExtension;

use crate::db::{interact, DbPool};
use crate::error::Result;
use crate::models::{FromSqliteRow, NewWorkoutSet, PersonalBest, WorkoutSession, WorkoutSet};

#[derive(Clone)]
pub struct SetRepository {
    pool: DbPool,
}

impl SetRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn find_all(&self) -> Result<Vec<WorkoutSet>> {
        interact(&self.pool, |conn| {
            let mut stmt = conn.prepare("SELECT * FROM sets ORDER BY id")?;
            let sets = stmt
                .query_map([], WorkoutSet::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(sets)
        })
        .await
    }

    pub async fn find_by_session(&self, session_id: i64) -> Result<Vec<WorkoutSet>> {
        interact(&self.pool, move |conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM sets WHERE workout_session_id = ? ORDER BY exercise_id, set_number, id",
            )?;
            let sets = stmt
                .query_map([session_id], WorkoutSet::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(sets)
        })
        .await
    }

    /// Inserts the sets one statement at a time and returns how many were
    /// written.
    pub async fn insert_many(&self, sets: Vec<NewWorkoutSet>) -> Result<usize> {
        if sets.is_empty() {
            return Ok(0);
        }
        interact(&self.pool, move |conn| {
            let mut stmt = conn.prepare(
                "INSERT INTO sets (workout_session_id, exercise_id, set_number, weight, reps)
                 VALUES (?, ?, ?, ?, ?)",
            )?;
            let mut inserted = 0;
            for set in &sets {
                inserted += stmt.execute(rusqlite::params![
                    set.workout_session_id,
                    set.exercise_id,
                    set.set_number,
                    set.weight,
                    set.reps
                ])?;
            }
            Ok(inserted)
        })
        .await
    }

    pub async fn delete_by_session(&self, session_id: i64) -> Result<usize> {
        interact(&self.pool, move |conn| {
            Ok(conn.execute("DELETE FROM sets WHERE workout_session_id = ?", [session_id])?)
        })
        .await
    }

    pub async fn delete_all(&self) -> Result<usize> {
        interact(&self.pool, |conn| Ok(conn.execute("DELETE FROM sets", [])?)).await
    }

    /// The best set ever logged for the exercise: heaviest weight, then most
    /// reps.
    pub async fn find_personal_best(&self, exercise_id: i64) -> Result<Option<PersonalBest>> {
        interact(&self.pool, move |conn| {
            let mut stmt = conn.prepare(
                "SELECT weight, reps FROM sets WHERE exercise_id = ?
                 ORDER BY weight DESC, reps DESC
                 LIMIT 1",
            )?;
            let best = stmt
                .query_row([exercise_id], PersonalBest::from_row)
                .optional()?;
            Ok(best)
        })
        .await
    }

    /// Most recent session holding at least one set of the exercise. When a
    /// session is being edited, only sessions before it count.
    pub async fn find_latest_session_with_exercise(
        &self,
        exercise_id: i64,
        exclude_session: Option<i64>,
    ) -> Result<Option<WorkoutSession>> {
        interact(&self.pool, move |conn| {
            let mut stmt = conn.prepare(
                "SELECT ws.* FROM workout_sessions ws
                 WHERE EXISTS (
                     SELECT 1 FROM sets s
                     WHERE s.workout_session_id = ws.id AND s.exercise_id = ?1
                 )
                 AND (?2 IS NULL OR EXISTS (
                     SELECT 1 FROM workout_sessions edited
                     WHERE edited.id = ?2 AND ws.id != edited.id
                       AND (ws.date < edited.date
                            OR (ws.date = edited.date AND ws.created_at < edited.created_at))
                 ))
                 ORDER BY ws.date DESC, ws.created_at DESC
                 LIMIT 1",
            )?;
            let session = stmt
                .query_row(
                    rusqlite::params![exercise_id, exclude_session],
                    WorkoutSession::from_row,
                )
                .optional()?;
            Ok(session)
        })
        .await
    }

    pub async fn find_for_session_exercise(
        &self,
        session_id: i64,
        exercise_id: i64,
    ) -> Result<Vec<WorkoutSet>> {
        interact(&self.pool, move |conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM sets WHERE workout_session_id = ? AND exercise_id = ?
                 ORDER BY set_number, id",
            )?;
            let sets = stmt
                .query_map([session_id, exercise_id], WorkoutSet::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(sets)
        })
        .await
    }
}
