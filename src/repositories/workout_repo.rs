use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::OptionalExtension;

use crate::db::{interact, DbPool};
use crate::error::Result;
use crate::models::{FromSqliteRow, SessionWithSets, SetWithExercise, WorkoutSession};

#[derive(Clone)]
pub struct WorkoutRepository {
    pool: DbPool,
}

impl WorkoutRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn create_session(
        &self,
        date: NaiveDate,
        duration: Option<i64>,
    ) -> Result<WorkoutSession> {
        self.create_session_at(date, Utc::now(), duration).await
    }

    pub async fn create_session_at(
        &self,
        date: NaiveDate,
        created_at: DateTime<Utc>,
        duration: Option<i64>,
    ) -> Result<WorkoutSession> {
        interact(&self.pool, move |conn| {
            conn.execute(
                "INSERT INTO workout_sessions (date, created_at, duration) VALUES (?, ?, ?)",
                rusqlite::params![date, created_at, duration],
            )?;
            Ok(WorkoutSession {
                id: conn.last_insert_rowid(),
                date,
                created_at,
                duration,
            })
        })
        .await
    }

    pub async fn find_session_by_id(&self, id: i64) -> Result<Option<WorkoutSession>> {
        interact(&self.pool, move |conn| {
            let mut stmt = conn.prepare("SELECT * FROM workout_sessions WHERE id = ?")?;
            let session = stmt.query_row([id], WorkoutSession::from_row).optional()?;
            Ok(session)
        })
        .await
    }

    /// Every session, newest first.
    pub async fn find_all_sessions(&self) -> Result<Vec<WorkoutSession>> {
        interact(&self.pool, |conn| {
            let mut stmt = conn
                .prepare("SELECT * FROM workout_sessions ORDER BY date DESC, created_at DESC")?;
            let sessions = stmt
                .query_map([], WorkoutSession::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(sessions)
        })
        .await
    }

    pub async fn find_session_dates(&self) -> Result<Vec<NaiveDate>> {
        interact(&self.pool, |conn| {
            let mut stmt = conn.prepare("SELECT date FROM workout_sessions ORDER BY date DESC")?;
            let dates = stmt
                .query_map([], |row| row.get(0))?
                .collect::<rusqlite::Result<Vec<NaiveDate>>>()?;
            Ok(dates)
        })
        .await
    }

    pub async fn update_duration(&self, id: i64, duration: i64) -> Result<bool> {
        interact(&self.pool, move |conn| {
            let rows = conn.execute(
                "UPDATE workout_sessions SET duration = ? WHERE id = ?",
                rusqlite::params![duration, id],
            )?;
            Ok(rows > 0)
        })
        .await
    }

    pub async fn delete_session(&self, id: i64) -> Result<bool> {
        interact(&self.pool, move |conn| {
            let rows = conn.execute("DELETE FROM workout_sessions WHERE id = ?", [id])?;
            Ok(rows > 0)
        })
        .await
    }

    pub async fn delete_all_sessions(&self) -> Result<usize> {
        interact(&self.pool, |conn| {
            Ok(conn.execute("DELETE FROM workout_sessions", [])?)
        })
        .await
    }

    /// Every session in ascending date order with its sets and their
    /// exercises, as consumed by the dashboard.
    pub async fn find_sessions_with_sets(&self) -> Result<Vec<SessionWithSets>> {
        interact(&self.pool, |conn| {
            let mut stmt = conn
                .prepare("SELECT * FROM workout_sessions ORDER BY date ASC, created_at ASC")?;
            let sessions = stmt
                .query_map([], WorkoutSession::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            let mut stmt = conn.prepare(
                "SELECT s.*, e.name AS exercise_name, e.muscle_group AS muscle_group
                 FROM sets s
                 JOIN exercises e ON s.exercise_id = e.id
                 ORDER BY s.workout_session_id, s.exercise_id, s.set_number, s.id",
            )?;
            let mut by_session: HashMap<i64, Vec<SetWithExercise>> = HashMap::new();
            for set in stmt.query_map([], SetWithExercise::from_row)? {
                let set = set?;
                by_session
                    .entry(set.set.workout_session_id)
                    .or_default()
                    .push(set);
            }

            Ok(sessions
                .into_iter()
                .map(|session| SessionWithSets {
                    sets: by_session.remove(&session.id).unwrap_or_default(),
                    session,
                })
                .collect())
        })
        .await
    }
}
