use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension;

use crate::db::{interact, DbPool};
use crate::error::Result;
use crate::models::{Exercise, FromSqliteRow};

/// Fields of an exercise row about to be inserted.
#[derive(Debug, Clone)]
pub struct NewExercise {
    pub name: String,
    pub muscle_group: Option<String>,
    pub is_in_routine: bool,
    pub ordering: i64,
}

#[derive(Clone)]
pub struct ExerciseRepository {
    pool: DbPool,
}

impl ExerciseRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Exercise>> {
        interact(&self.pool, move |conn| {
            let mut stmt = conn.prepare("SELECT * FROM exercises WHERE id = ?")?;
            let result = stmt.query_row([id], Exercise::from_row).optional()?;
            Ok(result)
        })
        .await
    }

    /// The whole catalog in display order.
    pub async fn find_all(&self) -> Result<Vec<Exercise>> {
        interact(&self.pool, |conn| {
            let mut stmt = conn.prepare("SELECT * FROM exercises ORDER BY ordering, id")?;
            let exercises = stmt
                .query_map([], Exercise::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(exercises)
        })
        .await
    }

    pub async fn find_routine(&self) -> Result<Vec<Exercise>> {
        interact(&self.pool, |conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM exercises WHERE is_in_routine = 1 ORDER BY ordering, id",
            )?;
            let exercises = stmt
                .query_map([], Exercise::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(exercises)
        })
        .await
    }

    pub async fn create(&self, new: NewExercise) -> Result<Exercise> {
        self.create_at(new, Utc::now()).await
    }

    pub async fn create_at(&self, new: NewExercise, created_at: DateTime<Utc>) -> Result<Exercise> {
        interact(&self.pool, move |conn| {
            conn.execute(
                "INSERT INTO exercises (name, muscle_group, is_in_routine, ordering, created_at)
                 VALUES (?, ?, ?, ?, ?)",
                rusqlite::params![
                    new.name,
                    new.muscle_group,
                    new.is_in_routine,
                    new.ordering,
                    created_at
                ],
            )?;
            Ok(Exercise {
                id: conn.last_insert_rowid(),
                name: new.name,
                muscle_group: new.muscle_group,
                is_in_routine: new.is_in_routine,
                ordering: new.ordering,
                created_at,
            })
        })
        .await
    }

    pub async fn rename(&self, id: i64, name: &str) -> Result<bool> {
        let name = name.to_string();
        interact(&self.pool, move |conn| {
            let rows = conn.execute(
                "UPDATE exercises SET name = ? WHERE id = ?",
                rusqlite::params![name, id],
            )?;
            Ok(rows > 0)
        })
        .await
    }

    pub async fn set_in_routine(&self, id: i64, in_routine: bool) -> Result<bool> {
        interact(&self.pool, move |conn| {
            let rows = conn.execute(
                "UPDATE exercises SET is_in_routine = ? WHERE id = ?",
                rusqlite::params![in_routine, id],
            )?;
            Ok(rows > 0)
        })
        .await
    }

    pub async fn set_ordering(&self, id: i64, ordering: i64) -> Result<bool> {
        interact(&self.pool, move |conn| {
            let rows = conn.execute(
                "UPDATE exercises SET ordering = ? WHERE id = ?",
                rusqlite::params![ordering, id],
            )?;
            Ok(rows > 0)
        })
        .await
    }

    /// Deletes the exercise; its sets go with it through the foreign key.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        interact(&self.pool, move |conn| {
            let rows = conn.execute("DELETE FROM exercises WHERE id = ?", [id])?;
            Ok(rows > 0)
        })
        .await
    }

    pub async fn delete_all(&self) -> Result<usize> {
        interact(&self.pool, |conn| Ok(conn.execute("DELETE FROM exercises", [])?)).await
    }
}
