use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::FromSqliteRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSession {
    pub id: i64,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    /// Elapsed seconds recorded by the session timer.
    pub duration: Option<i64>,
}

impl FromSqliteRow for WorkoutSession {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            date: row.get("date")?,
            created_at: row.get("created_at")?,
            duration: row.get("duration")?,
        })
    }
}
