use chrono::{DateTime, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::FromSqliteRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: i64,
    pub name: String,
    pub muscle_group: Option<String>,
    pub is_in_routine: bool,
    pub ordering: i64,
    pub created_at: DateTime<Utc>,
}

impl Exercise {
    /// Muscle group label used for grouping, with ungrouped exercises
    /// collected under "Other".
    pub fn group_label(&self) -> &str {
        self.muscle_group.as_deref().unwrap_or(OTHER_GROUP)
    }
}

impl FromSqliteRow for Exercise {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            muscle_group: row.get("muscle_group")?,
            is_in_routine: row.get("is_in_routine")?,
            ordering: row.get("ordering")?,
            created_at: row.get("created_at")?,
        })
    }
}

pub const OTHER_GROUP: &str = "Other";

/// Muscle groups offered when creating an exercise.
pub const MUSCLE_GROUPS: &[&str] = &[
    "Chest",
    "Back",
    "Legs",
    "Shoulders",
    "Biceps",
    "Triceps",
    "Core",
];
