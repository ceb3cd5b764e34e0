use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::FromSqliteRow;

pub const DEFAULT_REST_TIMER_SECONDS: i64 = 90;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub id: i64,
    pub rest_timer_duration: i64,
    pub play_sound_on_timer_end: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            id: 1,
            rest_timer_duration: DEFAULT_REST_TIMER_SECONDS,
            play_sound_on_timer_end: true,
        }
    }
}

impl FromSqliteRow for Settings {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            rest_timer_duration: row.get("rest_timer_duration")?,
            play_sound_on_timer_end: row.get("play_sound_on_timer_end")?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateSettings {
    pub rest_timer_duration: i64,
    pub play_sound_on_timer_end: bool,
}
