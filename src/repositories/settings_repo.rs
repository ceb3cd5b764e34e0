use rusqlite::OptionalExtension;

use crate::db::{interact, DbPool};
use crate::error::Result;
use crate::models::{FromSqliteRow, Settings};

#[derive(Clone)]
pub struct SettingsRepository {
    pool: DbPool,
}

impl SettingsRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// The singleton settings row, or the defaults when none exists.
    pub async fn get(&self) -> Result<Settings> {
        interact(&self.pool, |conn| {
            let mut stmt = conn.prepare("SELECT * FROM settings ORDER BY id LIMIT 1")?;
            let settings = stmt.query_row([], Settings::from_row).optional()?;
            Ok(settings.unwrap_or_default())
        })
        .await
    }

    pub async fn find_all(&self) -> Result<Vec<Settings>> {
        interact(&self.pool, |conn| {
            let mut stmt = conn.prepare("SELECT * FROM settings ORDER BY id")?;
            let rows = stmt
                .query_map([], Settings::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
        .await
    }

    /// Writes the timer preferences into the singleton row, creating it if
    /// it was wiped.
    pub async fn update(&self, rest_timer_duration: i64, play_sound: bool) -> Result<Settings> {
        interact(&self.pool, move |conn| {
            let id: Option<i64> = conn
                .query_row("SELECT id FROM settings ORDER BY id LIMIT 1", [], |row| {
                    row.get(0)
                })
                .optional()?;
            let id = match id {
                Some(id) => {
                    conn.execute(
                        "UPDATE settings SET rest_timer_duration = ?, play_sound_on_timer_end = ?
                         WHERE id = ?",
                        rusqlite::params![rest_timer_duration, play_sound, id],
                    )?;
                    id
                }
                None => {
                    conn.execute(
                        "INSERT INTO settings (rest_timer_duration, play_sound_on_timer_end)
                         VALUES (?, ?)",
                        rusqlite::params![rest_timer_duration, play_sound],
                    )?;
                    conn.last_insert_rowid()
                }
            };
            Ok(Settings {
                id,
                rest_timer_duration,
                play_sound_on_timer_end: play_sound,
            })
        })
        .await
    }

    /// Inserts rows verbatim, ids included.
    pub async fn insert_all(&self, rows: Vec<Settings>) -> Result<usize> {
        interact(&self.pool, move |conn| {
            let mut stmt = conn.prepare(
                "INSERT INTO settings (id, rest_timer_duration, play_sound_on_timer_end)
                 VALUES (?, ?, ?)",
            )?;
            let mut inserted = 0;
            for row in &rows {
                inserted += stmt.execute(rusqlite::params![
                    row.id,
                    row.rest_timer_duration,
                    row.play_sound_on_timer_end
                ])?;
            }
            Ok(inserted)
        })
        .await
    }

    pub async fn delete_all(&self) -> Result<usize> {
        interact(&self.pool, |conn| Ok(conn.execute("DELETE FROM settings", [])?)).await
    }
}
