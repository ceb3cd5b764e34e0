//! Embedded database migrations
//!
//! The SQL files under `migrations/` are compiled into the binary, so the
//! server never needs them on disk at runtime.

use crate::db::DbPool;

/// All migrations in order, each as (filename, sql_content)
pub const MIGRATIONS: &[(&str, &str)] = &[
    (
        "001_create_exercises.sql",
        include_str!("../migrations/001_create_exercises.sql"),
    ),
    (
        "002_create_workout_sessions.sql",
        include_str!("../migrations/002_create_workout_sessions.sql"),
    ),
    (
        "003_create_sets.sql",
        include_str!("../migrations/003_create_sets.sql"),
    ),
    (
        "004_create_settings.sql",
        include_str!("../migrations/004_create_settings.sql"),
    ),
];

/// Run all pending migrations on the database pool.
///
/// Applied migrations are tracked in a `_migrations` table and skipped on
/// the next start.
pub fn run_migrations(pool: &DbPool) -> anyhow::Result<()> {
    tracing::info!("Running migrations...");

    let conn = pool.get()?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS _migrations (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    for (filename, sql) in MIGRATIONS {
        let already_applied: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM _migrations WHERE name = ?",
                [filename],
                |row| row.get(0),
            )
            .unwrap_or(false);

        if already_applied {
            tracing::debug!("Skipping already applied migration: {}", filename);
            continue;
        }

        tracing::info!("Running migration: {}", filename);

        conn.execute_batch(sql)?;
        conn.execute("INSERT INTO _migrations (name) VALUES (?)", [filename])?;
    }

    tracing::info!("Migrations completed");
    Ok(())
}

/// Run all migrations without tracking, for fresh in-memory test databases.
#[allow(dead_code)] // Used by integration tests
pub fn run_migrations_for_tests(pool: &DbPool) -> Result<(), Box<dyn std::error::Error>> {
    let conn = pool.get()?;

    for (_filename, sql) in MIGRATIONS {
        conn.execute_batch(sql)?;
    }

    Ok(())
}
