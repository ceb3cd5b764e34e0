use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use std::path::Path;

use crate::error::AppError;

pub type DbPool = Pool<SqliteConnectionManager>;

// Set deletion cascades from sessions and exercises rely on this.
fn enable_foreign_keys(conn: &mut rusqlite::Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")
}

pub fn create_pool(database_url: &str) -> Result<DbPool, r2d2::Error> {
    let path = database_url.strip_prefix("sqlite:").unwrap_or(database_url);
    // Remove query parameters (e.g., ?mode=rwc)
    let path = path.split('?').next().unwrap_or(path);

    let manager = if path == ":memory:" {
        SqliteConnectionManager::memory()
    } else {
        SqliteConnectionManager::file(Path::new(path))
    };

    Pool::builder()
        .max_size(5)
        .build(manager.with_init(enable_foreign_keys))
}

pub fn create_memory_pool() -> Result<DbPool, r2d2::Error> {
    let manager = SqliteConnectionManager::memory().with_init(enable_foreign_keys);
    Pool::builder().max_size(1).build(manager)
}

/// Run `f` against a pooled connection on the blocking thread pool.
///
/// Every repository call is one such round-trip; callers compose several of
/// them without any enclosing transaction.
pub async fn interact<T, F>(pool: &DbPool, f: F) -> crate::error::Result<T>
where
    F: FnOnce(&rusqlite::Connection) -> crate::error::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let conn = pool.get()?;
        f(&conn)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))?
}
