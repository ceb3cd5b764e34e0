use rusqlite::Row;

/// Decodes one result row by column name, so `SELECT *` and joins that add
/// extra columns both work.
pub trait FromSqliteRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}
