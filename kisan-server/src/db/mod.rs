pub mod connection;
pub mod repositories;
pub mod schema;

pub use connection::{Database, DbConnection, DbPool};

/// True when the error wraps a UNIQUE / PRIMARY KEY constraint violation
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<rusqlite::Error>(),
        Some(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation
                && (e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
    )
}

/// Column helpers shared by the repositories
pub(crate) mod columns {
    use chrono::{DateTime, SecondsFormat, Utc};
    use rusqlite::types::Type;
    use rusqlite::Row;
    use uuid::Uuid;

    pub fn uuid(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
        let raw: String = row.get(idx)?;
        Uuid::parse_str(&raw)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    }

    pub fn timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
        let raw: String = row.get(idx)?;
        raw.parse::<DateTime<Utc>>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    }

    /// Fixed-width RFC3339 so stored timestamps sort lexicographically
    pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Micros, true)
    }
}
