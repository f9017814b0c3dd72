//! Column encodings shared by the storage queries.
//!
//! Enums are stored as their lowercase names, timestamps as RFC 3339 UTC
//! strings with microsecond precision and dates as `YYYY-MM-DD`.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Type, ValueRef};
use rusqlite::Row;

use crate::model::{FacilityType, FontSize, LiftStatus, NoteCondition, Role};

/// Format a timestamp for storage.
pub(crate) fn timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// The current time formatted for storage.
pub(crate) fn now() -> String {
    timestamp(Utc::now())
}

fn conversion_error(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

/// Read a required timestamp column.
pub(crate) fn get_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

/// Read a nullable timestamp column.
pub(crate) fn get_optional_timestamp(
    row: &Row<'_>,
    idx: usize,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|raw| {
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| conversion_error(idx, e))
    })
    .transpose()
}

/// Read a nullable calendar date column.
pub(crate) fn get_optional_date(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|raw| NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|e| conversion_error(idx, e)))
        .transpose()
}

/// Format a calendar date for storage.
pub(crate) fn date(value: NaiveDate) -> String {
    value.format("%Y-%m-%d").to_string()
}

macro_rules! text_enum {
    ($ty:ty) => {
        impl ToSql for $ty {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $ty {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                let raw = value.as_str()?;
                raw.parse()
                    .map_err(|e: crate::error::Error| FromSqlError::Other(e.to_string().into()))
            }
        }
    };
}

text_enum!(Role);
text_enum!(FontSize);
text_enum!(FacilityType);
text_enum!(NoteCondition);
text_enum!(LiftStatus);

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_timestamp_is_fixed_width() {
        let a = DateTime::parse_from_rfc3339("2026-01-01T00:00:00.5Z")
            .unwrap()
            .with_timezone(&Utc);
        let b = DateTime::parse_from_rfc3339("2026-01-01T00:00:00.123456Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(timestamp(a), "2026-01-01T00:00:00.500000Z");
        assert!(timestamp(a) > timestamp(b));
        assert_eq!(timestamp(a).len(), timestamp(b).len());
    }

    #[test]
    fn test_enum_round_trip_through_sqlite() {
        let conn = Connection::open_in_memory().unwrap();
        let status: LiftStatus = conn
            .query_row("SELECT ?1", [LiftStatus::UnderMaintenance], |row| row.get(0))
            .unwrap();
        assert_eq!(status, LiftStatus::UnderMaintenance);

        let raw: String = conn
            .query_row("SELECT ?1", [FontSize::ExtraLarge], |row| row.get(0))
            .unwrap();
        assert_eq!(raw, "extra-large");
    }

    #[test]
    fn test_unknown_enum_value_is_an_error() {
        let conn = Connection::open_in_memory().unwrap();
        let result: rusqlite::Result<Role> =
            conn.query_row("SELECT 'superuser'", [], |row| row.get(0));
        assert!(result.is_err());
    }

    #[test]
    fn test_optional_date() {
        let conn = Connection::open_in_memory().unwrap();
        let parsed = conn
            .query_row("SELECT '2026-03-14'", [], |row| get_optional_date(row, 0))
            .unwrap();
        assert_eq!(parsed, NaiveDate::from_ymd_opt(2026, 3, 14));

        let missing = conn
            .query_row("SELECT NULL", [], |row| get_optional_date(row, 0))
            .unwrap();
        assert!(missing.is_none());
    }
}
