//! Conversions between domain values and their column representations.

use std::time::{Duration, SystemTime};

use chrono::{NaiveDate, NaiveTime};
use rusqlite::Connection;

use crate::error::{Error, Result};
use crate::schedule::{DATE_FORMAT, TIME_FORMAT};

/// Converts a `SystemTime` to Unix epoch seconds for database storage.
///
/// # Errors
///
/// Returns an error if the time is before the Unix epoch.
#[allow(clippy::cast_possible_wrap)]
pub(super) fn systemtime_to_unix_secs(time: SystemTime) -> Result<i64> {
    time.duration_since(SystemTime::UNIX_EPOCH)
        .map_err(|e| Error::Validation {
            field: "timestamp".into(),
            message: format!("Invalid timestamp: {e}"),
        })
        .map(|d| d.as_secs() as i64)
}

/// Converts Unix epoch seconds from the database to a `SystemTime`.
#[allow(clippy::cast_sign_loss)]
pub(super) fn unix_secs_to_systemtime(secs: i64) -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(secs.max(0) as u64)
}

pub(super) fn date_to_sql(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub(super) fn time_to_sql(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// Wraps any displayable failure into a row conversion error.
pub(super) fn conversion_error<E>(err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(err))
}

pub(super) fn date_from_sql(value: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(conversion_error)
}

pub(super) fn time_from_sql(value: &str) -> rusqlite::Result<NaiveTime> {
    NaiveTime::parse_from_str(value, TIME_FORMAT).map_err(conversion_error)
}

/// Tables whose ids are allocated before insert.
#[derive(Debug, Clone, Copy)]
pub(crate) enum IdTable {
    Resources,
    Reservations,
    Releases,
}

impl IdTable {
    const fn next_id_sql(self) -> &'static str {
        match self {
            Self::Resources => {
                "SELECT MAX(COALESCE((SELECT seq FROM sqlite_sequence WHERE name = 'resources'), 0),
                            COALESCE((SELECT MAX(id) FROM resources), 0)) + 1"
            }
            Self::Reservations => {
                "SELECT MAX(COALESCE((SELECT seq FROM sqlite_sequence WHERE name = 'reservations'), 0),
                            COALESCE((SELECT MAX(id) FROM reservations), 0)) + 1"
            }
            Self::Releases => {
                "SELECT MAX(COALESCE((SELECT seq FROM sqlite_sequence WHERE name = 'releases'), 0),
                            COALESCE((SELECT MAX(id) FROM releases), 0)) + 1"
            }
        }
    }
}

/// Returns the id the next insert into `table` will use.
///
/// Ids are never reused, even after deletes. Only meaningful inside a write
/// transaction, which keeps the value stable until commit.
pub(crate) fn next_id(conn: &Connection, table: IdTable) -> Result<i64> {
    Ok(conn.query_row(table.next_id_sql(), [], |row| row.get(0))?)
}
