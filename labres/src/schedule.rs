//! Calendar date ranges and daily clock windows.
//!
//! A reservation occupies its [`TimeWindow`] on every date of its
//! [`DateRange`]. Two bookings collide when they share a date and their
//! windows intersect.

use std::fmt;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::reservation::ValidationError;

/// Format used for dates in storage and on the command line.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Format used for clock times in storage and on the command line.
pub const TIME_FORMAT: &str = "%H:%M";

/// Parses a `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns an error naming `field` if the string is not a valid date.
///
/// # Examples
///
/// ```
/// use labres::schedule::parse_date;
///
/// let date = parse_date("2024-06-01", "start_date").unwrap();
/// assert_eq!(date.to_string(), "2024-06-01");
/// assert!(parse_date("2024-13-01", "start_date").is_err());
/// ```
pub fn parse_date(s: &str, field: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).map_err(|e| ValidationError {
        field: field.into(),
        message: format!("invalid date '{s}' (expected YYYY-MM-DD): {e}"),
    })
}

/// Parses an `HH:MM` clock time.
///
/// # Errors
///
/// Returns an error naming `field` if the string is not a valid time.
///
/// # Examples
///
/// ```
/// use labres::schedule::parse_time;
///
/// let time = parse_time("09:30", "start_time").unwrap();
/// assert_eq!(time.to_string(), "09:30:00");
/// assert!(parse_time("25:00", "start_time").is_err());
/// ```
pub fn parse_time(s: &str, field: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(s.trim(), TIME_FORMAT).map_err(|e| ValidationError {
        field: field.into(),
        message: format!("invalid time '{s}' (expected HH:MM): {e}"),
    })
}

/// Formats a date as `YYYY-MM-DD`.
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Formats a time as `HH:MM`.
#[must_use]
pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// An inclusive range of calendar dates.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use labres::DateRange;
///
/// let june = |d| NaiveDate::from_ymd_opt(2024, 6, d).unwrap();
/// let range = DateRange::new(june(1), june(3)).unwrap();
///
/// assert_eq!(range.len_days(), 3);
/// assert!(range.contains(june(2)));
/// assert!(DateRange::new(june(3), june(1)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Creates a date range.
    ///
    /// # Errors
    ///
    /// Returns an error if `end` precedes `start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if end < start {
            return Err(ValidationError {
                field: "end_date".into(),
                message: format!("end date {end} precedes start date {start}"),
            });
        }
        Ok(Self { start, end })
    }

    /// Creates a single-day range.
    #[must_use]
    pub const fn single(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// Returns the first date.
    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Returns the last date (inclusive).
    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Returns the number of calendar days covered.
    #[must_use]
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Returns `true` if `date` lies within the range.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Returns the overlapping sub-range, if any.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start <= end).then_some(Self { start, end })
    }

    /// Returns `true` if the two ranges share at least one date.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.intersection(other).is_some()
    }

    /// Iterates over every date in the range.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    /// Returns `true` if any date in the range falls on `weekday`.
    #[must_use]
    pub fn touches_weekday(&self, weekday: Weekday) -> bool {
        self.len_days() >= 7 || self.days().any(|d| d.weekday() == weekday)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", format_date(self.start))
        } else {
            write!(f, "{}..{}", format_date(self.start), format_date(self.end))
        }
    }
}

/// A half-open daily clock window `[start, end)` with minute precision.
///
/// # Examples
///
/// ```
/// use chrono::NaiveTime;
/// use labres::TimeWindow;
///
/// let at = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap();
/// let morning = TimeWindow::new(at(9), at(12)).unwrap();
/// let noon = TimeWindow::new(at(12), at(14)).unwrap();
///
/// assert!(!morning.overlaps(&noon));
/// assert_eq!(morning.minutes(), 180);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    start: NaiveTime,
    end: NaiveTime,
}

impl TimeWindow {
    /// Creates a window.
    ///
    /// # Errors
    ///
    /// Returns an error if either bound carries seconds, or if `start` is not
    /// strictly before `end`.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, ValidationError> {
        for (field, t) in [("start_time", start), ("end_time", end)] {
            if t.second() != 0 || t.nanosecond() != 0 {
                return Err(ValidationError {
                    field: field.into(),
                    message: format!("time {t} must have minute precision"),
                });
            }
        }
        if start >= end {
            return Err(ValidationError {
                field: "end_time".into(),
                message: format!(
                    "end time {} must be after start time {}",
                    format_time(end),
                    format_time(start)
                ),
            });
        }
        Ok(Self { start, end })
    }

    /// Returns the window start.
    #[must_use]
    pub const fn start(&self) -> NaiveTime {
        self.start
    }

    /// Returns the window end (exclusive).
    #[must_use]
    pub const fn end(&self) -> NaiveTime {
        self.end
    }

    /// Returns the window length in minutes.
    #[must_use]
    pub fn minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Returns `true` if the windows intersect.
    ///
    /// Touching windows (one ends when the other starts) do not intersect.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start.max(other.start) < self.end.min(other.end)
    }

    /// Returns `true` if `time` lies within the window.
    #[must_use]
    pub fn contains(&self, time: NaiveTime) -> bool {
        self.start <= time && time < self.end
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", format_time(self.start), format_time(self.end))
    }
}

/// Returns the moment a booking ending on `date` at `time` is over.
#[must_use]
pub fn end_instant(date: NaiveDate, time: NaiveTime) -> NaiveDateTime {
    date.and_time(time)
}

/// Rounds `time` up to the next whole minute.
#[must_use]
pub fn ceil_minute(time: NaiveTime) -> NaiveTime {
    if time.second() == 0 && time.nanosecond() == 0 {
        return time;
    }
    let floored = time.with_second(0).and_then(|t| t.with_nanosecond(0));
    floored.map_or(time, |t| t + Duration::minutes(1))
}
