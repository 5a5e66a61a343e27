//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for labres:
//! booking policy, availability hours, locking and output settings.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// Complete configuration structure.
///
/// This represents the full configuration schema for labres, supporting
/// hierarchical configuration from multiple sources. Every field is optional
/// so partial files can be layered.
///
/// # Examples
///
/// ```
/// use labres::config::{Config, PolicyConfig};
///
/// let config = Config {
///     policy: Some(PolicyConfig {
///         max_span_days: Some(14),
///         ..Default::default()
///     }),
///     ..Default::default()
/// };
/// assert_eq!(config.policy.unwrap().max_span_days, Some(14));
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Booking policy rules applied on create and extend.
    pub policy: Option<PolicyConfig>,

    /// Daily hours used to compute next available windows.
    pub availability: Option<AvailabilityConfig>,

    /// Maximum time to wait for database lock acquisition (seconds).
    pub maximum_lock_wait_seconds: Option<u64>,

    /// Output format for list commands.
    pub output_format: Option<OutputFormat>,
}

/// Booking policy configuration.
///
/// # Examples
///
/// ```
/// use chrono::Weekday;
/// use labres::config::{ClosedDayScope, PolicyConfig};
///
/// let yaml = "closed_weekdays: [sun]\nclosed_day_scope: endpoints\nmax_daily_minutes: 480\n";
/// let policy: PolicyConfig = serde_yaml::from_str(yaml).unwrap();
/// assert_eq!(policy.closed_weekdays, Some(vec![Weekday::Sun]));
/// assert_eq!(policy.closed_day_scope, Some(ClosedDayScope::Endpoints));
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PolicyConfig {
    /// Weekdays on which the lab is closed.
    pub closed_weekdays: Option<Vec<Weekday>>,

    /// Which dates of a range are checked against closed weekdays.
    pub closed_day_scope: Option<ClosedDayScope>,

    /// Minimum length of the daily window in minutes.
    pub min_daily_minutes: Option<u32>,

    /// Maximum length of the daily window in minutes.
    pub max_daily_minutes: Option<u32>,

    /// Maximum number of calendar days one reservation may span.
    pub max_span_days: Option<u32>,

    /// Allow reservations whose first window starts in the past.
    pub allow_past_start: Option<bool>,
}

/// Which dates of a range the closed-weekday rule inspects.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClosedDayScope {
    /// Every date the range touches.
    #[default]
    EveryDate,
    /// Only the first and last date.
    Endpoints,
}

impl std::fmt::Display for ClosedDayScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EveryDate => write!(f, "every_date"),
            Self::Endpoints => write!(f, "endpoints"),
        }
    }
}

/// Availability hours used by the resource overview.
///
/// Times are `HH:MM` strings.
///
/// # Examples
///
/// ```
/// use labres::config::AvailabilityConfig;
///
/// let config = AvailabilityConfig {
///     day_start: Some("08:00".to_string()),
///     day_end: Some("20:00".to_string()),
///     horizon_days: Some(7),
///     min_slot_minutes: Some(60),
/// };
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AvailabilityConfig {
    /// Start of bookable hours.
    pub day_start: Option<String>,

    /// End of bookable hours.
    pub day_end: Option<String>,

    /// How many days ahead to search for a free window.
    pub horizon_days: Option<u32>,

    /// Shortest gap reported as a free window, in minutes.
    pub min_slot_minutes: Option<u32>,
}

/// Default start of bookable hours.
pub const DEFAULT_DAY_START: &str = "08:00";

/// Default end of bookable hours.
pub const DEFAULT_DAY_END: &str = "22:00";

/// Default availability search horizon in days.
pub const DEFAULT_HORIZON_DAYS: u32 = 14;

/// Default shortest reported free window in minutes.
pub const DEFAULT_MIN_SLOT_MINUTES: u32 = 30;

/// Default lock wait in seconds.
pub const DEFAULT_LOCK_WAIT_SECONDS: u64 = 5;

impl Config {
    /// Returns the built-in defaults as a fully populated configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            policy: Some(PolicyConfig {
                closed_weekdays: Some(Vec::new()),
                closed_day_scope: Some(ClosedDayScope::EveryDate),
                min_daily_minutes: None,
                max_daily_minutes: None,
                max_span_days: None,
                allow_past_start: Some(false),
            }),
            availability: Some(AvailabilityConfig {
                day_start: Some(DEFAULT_DAY_START.to_string()),
                day_end: Some(DEFAULT_DAY_END.to_string()),
                horizon_days: Some(DEFAULT_HORIZON_DAYS),
                min_slot_minutes: Some(DEFAULT_MIN_SLOT_MINUTES),
            }),
            maximum_lock_wait_seconds: Some(DEFAULT_LOCK_WAIT_SECONDS),
            output_format: Some(OutputFormat::Table),
        }
    }
}

/// Output format for list commands.
///
/// # Examples
///
/// ```
/// use labres::config::OutputFormat;
///
/// let format = OutputFormat::Json;
/// assert_eq!(format.to_string(), "json");
/// ```
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON output format.
    Json,
    /// CSV output format.
    Csv,
    /// TSV output format.
    Tsv,
    /// Human-readable table format.
    Table,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
            Self::Tsv => write!(f, "tsv"),
            Self::Table => write!(f, "table"),
        }
    }
}
