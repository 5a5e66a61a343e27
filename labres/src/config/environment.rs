//! Environment variable handling for configuration overrides.
//!
//! This module provides support for `LABRES_*` environment variables that
//! override configuration file values.

use std::env;
use std::str::FromStr;

use chrono::Weekday;

use crate::config::schema::{ClosedDayScope, Config, OutputFormat};
use crate::error::{Error, Result};

/// Handles environment variable overrides for configuration.
///
/// # Examples
///
/// ```no_run
/// use labres::config::{Config, EnvironmentConfig};
///
/// let mut config = Config::default();
/// EnvironmentConfig::apply_overrides(&mut config).unwrap();
/// ```
pub struct EnvironmentConfig;

impl EnvironmentConfig {
    /// Apply environment variable overrides to config.
    ///
    /// Reads the `LABRES_*` variables below and applies them with higher
    /// precedence than file-based configs:
    ///
    /// - `LABRES_MAXIMUM_LOCK_WAIT_SECONDS`, `LABRES_OUTPUT_FORMAT`
    /// - `LABRES_CLOSED_WEEKDAYS` (comma-separated, e.g. `sat,sun`),
    ///   `LABRES_CLOSED_DAY_SCOPE`, `LABRES_MIN_DAILY_MINUTES`,
    ///   `LABRES_MAX_DAILY_MINUTES`, `LABRES_MAX_SPAN_DAYS`,
    ///   `LABRES_ALLOW_PAST_START`
    /// - `LABRES_DAY_START`, `LABRES_DAY_END`, `LABRES_HORIZON_DAYS`,
    ///   `LABRES_MIN_SLOT_MINUTES`
    ///
    /// # Errors
    ///
    /// Returns an error if any environment variable value is invalid
    /// (e.g., non-numeric day count, invalid boolean).
    pub fn apply_overrides(config: &mut Config) -> Result<()> {
        if let Ok(seconds) = env::var("LABRES_MAXIMUM_LOCK_WAIT_SECONDS") {
            config.maximum_lock_wait_seconds =
                Some(Self::parse_number("LABRES_MAXIMUM_LOCK_WAIT_SECONDS", &seconds)?);
        }

        if let Ok(format) = env::var("LABRES_OUTPUT_FORMAT") {
            config.output_format = Some(Self::parse_output_format(&format)?);
        }

        Self::apply_policy_overrides(config)?;
        Self::apply_availability_overrides(config)?;

        Ok(())
    }

    /// Apply booking policy environment variable overrides.
    fn apply_policy_overrides(config: &mut Config) -> Result<()> {
        let mut policy = config.policy.clone().unwrap_or_default();
        let mut modified = false;

        if let Ok(days) = env::var("LABRES_CLOSED_WEEKDAYS") {
            policy.closed_weekdays = Some(Self::parse_weekdays(&days)?);
            modified = true;
        }

        if let Ok(scope) = env::var("LABRES_CLOSED_DAY_SCOPE") {
            policy.closed_day_scope = Some(Self::parse_scope(&scope)?);
            modified = true;
        }

        if let Ok(val) = env::var("LABRES_MIN_DAILY_MINUTES") {
            policy.min_daily_minutes = Some(Self::parse_number("LABRES_MIN_DAILY_MINUTES", &val)?);
            modified = true;
        }

        if let Ok(val) = env::var("LABRES_MAX_DAILY_MINUTES") {
            policy.max_daily_minutes = Some(Self::parse_number("LABRES_MAX_DAILY_MINUTES", &val)?);
            modified = true;
        }

        if let Ok(val) = env::var("LABRES_MAX_SPAN_DAYS") {
            policy.max_span_days = Some(Self::parse_number("LABRES_MAX_SPAN_DAYS", &val)?);
            modified = true;
        }

        if let Ok(val) = env::var("LABRES_ALLOW_PAST_START") {
            policy.allow_past_start = Some(Self::parse_bool("LABRES_ALLOW_PAST_START", &val)?);
            modified = true;
        }

        if modified {
            config.policy = Some(policy);
        }

        Ok(())
    }

    /// Apply availability-hours environment variable overrides.
    fn apply_availability_overrides(config: &mut Config) -> Result<()> {
        let mut availability = config.availability.clone().unwrap_or_default();
        let mut modified = false;

        if let Ok(val) = env::var("LABRES_DAY_START") {
            availability.day_start = Some(val);
            modified = true;
        }

        if let Ok(val) = env::var("LABRES_DAY_END") {
            availability.day_end = Some(val);
            modified = true;
        }

        if let Ok(val) = env::var("LABRES_HORIZON_DAYS") {
            availability.horizon_days = Some(Self::parse_number("LABRES_HORIZON_DAYS", &val)?);
            modified = true;
        }

        if let Ok(val) = env::var("LABRES_MIN_SLOT_MINUTES") {
            availability.min_slot_minutes =
                Some(Self::parse_number("LABRES_MIN_SLOT_MINUTES", &val)?);
            modified = true;
        }

        if modified {
            config.availability = Some(availability);
        }

        Ok(())
    }

    /// Parse a boolean value from a string.
    ///
    /// Accepts: true/1/yes/on for true, false/0/no/off for false (case-insensitive).
    fn parse_bool(field: &str, s: &str) -> Result<bool> {
        match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(Error::Validation {
                field: field.into(),
                message: format!(
                    "Invalid boolean value: '{s}' (expected true/false/1/0/yes/no/on/off)"
                ),
            }),
        }
    }

    fn parse_number<T: FromStr>(field: &str, s: &str) -> Result<T> {
        s.trim().parse().map_err(|_| Error::Validation {
            field: field.into(),
            message: format!("Must be a non-negative integer, got '{s}'"),
        })
    }

    /// Parse a comma-separated weekday list. An empty string clears the list.
    fn parse_weekdays(s: &str) -> Result<Vec<Weekday>> {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<Weekday>().map_err(|_| Error::Validation {
                    field: "LABRES_CLOSED_WEEKDAYS".into(),
                    message: format!("Invalid weekday: {part}"),
                })
            })
            .collect()
    }

    fn parse_scope(s: &str) -> Result<ClosedDayScope> {
        match s.trim().to_lowercase().as_str() {
            "every_date" => Ok(ClosedDayScope::EveryDate),
            "endpoints" => Ok(ClosedDayScope::Endpoints),
            _ => Err(Error::Validation {
                field: "LABRES_CLOSED_DAY_SCOPE".into(),
                message: format!("Invalid scope '{s}' (expected every_date or endpoints)"),
            }),
        }
    }

    fn parse_output_format(s: &str) -> Result<OutputFormat> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            "tsv" => Ok(OutputFormat::Tsv),
            "table" => Ok(OutputFormat::Table),
            _ => Err(Error::Validation {
                field: "LABRES_OUTPUT_FORMAT".into(),
                message: format!("Invalid format '{s}' (expected json, csv, tsv or table)"),
            }),
        }
    }
}
