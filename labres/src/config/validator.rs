//! Configuration validation.
//!
//! This module checks that configured values are well formed and mutually
//! consistent before the engine uses them.

use crate::config::schema::{AvailabilityConfig, Config, PolicyConfig};
use crate::error::{Error, Result};
use crate::schedule::parse_time;

/// Longest availability search horizon accepted, in days.
pub const MAX_HORIZON_DAYS: u32 = 366;

/// Validates configuration values.
///
/// # Examples
///
/// ```
/// use labres::config::{Config, ConfigValidator};
///
/// ConfigValidator::validate(&Config::default()).unwrap();
/// ConfigValidator::validate(&Config::with_defaults()).unwrap();
/// ```
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a complete configuration.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first offending field.
    pub fn validate(config: &Config) -> Result<()> {
        if let Some(ref policy) = config.policy {
            Self::validate_policy(policy)?;
        }

        if let Some(ref availability) = config.availability {
            Self::validate_availability(availability)?;
        }

        if let Some(timeout) = config.maximum_lock_wait_seconds {
            if timeout == 0 {
                return Err(Error::Validation {
                    field: "maximum_lock_wait_seconds".into(),
                    message: "Timeout must be greater than 0".into(),
                });
            }
        }

        Ok(())
    }

    fn validate_policy(policy: &PolicyConfig) -> Result<()> {
        if policy.max_daily_minutes == Some(0) {
            return Err(Error::Validation {
                field: "policy.max_daily_minutes".into(),
                message: "Must be greater than 0".into(),
            });
        }

        if let (Some(min), Some(max)) = (policy.min_daily_minutes, policy.max_daily_minutes) {
            if min > max {
                return Err(Error::Validation {
                    field: "policy.min_daily_minutes".into(),
                    message: format!("Minimum ({min}) exceeds maximum ({max})"),
                });
            }
        }

        if let Some(max) = policy.max_daily_minutes {
            if max > 24 * 60 {
                return Err(Error::Validation {
                    field: "policy.max_daily_minutes".into(),
                    message: format!("{max} minutes exceeds one day"),
                });
            }
        }

        if policy.max_span_days == Some(0) {
            return Err(Error::Validation {
                field: "policy.max_span_days".into(),
                message: "Must be greater than 0".into(),
            });
        }

        Ok(())
    }

    fn validate_availability(availability: &AvailabilityConfig) -> Result<()> {
        let start = availability
            .day_start
            .as_deref()
            .map(|s| parse_time(s, "availability.day_start"))
            .transpose()?;
        let end = availability
            .day_end
            .as_deref()
            .map(|s| parse_time(s, "availability.day_end"))
            .transpose()?;

        if let (Some(start), Some(end)) = (start, end) {
            if start >= end {
                return Err(Error::Validation {
                    field: "availability.day_end".into(),
                    message: format!(
                        "day_end ({}) must be after day_start ({})",
                        end.format("%H:%M"),
                        start.format("%H:%M")
                    ),
                });
            }
        }

        if let Some(days) = availability.horizon_days {
            if days == 0 || days > MAX_HORIZON_DAYS {
                return Err(Error::Validation {
                    field: "availability.horizon_days".into(),
                    message: format!("Must be between 1 and {MAX_HORIZON_DAYS}"),
                });
            }
        }

        if availability.min_slot_minutes == Some(0) {
            return Err(Error::Validation {
                field: "availability.min_slot_minutes".into(),
                message: "Must be greater than 0".into(),
            });
        }

        Ok(())
    }
}
