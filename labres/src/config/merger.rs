//! Configuration merging and precedence handling.
//!
//! This module implements hierarchical merging of configuration sources.
//! Nested sections merge field by field; a closed-weekday list replaces the
//! lower-precedence list wholesale.

use crate::config::loader::ConfigSource;
use crate::config::schema::{AvailabilityConfig, Config, PolicyConfig};

/// Merges configuration sources according to precedence rules.
///
/// # Examples
///
/// ```
/// use labres::config::{Config, ConfigMerger};
///
/// let low = Config { maximum_lock_wait_seconds: Some(5), ..Default::default() };
/// let high = Config { maximum_lock_wait_seconds: Some(10), ..Default::default() };
///
/// let mut result = low;
/// ConfigMerger::merge_into(&mut result, &high);
/// assert_eq!(result.maximum_lock_wait_seconds, Some(10));
/// ```
pub struct ConfigMerger;

impl ConfigMerger {
    /// Merge multiple configuration sources into final config.
    ///
    /// Sources should be provided in order from lowest to highest precedence.
    #[must_use]
    pub fn merge(sources: Vec<ConfigSource>) -> Config {
        let mut result = Config::default();

        for source in sources {
            Self::merge_into(&mut result, &source.config);
        }

        result
    }

    /// Merge source config into target (source overwrites target).
    ///
    /// # Merging Rules
    ///
    /// - Simple fields: source overwrites if Some
    /// - Nested configs: field-by-field merge
    /// - Closed weekdays: complete replacement
    pub fn merge_into(target: &mut Config, source: &Config) {
        if source.maximum_lock_wait_seconds.is_some() {
            target.maximum_lock_wait_seconds = source.maximum_lock_wait_seconds;
        }

        if source.output_format.is_some() {
            target.output_format = source.output_format;
        }

        if let Some(ref source_policy) = source.policy {
            target.policy = Some(match &target.policy {
                Some(target_policy) => Self::merge_policy(target_policy, source_policy),
                None => source_policy.clone(),
            });
        }

        if let Some(ref source_availability) = source.availability {
            target.availability = Some(match &target.availability {
                Some(target_availability) => {
                    Self::merge_availability(target_availability, source_availability)
                }
                None => source_availability.clone(),
            });
        }
    }

    fn merge_policy(target: &PolicyConfig, source: &PolicyConfig) -> PolicyConfig {
        PolicyConfig {
            closed_weekdays: source
                .closed_weekdays
                .clone()
                .or_else(|| target.closed_weekdays.clone()),
            closed_day_scope: source.closed_day_scope.or(target.closed_day_scope),
            min_daily_minutes: source.min_daily_minutes.or(target.min_daily_minutes),
            max_daily_minutes: source.max_daily_minutes.or(target.max_daily_minutes),
            max_span_days: source.max_span_days.or(target.max_span_days),
            allow_past_start: source.allow_past_start.or(target.allow_past_start),
        }
    }

    fn merge_availability(
        target: &AvailabilityConfig,
        source: &AvailabilityConfig,
    ) -> AvailabilityConfig {
        AvailabilityConfig {
            day_start: source.day_start.clone().or_else(|| target.day_start.clone()),
            day_end: source.day_end.clone().or_else(|| target.day_end.clone()),
            horizon_days: source.horizon_days.or(target.horizon_days),
            min_slot_minutes: source.min_slot_minutes.or(target.min_slot_minutes),
        }
    }
}
