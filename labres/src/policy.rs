//! Booking policy: configurable rules applied to new and extended bookings.
//!
//! Each rule is a [`PolicyRule`] trait object. [`BookingPolicy::from_config`]
//! assembles the rule set from the `policy` configuration section; the
//! defaults only forbid starting in the past.

use std::fmt;

use chrono::{Datelike, NaiveDateTime, Weekday};

use crate::config::{ClosedDayScope, PolicyConfig};
use crate::error::{Error, Result};
use crate::schedule::{DateRange, TimeWindow};

/// Which operation is being checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyContext {
    /// A new reservation request.
    Create,
    /// An extension of an approved reservation.
    Extend,
}

/// A single booking rule.
pub trait PolicyRule: Send + Sync + fmt::Debug {
    /// Short rule name, used as the error field (`policy.<name>`).
    fn name(&self) -> &'static str;

    /// Returns `true` if the rule runs for `context`.
    fn applies_to(&self, _context: PolicyContext) -> bool {
        true
    }

    /// Checks a booking, returning a human-readable violation message.
    ///
    /// # Errors
    ///
    /// Returns the violation message if the booking breaks the rule.
    fn check(
        &self,
        dates: &DateRange,
        window: &TimeWindow,
        now: NaiveDateTime,
    ) -> std::result::Result<(), String>;
}

/// Refuses bookings on closed weekdays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedWeekdays {
    /// Closed days.
    pub days: Vec<Weekday>,
    /// Which dates are inspected.
    pub scope: ClosedDayScope,
}

impl PolicyRule for ClosedWeekdays {
    fn name(&self) -> &'static str {
        "closed_weekdays"
    }

    fn check(
        &self,
        dates: &DateRange,
        _window: &TimeWindow,
        _now: NaiveDateTime,
    ) -> std::result::Result<(), String> {
        let hit = match self.scope {
            ClosedDayScope::EveryDate => self
                .days
                .iter()
                .copied()
                .find(|day| dates.touches_weekday(*day)),
            ClosedDayScope::Endpoints => [dates.start(), dates.end()]
                .into_iter()
                .map(|d| d.weekday())
                .find(|day| self.days.contains(day)),
        };
        match hit {
            Some(day) => Err(format!("the lab is closed on {day}; {dates} includes one")),
            None => Ok(()),
        }
    }
}

/// Bounds the length of the daily window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyDuration {
    /// Shortest allowed window in minutes.
    pub min_minutes: Option<u32>,
    /// Longest allowed window in minutes.
    pub max_minutes: Option<u32>,
}

impl PolicyRule for DailyDuration {
    fn name(&self) -> &'static str {
        "daily_duration"
    }

    fn check(
        &self,
        _dates: &DateRange,
        window: &TimeWindow,
        _now: NaiveDateTime,
    ) -> std::result::Result<(), String> {
        let minutes = window.minutes();
        if let Some(min) = self.min_minutes {
            if minutes < i64::from(min) {
                return Err(format!(
                    "daily window {window} is {minutes} minutes; at least {min} required"
                ));
            }
        }
        if let Some(max) = self.max_minutes {
            if minutes > i64::from(max) {
                return Err(format!(
                    "daily window {window} is {minutes} minutes; at most {max} allowed"
                ));
            }
        }
        Ok(())
    }
}

/// Bounds how many calendar days one reservation may cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxSpanDays {
    /// Longest allowed range in days.
    pub days: u32,
}

impl PolicyRule for MaxSpanDays {
    fn name(&self) -> &'static str {
        "max_span_days"
    }

    fn check(
        &self,
        dates: &DateRange,
        _window: &TimeWindow,
        _now: NaiveDateTime,
    ) -> std::result::Result<(), String> {
        if dates.len_days() > i64::from(self.days) {
            Err(format!(
                "{dates} spans {} days; at most {} allowed",
                dates.len_days(),
                self.days
            ))
        } else {
            Ok(())
        }
    }
}

/// Refuses new reservations whose first window has already started.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoPastStart;

impl PolicyRule for NoPastStart {
    fn name(&self) -> &'static str {
        "no_past_start"
    }

    fn applies_to(&self, context: PolicyContext) -> bool {
        context == PolicyContext::Create
    }

    fn check(
        &self,
        dates: &DateRange,
        window: &TimeWindow,
        now: NaiveDateTime,
    ) -> std::result::Result<(), String> {
        let start = dates.start().and_time(window.start());
        if start < now {
            Err(format!("start {start} is in the past"))
        } else {
            Ok(())
        }
    }
}

/// An ordered set of booking rules.
///
/// # Examples
///
/// ```
/// use chrono::{NaiveDate, NaiveTime};
/// use labres::policy::{BookingPolicy, MaxSpanDays, PolicyContext};
/// use labres::{DateRange, TimeWindow};
///
/// let policy = BookingPolicy::permissive().with_rule(MaxSpanDays { days: 2 });
/// let june = |d| NaiveDate::from_ymd_opt(2024, 6, d).unwrap();
/// let window = TimeWindow::new(
///     NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
///     NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
/// )
/// .unwrap();
/// let now = june(1).and_hms_opt(0, 0, 0).unwrap();
///
/// let long = DateRange::new(june(1), june(5)).unwrap();
/// assert!(policy.evaluate(PolicyContext::Create, &long, &window, now).is_err());
/// ```
#[derive(Debug, Default)]
pub struct BookingPolicy {
    rules: Vec<Box<dyn PolicyRule>>,
}

impl BookingPolicy {
    /// Creates a policy with no rules.
    #[must_use]
    pub fn permissive() -> Self {
        Self::default()
    }

    /// Builds the rule set described by the configuration.
    #[must_use]
    pub fn from_config(config: &PolicyConfig) -> Self {
        let mut policy = Self::permissive();

        if let Some(days) = config.closed_weekdays.as_ref().filter(|d| !d.is_empty()) {
            policy = policy.with_rule(ClosedWeekdays {
                days: days.clone(),
                scope: config.closed_day_scope.unwrap_or_default(),
            });
        }

        if config.min_daily_minutes.is_some() || config.max_daily_minutes.is_some() {
            policy = policy.with_rule(DailyDuration {
                min_minutes: config.min_daily_minutes,
                max_minutes: config.max_daily_minutes,
            });
        }

        if let Some(days) = config.max_span_days {
            policy = policy.with_rule(MaxSpanDays { days });
        }

        if !config.allow_past_start.unwrap_or(false) {
            policy = policy.with_rule(NoPastStart);
        }

        policy
    }

    /// Appends a rule.
    #[must_use]
    pub fn with_rule(mut self, rule: impl PolicyRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Returns the names of the active rules, in evaluation order.
    #[must_use]
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Checks a booking against every rule that applies to `context`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for the first violated rule, with the field
    /// set to `policy.<rule name>`.
    pub fn evaluate(
        &self,
        context: PolicyContext,
        dates: &DateRange,
        window: &TimeWindow,
        now: NaiveDateTime,
    ) -> Result<()> {
        for rule in self.rules.iter().filter(|r| r.applies_to(context)) {
            if let Err(message) = rule.check(dates, window, now) {
                log::debug!("policy rule {} rejected {dates} {window}", rule.name());
                return Err(Error::validation(format!("policy.{}", rule.name()), message));
            }
        }
        Ok(())
    }
}
