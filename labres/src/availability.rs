//! Read-time availability view of resources.
//!
//! Nothing here is stored. Each query derives a resource's current state and
//! its next free window from the approved reservations and their releases.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::config::schema::{
    Config, DEFAULT_DAY_END, DEFAULT_DAY_START, DEFAULT_HORIZON_DAYS, DEFAULT_MIN_SLOT_MINUTES,
};
use crate::conflict::Occupant;
use crate::error::{Error, Result};
use crate::reservation::ReservationId;
use crate::resource::Resource;
use crate::schedule::{ceil_minute, parse_time};

/// Current state of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityStatus {
    /// Free right now.
    Available,
    /// An approved reservation holds the resource right now.
    Booked,
    /// Out of service.
    Maintenance,
}

impl AvailabilityStatus {
    /// Returns the display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Booked => "booked",
            Self::Maintenance => "maintenance",
        }
    }
}

impl std::fmt::Display for AvailabilityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A free stretch of time on one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    /// The date.
    pub date: NaiveDate,
    /// First free minute.
    pub start: NaiveTime,
    /// End of the free stretch (exclusive).
    pub end: NaiveTime,
}

/// A resource annotated with its availability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceAvailability {
    /// The resource.
    pub resource: Resource,
    /// State at the time of the query.
    pub status: AvailabilityStatus,
    /// The reservation holding the resource, when booked.
    pub current: Option<ReservationId>,
    /// First free window within the search horizon.
    pub next_window: Option<AvailabilityWindow>,
}

/// Daily hours and search limits for free-window lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilitySettings {
    /// Start of bookable hours.
    pub day_start: NaiveTime,
    /// End of bookable hours.
    pub day_end: NaiveTime,
    /// Number of days scanned, today included.
    pub horizon_days: u32,
    /// Shortest gap worth reporting, in minutes.
    pub min_slot_minutes: u32,
}

impl AvailabilitySettings {
    /// Resolves the settings from configuration, filling in defaults.
    ///
    /// # Errors
    ///
    /// Returns a validation error if a configured time does not parse or
    /// the hours are empty.
    pub fn from_config(config: &Config) -> Result<Self> {
        let availability = config.availability.clone().unwrap_or_default();
        let day_start = parse_time(
            availability.day_start.as_deref().unwrap_or(DEFAULT_DAY_START),
            "availability.day_start",
        )?;
        let day_end = parse_time(
            availability.day_end.as_deref().unwrap_or(DEFAULT_DAY_END),
            "availability.day_end",
        )?;
        if day_start >= day_end {
            return Err(Error::validation(
                "availability.day_end",
                "day_end must be after day_start",
            ));
        }
        Ok(Self {
            day_start,
            day_end,
            horizon_days: availability.horizon_days.unwrap_or(DEFAULT_HORIZON_DAYS),
            min_slot_minutes: availability
                .min_slot_minutes
                .unwrap_or(DEFAULT_MIN_SLOT_MINUTES),
        })
    }
}

impl Default for AvailabilitySettings {
    fn default() -> Self {
        let at = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap_or(NaiveTime::MIN);
        Self {
            day_start: at(8),
            day_end: at(22),
            horizon_days: DEFAULT_HORIZON_DAYS,
            min_slot_minutes: DEFAULT_MIN_SLOT_MINUTES,
        }
    }
}

/// Derives the availability of `resource` at `now`.
///
/// `occupants` should hold the approved reservations on the resource with
/// their releases; others are ignored.
#[must_use]
pub fn resource_availability(
    resource: Resource,
    occupants: &[Occupant],
    settings: &AvailabilitySettings,
    now: NaiveDateTime,
) -> ResourceAvailability {
    let occupants: Vec<&Occupant> = occupants
        .iter()
        .filter(|o| o.reservation.resource() == resource.id())
        .collect();

    if resource.in_maintenance() {
        return ResourceAvailability {
            resource,
            status: AvailabilityStatus::Maintenance,
            current: None,
            next_window: None,
        };
    }

    let current = occupants
        .iter()
        .filter(|o| o.reservation.window().contains(now.time()))
        .find(|o| o.occupied_dates(None).contains(&now.date()))
        .map(|o| o.reservation.id());

    ResourceAvailability {
        resource,
        status: if current.is_some() {
            AvailabilityStatus::Booked
        } else {
            AvailabilityStatus::Available
        },
        current,
        next_window: next_free_window(&occupants, settings, now),
    }
}

/// Finds the first free gap of at least the minimum slot length inside the
/// daily hours, starting at `now`.
fn next_free_window(
    occupants: &[&Occupant],
    settings: &AvailabilitySettings,
    now: NaiveDateTime,
) -> Option<AvailabilityWindow> {
    let min_slot = Duration::minutes(i64::from(settings.min_slot_minutes));
    let today = now.date();

    for offset in 0..settings.horizon_days {
        let date = today + Duration::days(i64::from(offset));
        let mut cursor = settings.day_start;
        if offset == 0 {
            let from = ceil_minute(now.time());
            if from < now.time() {
                // rounded past midnight
                continue;
            }
            cursor = cursor.max(from);
        }

        let mut busy: Vec<(NaiveTime, NaiveTime)> = occupants
            .iter()
            .filter(|o| o.reservation.dates().contains(date))
            .filter(|o| o.occupied_dates(None).contains(&date))
            .map(|o| (o.reservation.window().start(), o.reservation.window().end()))
            .collect();
        busy.sort();

        for (start, end) in busy {
            let gap_end = start.min(settings.day_end);
            if gap_end > cursor && gap_end - cursor >= min_slot {
                return Some(AvailabilityWindow {
                    date,
                    start: cursor,
                    end: gap_end,
                });
            }
            cursor = cursor.max(end);
        }

        if settings.day_end > cursor && settings.day_end - cursor >= min_slot {
            return Some(AvailabilityWindow {
                date,
                start: cursor,
                end: settings.day_end,
            });
        }
    }

    None
}
