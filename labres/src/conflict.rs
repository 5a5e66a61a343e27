//! Overlap detection between a candidate booking and approved reservations.
//!
//! A blocker occupies the dates of its range except those it has given back
//! through a live release (when someone else is asking) and those already
//! reclaimed by another reservation. Two bookings conflict when they share an
//! occupied date and their daily windows intersect.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use rusqlite::Connection;

use crate::actor::UserId;
use crate::database::Database;
use crate::error::{Error, Result};
use crate::release::Release;
use crate::reservation::{Reservation, ReservationId};
use crate::resource::ResourceId;
use crate::schedule::{format_date, DateRange, TimeWindow};

/// A booking being checked for conflicts.
///
/// # Examples
///
/// ```
/// use chrono::{NaiveDate, NaiveTime};
/// use labres::conflict::Candidate;
/// use labres::{DateRange, ResourceId, TimeWindow, UserId};
///
/// let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
/// let at = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap();
/// let owner = UserId::new("bob").unwrap();
///
/// let candidate = Candidate::new(
///     ResourceId::new(1),
///     DateRange::single(day),
///     TimeWindow::new(at(9), at(12)).unwrap(),
///     &owner,
/// );
/// assert!(candidate.ignore.is_none());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    /// The resource asked for.
    pub resource: ResourceId,
    /// The requested dates.
    pub dates: DateRange,
    /// The requested daily window.
    pub window: TimeWindow,
    /// Who would own the booking.
    pub owner: &'a UserId,
    /// A reservation to leave out (the candidate itself).
    pub ignore: Option<ReservationId>,
}

impl<'a> Candidate<'a> {
    /// Creates a candidate that ignores nothing.
    #[must_use]
    pub const fn new(
        resource: ResourceId,
        dates: DateRange,
        window: TimeWindow,
        owner: &'a UserId,
    ) -> Self {
        Self {
            resource,
            dates,
            window,
            owner,
            ignore: None,
        }
    }

    /// Leaves `id` out of the check.
    #[must_use]
    pub const fn ignoring(mut self, id: ReservationId) -> Self {
        self.ignore = Some(id);
        self
    }

    /// The candidate as it would look if a reservation were built from it.
    #[must_use]
    pub const fn with_region(mut self, dates: DateRange, window: TimeWindow) -> Self {
        self.dates = dates;
        self.window = window;
        self
    }
}

/// Result of a conflict check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictOutcome {
    /// No approved reservation overlaps.
    Clear,
    /// An approved reservation overlaps.
    Conflict {
        /// The lowest-id overlapping reservation.
        blocking: ReservationId,
        /// The first shared occupied date.
        date: NaiveDate,
        /// The blocker's daily window.
        window: TimeWindow,
    },
}

impl ConflictOutcome {
    /// Returns `true` if nothing overlaps.
    #[must_use]
    pub const fn is_clear(&self) -> bool {
        matches!(self, Self::Clear)
    }

    /// Returns the blocking reservation, if any.
    #[must_use]
    pub const fn blocking(&self) -> Option<ReservationId> {
        match self {
            Self::Clear => None,
            Self::Conflict { blocking, .. } => Some(*blocking),
        }
    }

    /// Converts a conflict into [`Error::Conflict`].
    ///
    /// # Errors
    ///
    /// Returns the conflict error when the outcome is not clear.
    pub fn into_result(self) -> Result<()> {
        match self {
            Self::Clear => Ok(()),
            Self::Conflict {
                blocking,
                date,
                window,
            } => Err(Error::Conflict {
                blocking,
                details: format!(
                    "reservation {blocking} holds {} during {window}",
                    format_date(date)
                ),
            }),
        }
    }
}

/// An approved reservation together with its releases.
#[derive(Debug, Clone)]
pub struct Occupant {
    /// The approved reservation.
    pub reservation: Reservation,
    /// Every release of the reservation, cancelled ones included.
    pub releases: Vec<Release>,
}

impl Occupant {
    /// Returns the dates the reservation occupies as seen by `viewer`.
    ///
    /// Dates reclaimed by others are never occupied. Dates given back through
    /// a live release are free for everyone except the releasing owner; with
    /// `viewer = None` they are free.
    #[must_use]
    pub fn occupied_dates(&self, viewer: Option<&UserId>) -> BTreeSet<NaiveDate> {
        occupied_dates(&self.reservation, &self.releases, viewer)
    }
}

/// Computes the dates `reservation` occupies as seen by `viewer`.
///
/// # Examples
///
/// ```
/// use chrono::{NaiveDate, NaiveTime};
/// use labres::conflict::occupied_dates;
/// use labres::{DateRange, Release, ReleaseId, Reservation, ReservationId, ResourceId, TimeWindow, UserId};
///
/// let june = |d| NaiveDate::from_ymd_opt(2024, 6, d).unwrap();
/// let at = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap();
/// let alice = UserId::new("alice").unwrap();
/// let bob = UserId::new("bob").unwrap();
///
/// let reservation = Reservation::builder(
///     ReservationId::new(1),
///     alice.clone(),
///     ResourceId::new(1),
///     DateRange::new(june(1), june(3)).unwrap(),
///     TimeWindow::new(at(9), at(12)).unwrap(),
/// )
/// .reason("simulation")
/// .build()
/// .unwrap();
/// let release = Release::builder(ReleaseId::new(1), ReservationId::new(1), alice.clone(), ResourceId::new(1))
///     .dates([june(2)])
///     .reason("away")
///     .build()
///     .unwrap();
///
/// assert_eq!(occupied_dates(&reservation, &[release.clone()], Some(&bob)).len(), 2);
/// assert_eq!(occupied_dates(&reservation, &[release], Some(&alice)).len(), 3);
/// ```
#[must_use]
pub fn occupied_dates(
    reservation: &Reservation,
    releases: &[Release],
    viewer: Option<&UserId>,
) -> BTreeSet<NaiveDate> {
    let mut free = BTreeSet::new();
    for release in releases.iter().filter(|r| r.reservation() == reservation.id()) {
        free.extend(release.reclaimed().keys().copied());
        if viewer.map_or(true, |v| v != release.owner()) {
            free.extend(release.bookable_dates());
        }
    }
    reservation
        .dates()
        .days()
        .filter(|d| !free.contains(d))
        .collect()
}

/// Finds the lowest-id occupant that conflicts with `candidate`.
///
/// Occupants equal to `candidate.ignore` and those whose windows do not
/// intersect are skipped.
#[must_use]
pub fn first_conflict(candidate: &Candidate<'_>, occupants: &[Occupant]) -> ConflictOutcome {
    let mut best: Option<ConflictOutcome> = None;

    for occupant in occupants {
        let blocker = &occupant.reservation;
        if Some(blocker.id()) == candidate.ignore
            || blocker.resource() != candidate.resource
            || !blocker.window().overlaps(&candidate.window)
        {
            continue;
        }
        if let Some(known) = best.and_then(|b| b.blocking()) {
            if known < blocker.id() {
                continue;
            }
        }

        let occupied = occupant.occupied_dates(Some(candidate.owner));
        if let Some(date) = occupied.into_iter().find(|d| candidate.dates.contains(*d)) {
            best = Some(ConflictOutcome::Conflict {
                blocking: blocker.id(),
                date,
                window: blocker.window(),
            });
        }
    }

    best.unwrap_or(ConflictOutcome::Clear)
}

/// Checks candidates against the approved reservations in the database.
///
/// Stateless; all state comes from the connection, which should be inside
/// the write transaction that will act on the result.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictChecker;

impl ConflictChecker {
    /// Loads the approved reservations on `resource` whose range intersects
    /// `dates`, with their releases.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub fn occupants(
        conn: &Connection,
        resource: ResourceId,
        dates: &DateRange,
    ) -> Result<Vec<Occupant>> {
        Database::find_approved_overlapping(conn, resource, dates)?
            .into_iter()
            .map(|reservation| {
                let releases = Database::list_releases_for_reservation(conn, reservation.id())?;
                Ok(Occupant {
                    reservation,
                    releases,
                })
            })
            .collect()
    }

    /// Checks one candidate.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub fn check(conn: &Connection, candidate: &Candidate<'_>) -> Result<ConflictOutcome> {
        let occupants = Self::occupants(conn, candidate.resource, &candidate.dates)?;
        Ok(first_conflict(candidate, &occupants))
    }

    /// Checks several regions of the same booking and reports the lowest-id
    /// blocker across all of them.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub fn check_regions(
        conn: &Connection,
        base: &Candidate<'_>,
        regions: &[(DateRange, TimeWindow)],
    ) -> Result<ConflictOutcome> {
        let mut best = ConflictOutcome::Clear;
        for (dates, window) in regions {
            let outcome = Self::check(conn, &base.with_region(*dates, *window))?;
            best = match (best.blocking(), outcome.blocking()) {
                (_, None) => best,
                (None, Some(_)) => outcome,
                (Some(current), Some(found)) if found < current => outcome,
                _ => best,
            };
        }
        Ok(best)
    }

    /// Checks one candidate and fails on conflict.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Conflict`] naming the blocker, or a database error.
    pub fn ensure_clear(conn: &Connection, candidate: &Candidate<'_>) -> Result<()> {
        let outcome = Self::check(conn, candidate)?;
        if let ConflictOutcome::Conflict { blocking, .. } = outcome {
            log::debug!(
                "candidate {} {} on resource {} blocked by reservation {blocking}",
                candidate.dates,
                candidate.window,
                candidate.resource
            );
        }
        outcome.into_result()
    }
}
