//! Temporary releases: dates an owner gives back from an approved reservation.
//!
//! A release keeps its original date set forever. Dates later booked by
//! someone else are marked reclaimed, and the still-bookable remainder is
//! derived as `original - reclaimed`.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::time::SystemTime;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::actor::UserId;
use crate::reservation::{ReservationId, ValidationError};
use crate::resource::ResourceId;

/// Identifier of a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReleaseId(i64);

impl ReleaseId {
    /// Wraps a raw id.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ReleaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status of a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseStatus {
    /// Some dates are still bookable.
    Active,
    /// Every date has been reclaimed.
    PartiallyBooked,
    /// Withdrawn; unreclaimed dates are occupied by the parent again.
    Cancelled,
}

impl ReleaseStatus {
    /// Returns the storage/display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::PartiallyBooked => "partially_booked",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a status name.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown names.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "partially_booked" => Ok(Self::PartiallyBooked),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            _ => Err(ValidationError {
                field: "status".into(),
                message: format!(
                    "invalid release status '{s}': expected active, partially_booked or cancelled"
                ),
            }),
        }
    }
}

impl fmt::Display for ReleaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request to give back dates of an approved reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseRequest {
    /// The parent reservation.
    pub reservation: ReservationId,
    /// The dates to give back.
    pub dates: Vec<NaiveDate>,
    /// Why the dates are not needed.
    pub reason: String,
}

impl ReleaseRequest {
    /// Creates a release request.
    #[must_use]
    pub fn new(
        reservation: ReservationId,
        dates: impl IntoIterator<Item = NaiveDate>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            reservation,
            dates: dates.into_iter().collect(),
            reason: reason.into(),
        }
    }
}

/// A temporary release of dates from an approved reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    id: ReleaseId,
    reservation: ReservationId,
    owner: UserId,
    resource: ResourceId,
    original: BTreeSet<NaiveDate>,
    reclaimed: BTreeMap<NaiveDate, ReservationId>,
    reason: String,
    status: ReleaseStatus,
    created_at: SystemTime,
    updated_at: SystemTime,
}

impl Release {
    /// Creates a new release builder.
    #[must_use]
    pub fn builder(
        id: ReleaseId,
        reservation: ReservationId,
        owner: UserId,
        resource: ResourceId,
    ) -> ReleaseBuilder {
        ReleaseBuilder {
            id,
            reservation,
            owner,
            resource,
            original: BTreeSet::new(),
            reclaimed: BTreeMap::new(),
            reason: String::new(),
            status: ReleaseStatus::Active,
            created_at: None,
            updated_at: None,
        }
    }

    /// Returns the release id.
    #[must_use]
    pub const fn id(&self) -> ReleaseId {
        self.id
    }

    /// Returns the parent reservation.
    #[must_use]
    pub const fn reservation(&self) -> ReservationId {
        self.reservation
    }

    /// Returns the release owner (the parent's owner).
    #[must_use]
    pub const fn owner(&self) -> &UserId {
        &self.owner
    }

    /// Returns the resource of the parent reservation.
    #[must_use]
    pub const fn resource(&self) -> ResourceId {
        self.resource
    }

    /// Returns the dates originally given back.
    #[must_use]
    pub const fn original_dates(&self) -> &BTreeSet<NaiveDate> {
        &self.original
    }

    /// Returns reclaimed dates with the reservation that reclaimed each.
    #[must_use]
    pub const fn reclaimed(&self) -> &BTreeMap<NaiveDate, ReservationId> {
        &self.reclaimed
    }

    /// Returns the original dates not yet reclaimed.
    ///
    /// For a cancelled release these dates are occupied by the parent again;
    /// use [`Release::bookable_dates`] for what others may book.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use labres::{Release, ReleaseId, ReservationId, ResourceId, UserId};
    ///
    /// let june = |d| NaiveDate::from_ymd_opt(2024, 6, d).unwrap();
    /// let release = Release::builder(
    ///     ReleaseId::new(1),
    ///     ReservationId::new(1),
    ///     UserId::new("alice").unwrap(),
    ///     ResourceId::new(1),
    /// )
    /// .dates([june(2), june(3)])
    /// .reclaimed_date(june(2), ReservationId::new(5))
    /// .reason("travelling")
    /// .build()
    /// .unwrap();
    ///
    /// assert_eq!(release.active_dates().into_iter().collect::<Vec<_>>(), vec![june(3)]);
    /// ```
    #[must_use]
    pub fn active_dates(&self) -> BTreeSet<NaiveDate> {
        self.original
            .iter()
            .filter(|d| !self.reclaimed.contains_key(d))
            .copied()
            .collect()
    }

    /// Returns dates others may currently book: the active dates of a
    /// non-cancelled release, nothing otherwise.
    #[must_use]
    pub fn bookable_dates(&self) -> BTreeSet<NaiveDate> {
        if self.status == ReleaseStatus::Cancelled {
            BTreeSet::new()
        } else {
            self.active_dates()
        }
    }

    /// Returns the reason.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Returns the status.
    #[must_use]
    pub const fn status(&self) -> ReleaseStatus {
        self.status
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> SystemTime {
        self.created_at
    }

    /// Returns the last update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> SystemTime {
        self.updated_at
    }

    /// Returns `true` unless the release was cancelled.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.status != ReleaseStatus::Cancelled
    }

    /// Returns dates this release still holds against new releases of the
    /// same reservation: every reclaimed date, plus all original dates while
    /// the release is not cancelled.
    #[must_use]
    pub fn claimed_dates(&self) -> BTreeSet<NaiveDate> {
        if self.is_live() {
            self.original.clone()
        } else {
            self.reclaimed.keys().copied().collect()
        }
    }

    /// Returns the status after `additional` dates are reclaimed.
    #[must_use]
    pub fn status_after_reclaim(&self, additional: &BTreeSet<NaiveDate>) -> ReleaseStatus {
        let remaining = self
            .active_dates()
            .into_iter()
            .filter(|d| !additional.contains(d))
            .count();
        if remaining == 0 {
            ReleaseStatus::PartiallyBooked
        } else {
            ReleaseStatus::Active
        }
    }

    /// Returns the status after the reclaims on `returned` dates are undone.
    ///
    /// A cancelled release stays cancelled.
    #[must_use]
    pub fn status_after_return(&self, returned: &BTreeSet<NaiveDate>) -> ReleaseStatus {
        if !self.is_live() {
            return ReleaseStatus::Cancelled;
        }
        if self.active_dates().is_empty() && returned.is_empty() {
            ReleaseStatus::PartiallyBooked
        } else {
            ReleaseStatus::Active
        }
    }

    /// Returns a short label like `release 2` for messages.
    #[must_use]
    pub fn label(&self) -> String {
        format!("release {}", self.id)
    }
}

/// Builder for creating `Release` instances.
#[derive(Debug)]
pub struct ReleaseBuilder {
    id: ReleaseId,
    reservation: ReservationId,
    owner: UserId,
    resource: ResourceId,
    original: BTreeSet<NaiveDate>,
    reclaimed: BTreeMap<NaiveDate, ReservationId>,
    reason: String,
    status: ReleaseStatus,
    created_at: Option<SystemTime>,
    updated_at: Option<SystemTime>,
}

impl ReleaseBuilder {
    /// Adds original dates. Duplicates collapse.
    #[must_use]
    pub fn dates(mut self, dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.original.extend(dates);
        self
    }

    /// Marks `date` as reclaimed by `by`.
    #[must_use]
    pub fn reclaimed_date(mut self, date: NaiveDate, by: ReservationId) -> Self {
        self.reclaimed.insert(date, by);
        self
    }

    /// Sets the reason. Surrounding whitespace is trimmed.
    #[must_use]
    pub fn reason(mut self, reason: impl AsRef<str>) -> Self {
        self.reason = reason.as_ref().trim().to_string();
        self
    }

    /// Sets the status.
    #[must_use]
    pub const fn status(mut self, status: ReleaseStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the creation timestamp.
    #[must_use]
    pub fn created_at(mut self, created_at: SystemTime) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Sets the last update timestamp.
    #[must_use]
    pub fn updated_at(mut self, updated_at: SystemTime) -> Self {
        self.updated_at = Some(updated_at);
        self
    }

    /// Builds the release.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No dates were given
    /// - The reason is empty after trimming
    /// - A reclaimed date is not one of the original dates
    pub fn build(self) -> Result<Release, ValidationError> {
        if self.original.is_empty() {
            return Err(ValidationError {
                field: "dates".into(),
                message: "at least one date must be released".into(),
            });
        }

        if self.reason.is_empty() {
            return Err(ValidationError {
                field: "reason".into(),
                message: "reason must be non-empty after trimming whitespace".into(),
            });
        }

        if let Some(stray) = self.reclaimed.keys().find(|d| !self.original.contains(d)) {
            return Err(ValidationError {
                field: "reclaimed".into(),
                message: format!("reclaimed date {stray} is not part of the release"),
            });
        }

        let now = SystemTime::now();
        let created_at = self.created_at.unwrap_or(now);
        Ok(Release {
            id: self.id,
            reservation: self.reservation,
            owner: self.owner,
            resource: self.resource,
            original: self.original,
            reclaimed: self.reclaimed,
            reason: self.reason,
            status: self.status,
            created_at,
            updated_at: self.updated_at.unwrap_or(created_at),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn builder() -> ReleaseBuilder {
        Release::builder(
            ReleaseId::new(4),
            ReservationId::new(1),
            UserId::new("alice").unwrap(),
            ResourceId::new(2),
        )
        .reason("conference")
    }

    #[test]
    fn test_build_requires_dates() {
        let err = builder().build().unwrap_err();
        assert_eq!(err.field, "dates");
    }

    #[test]
    fn test_build_requires_reason() {
        let err = builder().dates([date(2)]).reason(" ").build().unwrap_err();
        assert_eq!(err.field, "reason");
    }

    #[test]
    fn test_build_rejects_stray_reclaim() {
        let err = builder()
            .dates([date(2)])
            .reclaimed_date(date(3), ReservationId::new(9))
            .build()
            .unwrap_err();
        assert_eq!(err.field, "reclaimed");
    }

    #[test]
    fn test_active_is_original_minus_reclaimed() {
        let release = builder()
            .dates([date(2), date(3), date(4), date(3)])
            .reclaimed_date(date(3), ReservationId::new(9))
            .build()
            .unwrap();

        assert_eq!(release.original_dates().len(), 3);
        let active: Vec<_> = release.active_dates().into_iter().collect();
        assert_eq!(active, vec![date(2), date(4)]);
        assert!(release.original_dates().is_superset(&release.active_dates()));
    }

    #[test]
    fn test_bookable_dates_empty_when_cancelled() {
        let release = builder()
            .dates([date(2)])
            .status(ReleaseStatus::Cancelled)
            .build()
            .unwrap();
        assert!(release.bookable_dates().is_empty());
        assert_eq!(release.active_dates().len(), 1);
        assert!(!release.is_live());
    }

    #[test]
    fn test_claimed_dates() {
        let live = builder()
            .dates([date(2), date(3)])
            .reclaimed_date(date(2), ReservationId::new(9))
            .build()
            .unwrap();
        assert_eq!(live.claimed_dates().len(), 2);

        let cancelled = builder()
            .dates([date(2), date(3)])
            .reclaimed_date(date(2), ReservationId::new(9))
            .status(ReleaseStatus::Cancelled)
            .build()
            .unwrap();
        let claimed: Vec<_> = cancelled.claimed_dates().into_iter().collect();
        assert_eq!(claimed, vec![date(2)]);
    }

    #[test]
    fn test_status_after_reclaim() {
        let release = builder().dates([date(2), date(3)]).build().unwrap();

        let some: BTreeSet<_> = [date(2)].into_iter().collect();
        assert_eq!(release.status_after_reclaim(&some), ReleaseStatus::Active);

        let all: BTreeSet<_> = [date(2), date(3)].into_iter().collect();
        assert_eq!(
            release.status_after_reclaim(&all),
            ReleaseStatus::PartiallyBooked
        );
    }

    #[test]
    fn test_status_after_return() {
        let booked = builder()
            .dates([date(2)])
            .reclaimed_date(date(2), ReservationId::new(7))
            .status(ReleaseStatus::PartiallyBooked)
            .build()
            .unwrap();
        let returned: BTreeSet<_> = [date(2)].into_iter().collect();
        assert_eq!(booked.status_after_return(&returned), ReleaseStatus::Active);
        assert_eq!(
            booked.status_after_return(&BTreeSet::new()),
            ReleaseStatus::PartiallyBooked
        );

        let withdrawn = builder()
            .dates([date(2)])
            .reclaimed_date(date(2), ReservationId::new(7))
            .status(ReleaseStatus::Cancelled)
            .build()
            .unwrap();
        assert_eq!(withdrawn.status_after_return(&returned), ReleaseStatus::Cancelled);
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(
            ReleaseStatus::parse("partially_booked").unwrap(),
            ReleaseStatus::PartiallyBooked
        );
        assert!(ReleaseStatus::parse("gone").is_err());
    }
}
