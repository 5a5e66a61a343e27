//! Reservation types for booking lab resources over date ranges.
//!
//! This module provides the [`Reservation`] record, its stored and derived
//! status, the request types callers submit, and the builder used to
//! construct validated reservations.

use std::fmt;
use std::time::SystemTime;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::actor::UserId;
use crate::resource::ResourceId;
use crate::schedule::{end_instant, DateRange, TimeWindow};

/// Identifier of a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReservationId(i64);

impl ReservationId {
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

impl fmt::Display for ReservationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status of a reservation.
///
/// `Completed` is never stored: it is reported by
/// [`Reservation::effective_status`] for approved reservations whose last
/// window has ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    /// Awaiting an administrator decision.
    Pending,
    /// Granted.
    Approved,
    /// Declined by an administrator.
    Rejected,
    /// Withdrawn by the owner or revoked by an administrator.
    Cancelled,
    /// Approved and fully in the past.
    Completed,
}

impl ReservationStatus {
    /// Returns the storage/display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }

    /// Parses a status name (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error for unknown names.
    ///
    /// # Examples
    ///
    /// ```
    /// use labres::ReservationStatus;
    ///
    /// assert_eq!(ReservationStatus::parse("Approved").unwrap(), ReservationStatus::Approved);
    /// assert!(ReservationStatus::parse("done").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            "completed" => Ok(Self::Completed),
            _ => Err(ValidationError {
                field: "status".into(),
                message: format!(
                    "invalid reservation status '{s}': expected pending, approved, rejected, cancelled or completed"
                ),
            }),
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A booking request submitted by a user.
///
/// # Examples
///
/// ```
/// use chrono::{NaiveDate, NaiveTime};
/// use labres::{DateRange, ReservationRequest, ResourceId, TimeWindow};
///
/// let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
/// let window = TimeWindow::new(
///     NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
///     NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
/// )
/// .unwrap();
///
/// let request = ReservationRequest::new(
///     ResourceId::new(1),
///     DateRange::single(day),
///     window,
///     "thesis experiments",
/// )
/// .with_metadata(serde_json::json!({"gpu_memory_gb": 24}));
/// assert_eq!(request.reason, "thesis experiments");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationRequest {
    /// The resource to book.
    pub resource: ResourceId,
    /// The dates to book.
    pub dates: DateRange,
    /// The daily window.
    pub window: TimeWindow,
    /// Why the resource is needed.
    pub reason: String,
    /// Opaque metadata stored verbatim.
    pub metadata: Option<serde_json::Value>,
}

impl ReservationRequest {
    /// Creates a request without metadata.
    #[must_use]
    pub fn new(
        resource: ResourceId,
        dates: DateRange,
        window: TimeWindow,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            resource,
            dates,
            window,
            reason: reason.into(),
            metadata: None,
        }
    }

    /// Attaches opaque metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// New end bounds for extending an approved reservation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendRequest {
    /// New last date, if the range grows.
    pub new_end_date: Option<NaiveDate>,
    /// New daily end time, if the window grows.
    pub new_end_time: Option<NaiveTime>,
}

impl ExtendRequest {
    /// Returns `true` if neither bound was supplied.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.new_end_date.is_none() && self.new_end_time.is_none()
    }
}

/// A reservation of a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    id: ReservationId,
    owner: UserId,
    resource: ResourceId,
    dates: DateRange,
    window: TimeWindow,
    reason: String,
    status: ReservationStatus,
    metadata: Option<serde_json::Value>,
    decision_reason: Option<String>,
    created_at: SystemTime,
    updated_at: SystemTime,
}

impl Reservation {
    /// Creates a new reservation builder.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{NaiveDate, NaiveTime};
    /// use labres::{DateRange, Reservation, ReservationId, ReservationStatus, ResourceId, TimeWindow, UserId};
    ///
    /// let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    /// let window = TimeWindow::new(
    ///     NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
    ///     NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
    /// )
    /// .unwrap();
    ///
    /// let reservation = Reservation::builder(
    ///     ReservationId::new(1),
    ///     UserId::new("alice").unwrap(),
    ///     ResourceId::new(1),
    ///     DateRange::single(day),
    ///     window,
    /// )
    /// .reason("benchmarks")
    /// .build()
    /// .unwrap();
    ///
    /// assert_eq!(reservation.status(), ReservationStatus::Pending);
    /// ```
    #[must_use]
    pub fn builder(
        id: ReservationId,
        owner: UserId,
        resource: ResourceId,
        dates: DateRange,
        window: TimeWindow,
    ) -> ReservationBuilder {
        ReservationBuilder {
            id,
            owner,
            resource,
            dates,
            window,
            reason: String::new(),
            status: ReservationStatus::Pending,
            metadata: None,
            decision_reason: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Returns the reservation id.
    #[must_use]
    pub const fn id(&self) -> ReservationId {
        self.id
    }

    /// Returns the owning user.
    #[must_use]
    pub const fn owner(&self) -> &UserId {
        &self.owner
    }

    /// Returns the booked resource.
    #[must_use]
    pub const fn resource(&self) -> ResourceId {
        self.resource
    }

    /// Returns the booked dates.
    #[must_use]
    pub const fn dates(&self) -> DateRange {
        self.dates
    }

    /// Returns the daily window.
    #[must_use]
    pub const fn window(&self) -> TimeWindow {
        self.window
    }

    /// Returns the requester's reason.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Returns the stored status.
    #[must_use]
    pub const fn status(&self) -> ReservationStatus {
        self.status
    }

    /// Returns the opaque metadata.
    #[must_use]
    pub const fn metadata(&self) -> Option<&serde_json::Value> {
        self.metadata.as_ref()
    }

    /// Returns the rejection, cancellation or revocation reason.
    #[must_use]
    pub fn decision_reason(&self) -> Option<&str> {
        self.decision_reason.as_deref()
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

    /// Returns the moment the last daily window ends.
    #[must_use]
    pub fn ends_at(&self) -> NaiveDateTime {
        end_instant(self.dates.end(), self.window.end())
    }

    /// Returns the moment the first daily window begins.
    #[must_use]
    pub fn starts_at(&self) -> NaiveDateTime {
        self.dates.start().and_time(self.window.start())
    }

    /// Returns `true` if the reservation is approved and fully in the past.
    #[must_use]
    pub fn is_completed(&self, now: NaiveDateTime) -> bool {
        self.status == ReservationStatus::Approved && now >= self.ends_at()
    }

    /// Returns the status as reported to callers at `now`.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{NaiveDate, NaiveTime};
    /// use labres::{DateRange, Reservation, ReservationId, ReservationStatus, ResourceId, TimeWindow, UserId};
    ///
    /// let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    /// let at = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap();
    /// let reservation = Reservation::builder(
    ///     ReservationId::new(1),
    ///     UserId::new("alice").unwrap(),
    ///     ResourceId::new(1),
    ///     DateRange::single(day),
    ///     TimeWindow::new(at(9), at(12)).unwrap(),
    /// )
    /// .reason("benchmarks")
    /// .status(ReservationStatus::Approved)
    /// .build()
    /// .unwrap();
    ///
    /// assert_eq!(reservation.effective_status(day.and_time(at(11))), ReservationStatus::Approved);
    /// assert_eq!(reservation.effective_status(day.and_time(at(12))), ReservationStatus::Completed);
    /// ```
    #[must_use]
    pub fn effective_status(&self, now: NaiveDateTime) -> ReservationStatus {
        if self.is_completed(now) {
            ReservationStatus::Completed
        } else {
            self.status
        }
    }

    /// Returns a short label like `reservation 4` for messages.
    #[must_use]
    pub fn label(&self) -> String {
        format!("reservation {}", self.id)
    }
}

/// Builder for creating `Reservation` instances.
#[derive(Debug)]
pub struct ReservationBuilder {
    id: ReservationId,
    owner: UserId,
    resource: ResourceId,
    dates: DateRange,
    window: TimeWindow,
    reason: String,
    status: ReservationStatus,
    metadata: Option<serde_json::Value>,
    decision_reason: Option<String>,
    created_at: Option<SystemTime>,
    updated_at: Option<SystemTime>,
}

impl ReservationBuilder {
    /// Sets the reason. Surrounding whitespace is trimmed.
    #[must_use]
    pub fn reason(mut self, reason: impl AsRef<str>) -> Self {
        self.reason = reason.as_ref().trim().to_string();
        self
    }

    /// Sets the stored status.
    #[must_use]
    pub const fn status(mut self, status: ReservationStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the opaque metadata.
    #[must_use]
    pub fn metadata(mut self, metadata: Option<serde_json::Value>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Sets the decision reason. Surrounding whitespace is trimmed and an
    /// empty value is dropped.
    #[must_use]
    pub fn decision_reason(mut self, reason: Option<String>) -> Self {
        self.decision_reason = reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
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

    /// Builds the reservation.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The reason is empty after trimming
    /// - The status is `Completed`, which is never stored
    pub fn build(self) -> Result<Reservation, ValidationError> {
        if self.reason.is_empty() {
            return Err(ValidationError {
                field: "reason".into(),
                message: "reason must be non-empty after trimming whitespace".into(),
            });
        }

        if self.status == ReservationStatus::Completed {
            return Err(ValidationError {
                field: "status".into(),
                message: "completed is derived and cannot be stored".into(),
            });
        }

        let now = SystemTime::now();
        let created_at = self.created_at.unwrap_or(now);
        Ok(Reservation {
            id: self.id,
            owner: self.owner,
            resource: self.resource,
            dates: self.dates,
            window: self.window,
            reason: self.reason,
            status: self.status,
            metadata: self.metadata,
            decision_reason: self.decision_reason,
            created_at,
            updated_at: self.updated_at.unwrap_or(created_at),
        })
    }
}

/// Error type for validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The field that failed validation.
    pub field: String,
    /// A description of the validation failure.
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation error for '{}': {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}
