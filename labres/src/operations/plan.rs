//! Plan types for ledger operations.
//!
//! This module defines the plan structures that describe what actions
//! will be taken during an operation, without actually performing them.

use std::time::SystemTime;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::Connection;

use crate::actor::Actor;
use crate::notification::NotificationDraft;
use crate::release::{Release, ReleaseId, ReleaseStatus};
use crate::reservation::{Reservation, ReservationId, ReservationStatus};
use crate::resource::{Resource, ResourceId, ResourceStatus};
use crate::schedule::format_date;

/// Everything a planner may read.
///
/// Planners run inside the write transaction, so what they read through
/// `conn` stays valid until the plan is executed and committed.
#[derive(Clone, Copy)]
pub struct PlanContext<'a> {
    /// Connection (usually an open transaction).
    pub conn: &'a Connection,
    /// Who is acting.
    pub actor: &'a Actor,
    /// Lab-local wall-clock time.
    pub now: NaiveDateTime,
    /// Timestamp for created/updated columns.
    pub timestamp: SystemTime,
}

impl std::fmt::Debug for PlanContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanContext")
            .field("actor", self.actor)
            .field("now", &self.now)
            .finish_non_exhaustive()
    }
}

/// The entity an operation is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    /// A resource.
    Resource(ResourceId),
    /// A reservation.
    Reservation(ReservationId),
    /// A release.
    Release(ReleaseId),
}

/// A single action to be taken during plan execution.
///
/// Each action corresponds to a specific database operation that will
/// be performed when the plan is executed. Ids are allocated during
/// planning, so every action is fully concrete.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanAction {
    /// Register a resource.
    InsertResource(Resource),

    /// Change a resource's operational status.
    UpdateResourceStatus {
        /// The resource.
        id: ResourceId,
        /// The new status.
        status: ResourceStatus,
    },

    /// Remove a resource and its history.
    DeleteResource(ResourceId),

    /// Store a new reservation.
    InsertReservation(Reservation),

    /// Move a reservation to a new stored status.
    UpdateReservationStatus {
        /// The reservation.
        id: ReservationId,
        /// The new status.
        status: ReservationStatus,
        /// Decision reason (rejection, cancellation or revocation).
        reason: Option<String>,
    },

    /// Move a reservation's end date and daily end time.
    ExtendReservation {
        /// The reservation.
        id: ReservationId,
        /// New last date.
        end_date: NaiveDate,
        /// New daily end time.
        end_time: NaiveTime,
    },

    /// Store a new release.
    InsertRelease(Release),

    /// Move a release to a new status.
    UpdateReleaseStatus {
        /// The release.
        id: ReleaseId,
        /// The new status.
        status: ReleaseStatus,
    },

    /// Mark released dates as booked by another reservation.
    ReclaimReleaseDates {
        /// The release giving up the dates.
        release: ReleaseId,
        /// The dates reclaimed.
        dates: Vec<NaiveDate>,
        /// The reservation taking them.
        by: ReservationId,
        /// The release status afterwards.
        status: ReleaseStatus,
    },

    /// Undo reclaims made by a reservation that is going away.
    ReturnReclaimedDates {
        /// The release whose dates were reclaimed.
        release: ReleaseId,
        /// The reservation giving the dates up.
        from: ReservationId,
        /// Each date with the approved reservation that takes over its
        /// reclaim, or `None` to clear it.
        dates: Vec<(NaiveDate, Option<ReservationId>)>,
        /// The release status afterwards.
        status: ReleaseStatus,
    },

    /// Append an event to the notification outbox.
    RecordNotification(NotificationDraft),
}

impl PlanAction {
    /// Returns a human-readable description of this action.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::InsertResource(r) => format!("Register resource '{}' as {}", r.label(), r.id()),
            Self::UpdateResourceStatus { id, status } => {
                format!("Set resource {id} to {status}")
            }
            Self::DeleteResource(id) => format!("Delete resource {id}"),
            Self::InsertReservation(r) => format!(
                "Create {} on resource {} for {} {}",
                r.label(),
                r.resource(),
                r.dates(),
                r.window()
            ),
            Self::UpdateReservationStatus { id, status, .. } => {
                format!("Set reservation {id} to {status}")
            }
            Self::ExtendReservation {
                id,
                end_date,
                end_time,
            } => format!(
                "Extend reservation {id} to {} {}",
                format_date(*end_date),
                end_time.format("%H:%M")
            ),
            Self::InsertRelease(r) => format!(
                "Release {} date(s) of reservation {} as {}",
                r.original_dates().len(),
                r.reservation(),
                r.label()
            ),
            Self::UpdateReleaseStatus { id, status } => format!("Set release {id} to {status}"),
            Self::ReclaimReleaseDates {
                release,
                dates,
                by,
                ..
            } => format!(
                "Reclaim {} date(s) of release {release} for reservation {by}",
                dates.len()
            ),
            Self::ReturnReclaimedDates {
                release, from, dates, ..
            } => format!(
                "Return {} date(s) of release {release} reclaimed by reservation {from}",
                dates.len()
            ),
            Self::RecordNotification(draft) => {
                format!("Notify {} of {}", draft.user, draft.kind)
            }
        }
    }
}

/// A complete operation plan describing all actions to be taken.
///
/// Plans are generated during the planning phase and can be inspected,
/// logged, or executed. They include a description, a sequence of actions,
/// and any warnings that should be communicated to the user.
#[derive(Debug, Clone)]
pub struct OperationPlan {
    /// A human-readable description of the operation.
    pub description: String,

    /// The entity the operation is about, once known.
    pub subject: Option<Subject>,

    /// When the operation happens; stamped on every written row.
    pub timestamp: SystemTime,

    /// The sequence of actions to perform.
    pub actions: Vec<PlanAction>,

    /// Warnings to communicate to the user.
    pub warnings: Vec<String>,
}

impl OperationPlan {
    /// Creates a new operation plan with the given description.
    ///
    /// # Examples
    ///
    /// ```
    /// use labres::operations::OperationPlan;
    ///
    /// let plan = OperationPlan::new("Approve reservation 4");
    /// assert_eq!(plan.description, "Approve reservation 4");
    /// assert!(plan.is_empty());
    /// ```
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            subject: None,
            timestamp: SystemTime::now(),
            actions: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Sets the timestamp written by the plan's actions.
    #[must_use]
    pub const fn at(mut self, timestamp: SystemTime) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Sets the entity the operation is about.
    #[must_use]
    pub const fn about(mut self, subject: Subject) -> Self {
        self.subject = Some(subject);
        self
    }

    /// Adds an action to the plan.
    ///
    /// # Examples
    ///
    /// ```
    /// use labres::operations::{OperationPlan, PlanAction};
    /// use labres::ResourceId;
    ///
    /// let plan = OperationPlan::new("Remove ws-01")
    ///     .add_action(PlanAction::DeleteResource(ResourceId::new(1)));
    ///
    /// assert_eq!(plan.actions.len(), 1);
    /// ```
    #[must_use]
    pub fn add_action(mut self, action: PlanAction) -> Self {
        self.actions.push(action);
        self
    }

    /// Adds several actions to the plan.
    #[must_use]
    pub fn add_actions(mut self, actions: impl IntoIterator<Item = PlanAction>) -> Self {
        self.actions.extend(actions);
        self
    }

    /// Adds a warning to the plan.
    ///
    /// # Examples
    ///
    /// ```
    /// use labres::operations::OperationPlan;
    ///
    /// let plan = OperationPlan::new("Test")
    ///     .add_warning("This is a warning");
    ///
    /// assert_eq!(plan.warnings.len(), 1);
    /// ```
    #[must_use]
    pub fn add_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    /// Checks if the plan has no actions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Returns the number of actions in the plan.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns the notifications the plan will record.
    pub fn notifications(&self) -> impl Iterator<Item = &NotificationDraft> {
        self.actions.iter().filter_map(|action| match action {
            PlanAction::RecordNotification(draft) => Some(draft),
            _ => None,
        })
    }
}
