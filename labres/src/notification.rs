//! Notification events and the emitter collaborator.
//!
//! Every state change records one or more [`NotificationEvent`]s in the
//! database outbox inside the same transaction. After commit, the engine hands
//! each event to a [`NotificationEmitter`]. Delivery mechanics (email, push)
//! live behind that trait.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::actor::UserId;
use crate::release::ReleaseId;
use crate::reservation::{ReservationId, ValidationError};
use crate::Result;

/// Identifier of a recorded event; consumers use it as an idempotency key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(i64);

impl NotificationId {
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

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A reservation request was submitted.
    ReservationCreated,
    /// An administrator approved a reservation.
    ReservationApproved,
    /// An administrator rejected a reservation.
    ReservationRejected,
    /// The owner cancelled a reservation.
    ReservationCancelled,
    /// An administrator cancelled someone else's reservation.
    ReservationRevoked,
    /// An administrator extended a reservation.
    ReservationExtended,
    /// The owner gave back dates.
    ReleaseCreated,
    /// Released dates were booked by someone else.
    ReleaseReclaimed,
    /// A release was withdrawn.
    ReleaseCancelled,
}

impl NotificationKind {
    /// Returns the storage/display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ReservationCreated => "reservation_created",
            Self::ReservationApproved => "reservation_approved",
            Self::ReservationRejected => "reservation_rejected",
            Self::ReservationCancelled => "reservation_cancelled",
            Self::ReservationRevoked => "reservation_revoked",
            Self::ReservationExtended => "reservation_extended",
            Self::ReleaseCreated => "release_created",
            Self::ReleaseReclaimed => "release_reclaimed",
            Self::ReleaseCancelled => "release_cancelled",
        }
    }

    /// Parses a stored kind name.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown names.
    pub fn parse(s: &str) -> std::result::Result<Self, ValidationError> {
        let kind = match s {
            "reservation_created" => Self::ReservationCreated,
            "reservation_approved" => Self::ReservationApproved,
            "reservation_rejected" => Self::ReservationRejected,
            "reservation_cancelled" => Self::ReservationCancelled,
            "reservation_revoked" => Self::ReservationRevoked,
            "reservation_extended" => Self::ReservationExtended,
            "release_created" => Self::ReleaseCreated,
            "release_reclaimed" => Self::ReleaseReclaimed,
            "release_cancelled" => Self::ReleaseCancelled,
            _ => {
                return Err(ValidationError {
                    field: "kind".into(),
                    message: format!("unknown notification kind '{s}'"),
                })
            }
        };
        Ok(kind)
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event about to be written to the outbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationDraft {
    /// What happened.
    pub kind: NotificationKind,
    /// Who should hear about it.
    pub user: UserId,
    /// The affected reservation.
    pub reservation: Option<ReservationId>,
    /// The affected release.
    pub release: Option<ReleaseId>,
    /// Human-readable message.
    pub message: String,
    /// When it happened.
    pub created_at: SystemTime,
}

impl NotificationDraft {
    /// Creates a draft about a reservation.
    #[must_use]
    pub fn reservation(
        kind: NotificationKind,
        user: UserId,
        reservation: ReservationId,
        message: impl Into<String>,
        created_at: SystemTime,
    ) -> Self {
        Self {
            kind,
            user,
            reservation: Some(reservation),
            release: None,
            message: message.into(),
            created_at,
        }
    }

    /// Creates a draft about a release of a reservation.
    #[must_use]
    pub fn release(
        kind: NotificationKind,
        user: UserId,
        reservation: ReservationId,
        release: ReleaseId,
        message: impl Into<String>,
        created_at: SystemTime,
    ) -> Self {
        Self {
            kind,
            user,
            reservation: Some(reservation),
            release: Some(release),
            message: message.into(),
            created_at,
        }
    }

    /// Attaches the outbox id, producing the immutable event.
    #[must_use]
    pub fn into_event(self, id: NotificationId) -> NotificationEvent {
        NotificationEvent {
            id,
            kind: self.kind,
            user: self.user,
            reservation: self.reservation,
            release: self.release,
            message: self.message,
            created_at: self.created_at,
        }
    }
}

/// An immutable, recorded notification event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    /// Outbox id.
    pub id: NotificationId,
    /// What happened.
    pub kind: NotificationKind,
    /// Who should hear about it.
    pub user: UserId,
    /// The affected reservation.
    pub reservation: Option<ReservationId>,
    /// The affected release.
    pub release: Option<ReleaseId>,
    /// Human-readable message.
    pub message: String,
    /// When it happened.
    pub created_at: SystemTime,
}

/// Delivers recorded events to users.
///
/// Implementations must tolerate the same event being handed over more than
/// once; the event id identifies duplicates.
#[cfg_attr(test, mockall::automock)]
pub trait NotificationEmitter: Send {
    /// Delivers one event.
    ///
    /// # Errors
    ///
    /// Returns an error if delivery fails. The engine logs the failure and
    /// leaves the event undelivered in the outbox.
    fn emit(&self, event: &NotificationEvent) -> Result<()>;
}

/// Writes events through the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEmitter;

impl NotificationEmitter for LogEmitter {
    fn emit(&self, event: &NotificationEvent) -> Result<()> {
        log::info!(
            "notify {} [{} #{}]: {}",
            event.user,
            event.kind,
            event.id,
            event.message
        );
        Ok(())
    }
}

/// Accepts and discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullEmitter;

impl NotificationEmitter for NullEmitter {
    fn emit(&self, _event: &NotificationEvent) -> Result<()> {
        Ok(())
    }
}

/// Keeps delivered events in memory. Clones share the same buffer.
///
/// # Examples
///
/// ```
/// use labres::notification::MemoryEmitter;
///
/// let emitter = MemoryEmitter::new();
/// let observer = emitter.clone();
/// assert!(observer.events().is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryEmitter {
    events: Arc<Mutex<Vec<NotificationEvent>>>,
}

impl MemoryEmitter {
    /// Creates an empty emitter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every event delivered so far.
    #[must_use]
    pub fn events(&self) -> Vec<NotificationEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the kinds of delivered events, in order.
    #[must_use]
    pub fn kinds(&self) -> Vec<NotificationKind> {
        self.events().into_iter().map(|e| e.kind).collect()
    }

    /// Forgets every delivered event.
    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl NotificationEmitter for MemoryEmitter {
    fn emit(&self, event: &NotificationEvent) -> Result<()> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
        Ok(())
    }
}
