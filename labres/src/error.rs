//! Error types for the labres library.
//!
//! Every fallible operation in the library returns [`Result`]. Domain
//! failures are classified by [`ErrorKind`] so callers (the CLI, a web
//! layer) can map them without matching on every variant.

use thiserror::Error;

use crate::reservation::ReservationId;

/// Result type alias for operations that may fail with a labres error.
///
/// # Examples
///
/// ```
/// use labres::{Error, Result};
///
/// fn example_operation() -> Result<u32> {
///     Ok(42)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the labres library.
#[derive(Debug, Error)]
pub enum Error {
    /// A validation error occurred (malformed range, missing field, policy
    /// violation, resource under maintenance).
    #[error("validation error for '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// A description of the validation failure.
        message: String,
    },

    /// The requested entity was not found.
    #[error("not found: {resource}")]
    NotFound {
        /// Description of the entity that was not found.
        resource: String,
    },

    /// The candidate window overlaps an approved reservation.
    #[error("reservation conflict with reservation {blocking}: {details}")]
    Conflict {
        /// The approved reservation that blocks the candidate.
        blocking: ReservationId,
        /// Details about the conflict.
        details: String,
    },

    /// The requested action is not legal from the entity's current state.
    #[error("cannot {action} {entity} in state '{from}'")]
    IllegalStateTransition {
        /// The entity the action was attempted on (e.g. "reservation 4").
        entity: String,
        /// The state the entity was in.
        from: String,
        /// The attempted action.
        action: String,
    },

    /// The actor lacks the role or ownership the action requires.
    #[error("actor '{actor}' is not authorized to {action}")]
    Authorization {
        /// The acting user id.
        actor: String,
        /// The attempted action.
        action: String,
    },

    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A configuration error occurred.
    #[error("configuration error: {0}")]
    Configuration(#[from] serde_yaml::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A database lock timeout occurred.
    #[error("database lock timeout after {seconds}s")]
    LockTimeout {
        /// The number of seconds waited before timing out.
        seconds: u64,
    },

    /// Database corruption was detected.
    #[error("database corruption detected: {details}")]
    DatabaseCorruption {
        /// Details about the corruption.
        details: String,
    },

    /// An unsupported schema version was encountered.
    #[error("unsupported schema version: expected {expected}, found {found}")]
    UnsupportedSchemaVersion {
        /// The expected schema version.
        expected: i32,
        /// The schema version found in the database.
        found: i32,
    },
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input or a policy violation.
    Validation,
    /// Unknown resource, reservation or release.
    NotFound,
    /// Overlap with an approved reservation.
    Conflict,
    /// Action not allowed from the current state.
    IllegalStateTransition,
    /// Actor lacks the required role or ownership.
    Authorization,
    /// Storage, configuration or I/O failure.
    Infrastructure,
}

impl Error {
    /// Returns the coarse kind of this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use labres::{Error, ErrorKind};
    ///
    /// let err = Error::NotFound { resource: "reservation 7".into() };
    /// assert_eq!(err.kind(), ErrorKind::NotFound);
    /// ```
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::IllegalStateTransition { .. } => ErrorKind::IllegalStateTransition,
            Self::Authorization { .. } => ErrorKind::Authorization,
            Self::Database(_)
            | Self::Configuration(_)
            | Self::Io(_)
            | Self::LockTimeout { .. }
            | Self::DatabaseCorruption { .. }
            | Self::UnsupportedSchemaVersion { .. } => ErrorKind::Infrastructure,
        }
    }

    /// Returns the blocking reservation if this is a conflict error.
    #[must_use]
    pub fn blocking_reservation(&self) -> Option<ReservationId> {
        match self {
            Self::Conflict { blocking, .. } => Some(*blocking),
            _ => None,
        }
    }

    pub(crate) fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub(crate) fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub(crate) fn illegal(
        entity: impl Into<String>,
        from: impl std::fmt::Display,
        action: impl Into<String>,
    ) -> Self {
        Self::IllegalStateTransition {
            entity: entity.into(),
            from: from.to_string(),
            action: action.into(),
        }
    }
}

impl From<crate::reservation::ValidationError> for Error {
    fn from(err: crate::reservation::ValidationError) -> Self {
        Self::Validation {
            field: err.field,
            message: err.message,
        }
    }
}
