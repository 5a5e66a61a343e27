//! CLI-specific error types with exit codes.
//!
//! This module wraps library errors and maps each error kind to the
//! process exit code scripts can branch on.

use std::fmt;

use labres::{Error as LibError, ErrorKind};

/// CLI-specific error type with exit code mapping.
#[derive(Debug)]
pub enum CliError {
    /// Library error (wrapped).
    Library(LibError),

    /// Invalid command-line arguments.
    InvalidArguments(String),

    /// I/O error.
    Io(std::io::Error),

    /// Timeout waiting for database lock.
    Timeout,

    /// Configuration error.
    Config(String),
}

impl CliError {
    /// Get the appropriate exit code for this error.
    ///
    /// Exit codes:
    /// - 0: Success (not an error)
    /// - 1: Conflict with an approved reservation
    /// - 2: Timeout waiting for database lock
    /// - 3: Resource, reservation, release or notification not found
    /// - 4: Invalid arguments or validation failure
    /// - 5: I/O error
    /// - 6: Other library error
    /// - 7: Configuration error
    /// - 8: Not authorized
    /// - 9: Action not allowed in the current state
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Library(lib_err) => match lib_err.kind() {
                ErrorKind::Conflict => 1,
                ErrorKind::NotFound => 3,
                ErrorKind::Validation => 4,
                ErrorKind::Authorization => 8,
                ErrorKind::IllegalStateTransition => 9,
                ErrorKind::Infrastructure => match lib_err {
                    LibError::Io(_) => 5,
                    LibError::Configuration(_) => 7,
                    _ => 6,
                },
            },
            CliError::Timeout => 2,
            CliError::InvalidArguments(_) => 4,
            CliError::Io(_) => 5,
            CliError::Config(_) => 7,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Library(e) => write!(f, "{e}"),
            CliError::InvalidArguments(msg) => write!(f, "Invalid arguments: {msg}"),
            CliError::Io(e) => write!(f, "I/O error: {e}"),
            CliError::Timeout => write!(f, "Timeout waiting for database lock"),
            CliError::Config(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Library(e) => Some(e),
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LibError> for CliError {
    fn from(e: LibError) -> Self {
        if matches!(e, LibError::LockTimeout { .. }) {
            CliError::Timeout
        } else {
            CliError::Library(e)
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}

impl From<csv::Error> for CliError {
    fn from(e: csv::Error) -> Self {
        CliError::Io(std::io::Error::new(std::io::ErrorKind::Other, e))
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Io(std::io::Error::new(std::io::ErrorKind::Other, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labres::ReservationId;

    fn lib(err: LibError) -> i32 {
        CliError::from(err).exit_code()
    }

    #[test]
    fn test_library_kinds_map_to_exit_codes() {
        assert_eq!(
            lib(LibError::Conflict {
                blocking: ReservationId::new(1),
                details: "overlap".into(),
            }),
            1
        );
        assert_eq!(lib(LibError::NotFound { resource: "resource 9".into() }), 3);
        assert_eq!(
            lib(LibError::Validation {
                field: "reason".into(),
                message: "empty".into(),
            }),
            4
        );
        assert_eq!(
            lib(LibError::Authorization {
                actor: "bob".into(),
                action: "approve".into(),
            }),
            8
        );
        assert_eq!(
            lib(LibError::IllegalStateTransition {
                entity: "reservation 1".into(),
                from: "rejected".into(),
                action: "reject".into(),
            }),
            9
        );
    }

    #[test]
    fn test_infrastructure_exit_codes() {
        assert_eq!(lib(LibError::LockTimeout { seconds: 5 }), 2);
        assert_eq!(lib(LibError::Io(std::io::Error::other("disk"))), 5);
        assert_eq!(
            lib(LibError::DatabaseCorruption {
                details: "bad page".into(),
            }),
            6
        );
        assert_eq!(CliError::Config("bad".into()).exit_code(), 7);
        assert_eq!(CliError::InvalidArguments("no user".into()).exit_code(), 4);
    }
}
