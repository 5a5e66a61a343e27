//! Actor identity supplied by the external identity collaborator.
//!
//! The core never authenticates anyone. Callers pass an [`Actor`] into every
//! operation and the operation planners decide what that actor may do.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::reservation::ValidationError;

/// An opaque, authenticated user identifier.
///
/// # Examples
///
/// ```
/// use labres::UserId;
///
/// let id = UserId::new("  alice ").unwrap();
/// assert_eq!(id.as_str(), "alice");
/// assert!(UserId::new("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a user id, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is empty after trimming.
    pub fn new(id: impl AsRef<str>) -> Result<Self, ValidationError> {
        let trimmed = id.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ValidationError {
                field: "user".into(),
                message: "user id must be non-empty after trimming whitespace".into(),
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Role of an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A regular requester.
    User,
    /// An administrator who approves, rejects, revokes and extends.
    Admin,
}

impl Role {
    /// Parses a role from a string (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not `user` or `admin`.
    ///
    /// # Examples
    ///
    /// ```
    /// use labres::Role;
    ///
    /// assert_eq!(Role::parse("ADMIN").unwrap(), Role::Admin);
    /// assert!(Role::parse("root").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s.trim().to_lowercase().as_str() {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            _ => Err(ValidationError {
                field: "role".into(),
                message: format!("invalid role '{s}': expected 'user' or 'admin'"),
            }),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

/// The authenticated identity and role performing an operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    id: UserId,
    role: Role,
}

impl Actor {
    /// Creates an actor.
    #[must_use]
    pub const fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }

    /// Creates a regular user actor.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is empty.
    pub fn user(id: impl AsRef<str>) -> Result<Self, ValidationError> {
        Ok(Self::new(UserId::new(id)?, Role::User))
    }

    /// Creates an administrator actor.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is empty.
    pub fn admin(id: impl AsRef<str>) -> Result<Self, ValidationError> {
        Ok(Self::new(UserId::new(id)?, Role::Admin))
    }

    /// Returns the actor's user id.
    #[must_use]
    pub const fn id(&self) -> &UserId {
        &self.id
    }

    /// Returns the actor's role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns `true` for administrators.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Returns `true` if `owner` is this actor.
    #[must_use]
    pub fn owns(&self, owner: &UserId) -> bool {
        &self.id == owner
    }

    /// Fails with an authorization error unless the actor is an administrator.
    pub(crate) fn require_admin(&self, action: impl Into<String>) -> crate::Result<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(self.denied(action))
        }
    }

    pub(crate) fn denied(&self, action: impl Into<String>) -> crate::Error {
        crate::Error::Authorization {
            actor: self.id.to_string(),
            action: action.into(),
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.role)
    }
}
