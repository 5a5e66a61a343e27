//! Bookable resources (lab computers) and their operational state.

use std::fmt;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::reservation::ValidationError;

/// Identifier of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(i64);

impl ResourceId {
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

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Operational state of a resource, independent of any reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceStatus {
    /// In service and bookable.
    Available,
    /// Out of service; new reservations are refused.
    Maintenance,
}

impl ResourceStatus {
    /// Returns the storage/display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Maintenance => "maintenance",
        }
    }

    /// Parses a status name (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error for unknown names.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s.trim().to_lowercase().as_str() {
            "available" => Ok(Self::Available),
            "maintenance" => Ok(Self::Maintenance),
            _ => Err(ValidationError {
                field: "status".into(),
                message: format!("invalid resource status '{s}': expected available or maintenance"),
            }),
        }
    }
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registration data for a new resource.
///
/// # Examples
///
/// ```
/// use labres::NewResource;
///
/// let spec = NewResource::new("ws-01")
///     .location("Room 204")
///     .specification("RTX 4090, 64 GB RAM");
/// assert_eq!(spec.label, "ws-01");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewResource {
    /// Human label, unique across resources.
    pub label: String,
    /// Where the machine is.
    pub location: Option<String>,
    /// Free-text hardware description.
    pub specification: Option<String>,
}

impl NewResource {
    /// Creates registration data with only a label.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            location: None,
            specification: None,
        }
    }

    /// Sets the location.
    #[must_use]
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Sets the hardware specification.
    #[must_use]
    pub fn specification(mut self, specification: impl Into<String>) -> Self {
        self.specification = Some(specification.into());
        self
    }
}

/// A bookable resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    id: ResourceId,
    label: String,
    location: Option<String>,
    specification: Option<String>,
    status: ResourceStatus,
    created_at: SystemTime,
    updated_at: SystemTime,
}

impl Resource {
    /// Creates a new resource builder.
    #[must_use]
    pub fn builder(id: ResourceId, label: impl AsRef<str>) -> ResourceBuilder {
        ResourceBuilder {
            id,
            label: label.as_ref().trim().to_string(),
            location: None,
            specification: None,
            status: ResourceStatus::Available,
            created_at: None,
            updated_at: None,
        }
    }

    /// Returns the resource id.
    #[must_use]
    pub const fn id(&self) -> ResourceId {
        self.id
    }

    /// Returns the label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the location.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Returns the hardware specification.
    #[must_use]
    pub fn specification(&self) -> Option<&str> {
        self.specification.as_deref()
    }

    /// Returns the operational status.
    #[must_use]
    pub const fn status(&self) -> ResourceStatus {
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

    /// Returns `true` if the resource is under maintenance.
    #[must_use]
    pub fn in_maintenance(&self) -> bool {
        self.status == ResourceStatus::Maintenance
    }
}

/// Builder for creating `Resource` instances.
#[derive(Debug)]
pub struct ResourceBuilder {
    id: ResourceId,
    label: String,
    location: Option<String>,
    specification: Option<String>,
    status: ResourceStatus,
    created_at: Option<SystemTime>,
    updated_at: Option<SystemTime>,
}

impl ResourceBuilder {
    /// Sets the location. Blank values are dropped.
    #[must_use]
    pub fn location(mut self, location: Option<String>) -> Self {
        self.location = non_blank(location);
        self
    }

    /// Sets the hardware specification. Blank values are dropped.
    #[must_use]
    pub fn specification(mut self, specification: Option<String>) -> Self {
        self.specification = non_blank(specification);
        self
    }

    /// Sets the operational status.
    #[must_use]
    pub const fn status(mut self, status: ResourceStatus) -> Self {
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

    /// Builds the resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the label is empty after trimming.
    pub fn build(self) -> Result<Resource, ValidationError> {
        if self.label.is_empty() {
            return Err(ValidationError {
                field: "label".into(),
                message: "label must be non-empty after trimming whitespace".into(),
            });
        }

        let now = SystemTime::now();
        let created_at = self.created_at.unwrap_or(now);
        Ok(Resource {
            id: self.id,
            label: self.label,
            location: self.location,
            specification: self.specification,
            status: self.status,
            created_at,
            updated_at: self.updated_at.unwrap_or(created_at),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
