#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # labres
//!
//! A library for reserving shared lab computers.
//!
//! Users request a resource for a range of dates and a daily time window;
//! administrators approve, reject, revoke or extend; owners may temporarily
//! give back some dates, which others can then book. Every decision is made
//! inside one `SQLite` write transaction, so two approved reservations never
//! overlap.
//!
//! ## Core Types
//!
//! - [`Engine`]: the entry point for every operation and query
//! - [`Actor`], [`UserId`] and [`Role`]: who is acting
//! - [`Resource`], [`Reservation`] and [`Release`]: the ledger entities
//! - [`DateRange`] and [`TimeWindow`]: when a reservation applies
//! - [`Error`] and [`Result`]: Error handling types
//! - [`Logger`] and [`LogLevel`]: Logging infrastructure
//!
//! ## Examples
//!
//! ```
//! use chrono::{NaiveDate, NaiveTime};
//! use labres::{DateRange, TimeWindow};
//!
//! let june = |d| NaiveDate::from_ymd_opt(2024, 6, d).unwrap();
//! let at = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap();
//!
//! let dates = DateRange::new(june(1), june(3)).unwrap();
//! let window = TimeWindow::new(at(9), at(12)).unwrap();
//! assert_eq!(dates.len_days(), 3);
//! assert_eq!(window.minutes(), 180);
//! ```

pub mod actor;
pub mod availability;
pub mod clock;
pub mod config;
pub mod conflict;
pub mod database;
pub mod engine;
pub mod error;
pub mod logging;
pub mod notification;
pub mod operations;
pub mod policy;
pub mod release;
pub mod reservation;
pub mod resource;
pub mod schedule;

// Re-export key types at crate root for convenience
pub use actor::{Actor, Role, UserId};
pub use availability::{AvailabilityStatus, AvailabilityWindow, ResourceAvailability};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{Config, ConfigBuilder};
pub use database::{Database, DatabaseConfig};
pub use engine::{Engine, Outcome};
pub use error::{Error, ErrorKind, Result};
pub use logging::{init_logger, LogLevel, Logger};
pub use notification::{
    NotificationEmitter, NotificationEvent, NotificationId, NotificationKind,
};
pub use release::{Release, ReleaseId, ReleaseRequest, ReleaseStatus};
pub use reservation::{
    ExtendRequest, Reservation, ReservationId, ReservationRequest, ReservationStatus,
};
pub use resource::{NewResource, Resource, ResourceId, ResourceStatus};
pub use schedule::{DateRange, TimeWindow};
