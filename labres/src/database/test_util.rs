//! Shared test utilities for database unit tests.
//!
//! This module provides helper functions used across multiple database test modules.

use std::time::{Duration, SystemTime};

use chrono::{NaiveDate, NaiveTime};
use rusqlite::Connection;
use tempfile::tempdir;

use crate::actor::UserId;
use crate::database::{Database, DatabaseConfig};
use crate::reservation::{Reservation, ReservationStatus};
use crate::resource::{Resource, ResourceId};
use crate::schedule::{DateRange, TimeWindow};

/// A whole-second timestamp, so stored rows compare equal after a round trip.
pub fn test_timestamp() -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(1_717_200_000)
}

/// Creates a temporary test database that will be cleaned up automatically.
///
/// # Panics
///
/// Panics if the temporary directory or database cannot be created.
/// This is acceptable in test code where we want to fail fast.
#[must_use]
pub fn create_test_database() -> Database {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.db");
    let config = DatabaseConfig::new(path);
    let db = Database::open(config).unwrap();

    // Prevent the TempDir from being dropped immediately
    std::mem::forget(dir);

    db
}

/// Returns the given day of June 2024.
#[must_use]
pub fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
}

/// Registers an available resource with the given label.
///
/// # Panics
///
/// Panics if the insert fails.
pub fn insert_test_resource(conn: &Connection, label: &str) -> Resource {
    let resource = Resource::builder(Database::next_resource_id(conn).unwrap(), label)
        .created_at(test_timestamp())
        .build()
        .unwrap();
    Database::insert_resource(conn, &resource).unwrap();
    resource
}

/// Inserts a reservation over June `days` with a daily window of whole
/// `hours`, in the given stored status.
///
/// # Panics
///
/// Panics if the values are invalid or the insert fails.
pub fn insert_test_reservation(
    conn: &Connection,
    resource: ResourceId,
    owner: &str,
    days: (u32, u32),
    hours: (u32, u32),
    status: ReservationStatus,
) -> Reservation {
    let reservation = Reservation::builder(
        Database::next_reservation_id(conn).unwrap(),
        UserId::new(owner).unwrap(),
        resource,
        DateRange::new(date(days.0), date(days.1)).unwrap(),
        TimeWindow::new(
            NaiveTime::from_hms_opt(hours.0, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(hours.1, 0, 0).unwrap(),
        )
        .unwrap(),
    )
    .reason("test run")
    .status(status)
    .created_at(test_timestamp())
    .build()
    .unwrap();
    Database::insert_reservation(conn, &reservation).unwrap();
    reservation
}

/// Lab-local "now" used by planner tests: 2024-06-01 07:00, before every
/// test window.
#[must_use]
pub fn test_now() -> chrono::NaiveDateTime {
    date(1).and_hms_opt(7, 0, 0).unwrap()
}

/// Builds a planning context over `conn` at [`test_now`].
#[must_use]
pub fn plan_context<'a>(
    conn: &'a Connection,
    actor: &'a crate::actor::Actor,
) -> crate::operations::PlanContext<'a> {
    crate::operations::PlanContext {
        conn,
        actor,
        now: test_now(),
        timestamp: test_timestamp(),
    }
}
