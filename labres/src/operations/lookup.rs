//! Loading entities by id inside a plan, mapping absence to `NotFound`.

use rusqlite::Connection;

use crate::database::Database;
use crate::error::{Error, Result};
use crate::release::{Release, ReleaseId};
use crate::reservation::{Reservation, ReservationId};
use crate::resource::{Resource, ResourceId};

pub(crate) fn resource(conn: &Connection, id: ResourceId) -> Result<Resource> {
    Database::get_resource(conn, id)?.ok_or_else(|| Error::not_found(format!("resource {id}")))
}

pub(crate) fn reservation(conn: &Connection, id: ReservationId) -> Result<Reservation> {
    Database::get_reservation(conn, id)?
        .ok_or_else(|| Error::not_found(format!("reservation {id}")))
}

pub(crate) fn release(conn: &Connection, id: ReleaseId) -> Result<Release> {
    Database::get_release(conn, id)?.ok_or_else(|| Error::not_found(format!("release {id}")))
}

/// Trims a free-text reason, treating blank as absent.
pub(crate) fn clean_reason(reason: Option<&str>) -> Option<String> {
    reason
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
}
