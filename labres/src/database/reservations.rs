//! Database CRUD operations for reservations.
//!
//! This module implements create, read and update operations for
//! reservations, plus the per-resource range-overlap query the conflict
//! checker relies on. Reservations are never deleted individually.

use std::time::SystemTime;

use chrono::{NaiveDate, NaiveTime};
use rusqlite::{params, Connection, OptionalExtension};

use crate::actor::UserId;
use crate::error::Result;
use crate::reservation::{Reservation, ReservationId, ReservationStatus};
use crate::resource::ResourceId;
use crate::schedule::{DateRange, TimeWindow};

use super::codec::{
    conversion_error, date_from_sql, date_to_sql, next_id, systemtime_to_unix_secs,
    time_from_sql, time_to_sql, unix_secs_to_systemtime, IdTable,
};
use super::connection::Database;
use super::schema::INSERT_RESERVATION;

const RESERVATION_COLUMNS: &str = "id, owner, resource_id, start_date, end_date, start_time, \
     end_time, reason, status, metadata, decision_reason, created_at, updated_at";

/// Helper function to deserialize a reservation from a database row.
///
/// Expects row fields in `RESERVATION_COLUMNS` order.
fn row_to_reservation(row: &rusqlite::Row<'_>) -> rusqlite::Result<Reservation> {
    let id: i64 = row.get(0)?;
    let owner: String = row.get(1)?;
    let resource: i64 = row.get(2)?;
    let start_date: String = row.get(3)?;
    let end_date: String = row.get(4)?;
    let start_time: String = row.get(5)?;
    let end_time: String = row.get(6)?;
    let reason: String = row.get(7)?;
    let status: String = row.get(8)?;
    let metadata: Option<String> = row.get(9)?;
    let decision_reason: Option<String> = row.get(10)?;
    let created_secs: i64 = row.get(11)?;
    let updated_secs: i64 = row.get(12)?;

    let owner = UserId::new(owner).map_err(conversion_error)?;
    let dates = DateRange::new(date_from_sql(&start_date)?, date_from_sql(&end_date)?)
        .map_err(conversion_error)?;
    let window = TimeWindow::new(time_from_sql(&start_time)?, time_from_sql(&end_time)?)
        .map_err(conversion_error)?;
    let status = ReservationStatus::parse(&status).map_err(conversion_error)?;
    let metadata = metadata
        .map(|m| serde_json::from_str::<serde_json::Value>(&m))
        .transpose()
        .map_err(conversion_error)?;

    Reservation::builder(
        ReservationId::new(id),
        owner,
        ResourceId::new(resource),
        dates,
        window,
    )
    .reason(reason)
    .status(status)
    .metadata(metadata)
    .decision_reason(decision_reason)
    .created_at(unix_secs_to_systemtime(created_secs))
    .updated_at(unix_secs_to_systemtime(updated_secs))
    .build()
    .map_err(conversion_error)
}

fn query_reservations(
    conn: &Connection,
    filter: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<Reservation>> {
    let sql = format!("SELECT {RESERVATION_COLUMNS} FROM reservations {filter}");
    let mut stmt = conn.prepare_cached(&sql)?;
    let reservations = stmt
        .query_map(params, row_to_reservation)?
        .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
    Ok(reservations)
}

impl Database {
    /// Returns the id the next reservation will receive.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn next_reservation_id(conn: &Connection) -> Result<ReservationId> {
        next_id(conn, IdTable::Reservations).map(ReservationId::new)
    }

    /// Inserts a reservation using its pre-allocated id.
    ///
    /// This method is intended for use within an existing transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn insert_reservation(conn: &Connection, reservation: &Reservation) -> Result<()> {
        let metadata = reservation
            .metadata()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| crate::Error::validation("metadata", e.to_string()))?;

        conn.execute(
            INSERT_RESERVATION,
            params![
                reservation.id().value(),
                reservation.owner().as_str(),
                reservation.resource().value(),
                date_to_sql(reservation.dates().start()),
                date_to_sql(reservation.dates().end()),
                time_to_sql(reservation.window().start()),
                time_to_sql(reservation.window().end()),
                reservation.reason(),
                reservation.status().as_str(),
                metadata,
                reservation.decision_reason(),
                systemtime_to_unix_secs(reservation.created_at())?,
                systemtime_to_unix_secs(reservation.updated_at())?,
            ],
        )?;
        Ok(())
    }

    /// Retrieves a reservation by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails (other than "not found").
    ///
    /// # Returns
    ///
    /// - `Ok(Some(reservation))` if the reservation exists
    /// - `Ok(None)` if the reservation doesn't exist
    pub fn get_reservation(conn: &Connection, id: ReservationId) -> Result<Option<Reservation>> {
        let sql = format!("SELECT {RESERVATION_COLUMNS} FROM reservations WHERE id = ?");
        Ok(conn
            .query_row(&sql, [id.value()], row_to_reservation)
            .optional()?)
    }

    /// Lists every reservation, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_all_reservations(conn: &Connection) -> Result<Vec<Reservation>> {
        query_reservations(conn, "ORDER BY id", [])
    }

    /// Lists the reservations owned by `owner`, by start date.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_reservations_for_user(
        conn: &Connection,
        owner: &UserId,
    ) -> Result<Vec<Reservation>> {
        query_reservations(
            conn,
            "WHERE owner = ? ORDER BY start_date, start_time, id",
            [owner.as_str()],
        )
    }

    /// Lists the reservations on `resource`, by start date.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_reservations_for_resource(
        conn: &Connection,
        resource: ResourceId,
    ) -> Result<Vec<Reservation>> {
        query_reservations(
            conn,
            "WHERE resource_id = ? ORDER BY start_date, start_time, id",
            [resource.value()],
        )
    }

    /// Finds approved reservations on `resource` whose date range intersects
    /// `dates`, lowest id first.
    ///
    /// Windows and releases are not considered here; the conflict checker
    /// refines the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_approved_overlapping(
        conn: &Connection,
        resource: ResourceId,
        dates: &DateRange,
    ) -> Result<Vec<Reservation>> {
        query_reservations(
            conn,
            "WHERE resource_id = ? AND status = 'approved' \
             AND start_date <= ? AND end_date >= ? ORDER BY id",
            params![
                resource.value(),
                date_to_sql(dates.end()),
                date_to_sql(dates.start())
            ],
        )
    }

    /// Sets the stored status and decision reason of a reservation.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    ///
    /// # Returns
    ///
    /// `Ok(true)` if the reservation exists.
    pub fn update_reservation_status(
        conn: &Connection,
        id: ReservationId,
        status: ReservationStatus,
        decision_reason: Option<&str>,
        updated_at: SystemTime,
    ) -> Result<bool> {
        let rows = conn.execute(
            "UPDATE reservations SET status = ?, decision_reason = ?, updated_at = ? WHERE id = ?",
            params![
                status.as_str(),
                decision_reason,
                systemtime_to_unix_secs(updated_at)?,
                id.value()
            ],
        )?;
        Ok(rows > 0)
    }

    /// Moves the end date and daily end time of a reservation.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    ///
    /// # Returns
    ///
    /// `Ok(true)` if the reservation exists.
    pub fn update_reservation_end(
        conn: &Connection,
        id: ReservationId,
        end_date: NaiveDate,
        end_time: NaiveTime,
        updated_at: SystemTime,
    ) -> Result<bool> {
        let rows = conn.execute(
            "UPDATE reservations SET end_date = ?, end_time = ?, updated_at = ? WHERE id = ?",
            params![
                date_to_sql(end_date),
                time_to_sql(end_time),
                systemtime_to_unix_secs(updated_at)?,
                id.value()
            ],
        )?;
        Ok(rows > 0)
    }
}
