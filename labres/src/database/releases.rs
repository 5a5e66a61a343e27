//! Release storage: the release row plus one row per original date.

use std::time::SystemTime;

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};

use crate::actor::UserId;
use crate::error::Result;
use crate::release::{Release, ReleaseId, ReleaseStatus};
use crate::reservation::ReservationId;
use crate::resource::ResourceId;

use super::codec::{
    conversion_error, date_from_sql, date_to_sql, next_id, systemtime_to_unix_secs,
    unix_secs_to_systemtime, IdTable,
};
use super::connection::Database;
use super::schema::{INSERT_RELEASE, INSERT_RELEASE_DATE};

const RELEASE_COLUMNS: &str =
    "id, reservation_id, owner, resource_id, reason, status, created_at, updated_at";

/// Row data of a release before its dates are attached.
struct ReleaseRow {
    id: i64,
    reservation: i64,
    owner: String,
    resource: i64,
    reason: String,
    status: String,
    created_secs: i64,
    updated_secs: i64,
}

fn row_to_release_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ReleaseRow> {
    Ok(ReleaseRow {
        id: row.get(0)?,
        reservation: row.get(1)?,
        owner: row.get(2)?,
        resource: row.get(3)?,
        reason: row.get(4)?,
        status: row.get(5)?,
        created_secs: row.get(6)?,
        updated_secs: row.get(7)?,
    })
}

/// Loads the dates of a release row and assembles the release.
fn hydrate(conn: &Connection, row: ReleaseRow) -> Result<Release> {
    let mut stmt = conn.prepare_cached(
        "SELECT date, reclaimed_by FROM release_dates WHERE release_id = ? ORDER BY date",
    )?;
    let dates = stmt
        .query_map([row.id], |r| {
            let date: String = r.get(0)?;
            let reclaimed_by: Option<i64> = r.get(1)?;
            Ok((date_from_sql(&date)?, reclaimed_by.map(ReservationId::new)))
        })?
        .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;

    let owner = UserId::new(&row.owner).map_err(conversion_error)?;
    let status = ReleaseStatus::parse(&row.status).map_err(conversion_error)?;

    let mut builder = Release::builder(
        ReleaseId::new(row.id),
        ReservationId::new(row.reservation),
        owner,
        ResourceId::new(row.resource),
    )
    .dates(dates.iter().map(|(d, _)| *d))
    .reason(&row.reason)
    .status(status)
    .created_at(unix_secs_to_systemtime(row.created_secs))
    .updated_at(unix_secs_to_systemtime(row.updated_secs));

    for (date, by) in dates {
        if let Some(by) = by {
            builder = builder.reclaimed_date(date, by);
        }
    }

    Ok(builder.build()?)
}

fn query_releases(
    conn: &Connection,
    filter: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<Release>> {
    let sql = format!("SELECT {RELEASE_COLUMNS} FROM releases {filter}");
    let rows = {
        let mut stmt = conn.prepare_cached(&sql)?;
        let rows = stmt
            .query_map(params, row_to_release_row)?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
        rows
    };
    rows.into_iter().map(|row| hydrate(conn, row)).collect()
}

impl Database {
    /// Returns the id the next release will receive.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn next_release_id(conn: &Connection) -> Result<ReleaseId> {
        next_id(conn, IdTable::Releases).map(ReleaseId::new)
    }

    /// Inserts a release and its dates using its pre-allocated id.
    ///
    /// # Errors
    ///
    /// Returns an error if any insert fails.
    pub fn insert_release(conn: &Connection, release: &Release) -> Result<()> {
        conn.execute(
            INSERT_RELEASE,
            params![
                release.id().value(),
                release.reservation().value(),
                release.owner().as_str(),
                release.resource().value(),
                release.reason(),
                release.status().as_str(),
                systemtime_to_unix_secs(release.created_at())?,
                systemtime_to_unix_secs(release.updated_at())?,
            ],
        )?;

        let mut stmt = conn.prepare_cached(INSERT_RELEASE_DATE)?;
        for date in release.original_dates() {
            let reclaimed_by = release.reclaimed().get(date).map(|r| r.value());
            stmt.execute(params![release.id().value(), date_to_sql(*date), reclaimed_by])?;
        }
        Ok(())
    }

    /// Retrieves a release by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails (other than "not found").
    pub fn get_release(conn: &Connection, id: ReleaseId) -> Result<Option<Release>> {
        let sql = format!("SELECT {RELEASE_COLUMNS} FROM releases WHERE id = ?");
        let row = conn
            .query_row(&sql, [id.value()], row_to_release_row)
            .optional()?;
        row.map(|row| hydrate(conn, row)).transpose()
    }

    /// Lists the releases of a reservation, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_releases_for_reservation(
        conn: &Connection,
        reservation: ReservationId,
    ) -> Result<Vec<Release>> {
        query_releases(
            conn,
            "WHERE reservation_id = ? ORDER BY id",
            [reservation.value()],
        )
    }

    /// Lists the releases on a resource, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_releases_for_resource(
        conn: &Connection,
        resource: ResourceId,
    ) -> Result<Vec<Release>> {
        query_releases(conn, "WHERE resource_id = ? ORDER BY id", [resource.value()])
    }

    /// Sets the status of a release.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    ///
    /// # Returns
    ///
    /// `Ok(true)` if the release exists.
    pub fn update_release_status(
        conn: &Connection,
        id: ReleaseId,
        status: ReleaseStatus,
        updated_at: SystemTime,
    ) -> Result<bool> {
        let rows = conn.execute(
            "UPDATE releases SET status = ?, updated_at = ? WHERE id = ?",
            params![
                status.as_str(),
                systemtime_to_unix_secs(updated_at)?,
                id.value()
            ],
        )?;
        Ok(rows > 0)
    }

    /// Marks still-unreclaimed `dates` of a release as reclaimed by `by`.
    ///
    /// Dates already reclaimed keep their original reclaimer.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    ///
    /// # Returns
    ///
    /// The number of dates newly marked.
    pub fn mark_dates_reclaimed(
        conn: &Connection,
        release: ReleaseId,
        dates: &[NaiveDate],
        by: ReservationId,
    ) -> Result<usize> {
        let mut stmt = conn.prepare_cached(
            "UPDATE release_dates SET reclaimed_by = ? \
             WHERE release_id = ? AND date = ? AND reclaimed_by IS NULL",
        )?;
        let mut marked = 0;
        for date in dates {
            marked += stmt.execute(params![by.value(), release.value(), date_to_sql(*date)])?;
        }
        Ok(marked)
    }

    /// Moves the reclaim of `date` from reservation `from` to `to`, or
    /// clears it when `to` is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    ///
    /// # Returns
    ///
    /// `true` if `date` was reclaimed by `from`.
    pub fn transfer_reclaimed_date(
        conn: &Connection,
        release: ReleaseId,
        date: NaiveDate,
        from: ReservationId,
        to: Option<ReservationId>,
    ) -> Result<bool> {
        let rows = conn.execute(
            "UPDATE release_dates SET reclaimed_by = ? \
             WHERE release_id = ? AND date = ? AND reclaimed_by = ?",
            params![
                to.map(ReservationId::value),
                release.value(),
                date_to_sql(date),
                from.value()
            ],
        )?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_util::{
        create_test_database, date, insert_test_reservation, insert_test_resource,
    };
    use crate::reservation::ReservationStatus;

    fn insert_release(conn: &Connection, parent: &crate::Reservation, days: &[u32]) -> Release {
        let release = Release::builder(
            Database::next_release_id(conn).unwrap(),
            parent.id(),
            parent.owner().clone(),
            parent.resource(),
        )
        .dates(days.iter().map(|d| date(*d)))
        .reason("away")
        .build()
        .unwrap();
        Database::insert_release(conn, &release).unwrap();
        release
    }

    #[test]
    fn test_insert_and_get_release() {
        let db = create_test_database();
        let conn = db.connection();
        let ws = insert_test_resource(conn, "ws-01");
        let parent = insert_test_reservation(
            conn,
            ws.id(),
            "alice",
            (1, 3),
            (9, 12),
            ReservationStatus::Approved,
        );

        let release = insert_release(conn, &parent, &[2, 3]);
        let loaded = Database::get_release(conn, release.id()).unwrap().unwrap();
        assert_eq!(loaded.original_dates(), release.original_dates());
        assert_eq!(loaded.owner().as_str(), "alice");
        assert_eq!(loaded.reason(), "away");
        assert_eq!(loaded.status(), ReleaseStatus::Active);
        assert_eq!(loaded.active_dates().len(), 2);
    }

    #[test]
    fn test_mark_dates_reclaimed() {
        let db = create_test_database();
        let conn = db.connection();
        let ws = insert_test_resource(conn, "ws-01");
        let parent = insert_test_reservation(
            conn,
            ws.id(),
            "alice",
            (1, 3),
            (9, 12),
            ReservationStatus::Approved,
        );
        let release = insert_release(conn, &parent, &[2, 3]);

        let marked = Database::mark_dates_reclaimed(
            conn,
            release.id(),
            &[date(2)],
            ReservationId::new(50),
        )
        .unwrap();
        assert_eq!(marked, 1);

        // already reclaimed dates keep their reclaimer
        let marked = Database::mark_dates_reclaimed(
            conn,
            release.id(),
            &[date(2), date(3)],
            ReservationId::new(51),
        )
        .unwrap();
        assert_eq!(marked, 1);

        let loaded = Database::get_release(conn, release.id()).unwrap().unwrap();
        assert_eq!(loaded.reclaimed().get(&date(2)), Some(&ReservationId::new(50)));
        assert_eq!(loaded.reclaimed().get(&date(3)), Some(&ReservationId::new(51)));
        assert!(loaded.active_dates().is_empty());
    }

    #[test]
    fn test_list_releases_and_status() {
        let db = create_test_database();
        let conn = db.connection();
        let ws = insert_test_resource(conn, "ws-01");
        let parent = insert_test_reservation(
            conn,
            ws.id(),
            "alice",
            (1, 5),
            (9, 12),
            ReservationStatus::Approved,
        );
        let first = insert_release(conn, &parent, &[2]);
        insert_release(conn, &parent, &[4]);

        assert_eq!(
            Database::list_releases_for_reservation(conn, parent.id())
                .unwrap()
                .len(),
            2
        );
        assert_eq!(
            Database::list_releases_for_resource(conn, ws.id())
                .unwrap()
                .len(),
            2
        );

        Database::update_release_status(
            conn,
            first.id(),
            ReleaseStatus::Cancelled,
            SystemTime::now(),
        )
        .unwrap();
        let loaded = Database::get_release(conn, first.id()).unwrap().unwrap();
        assert_eq!(loaded.status(), ReleaseStatus::Cancelled);
    }
}
