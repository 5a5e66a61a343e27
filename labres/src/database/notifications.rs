//! Notification outbox storage.

use rusqlite::{params, Connection};

use crate::actor::UserId;
use crate::error::Result;
use crate::notification::{NotificationDraft, NotificationEvent, NotificationId, NotificationKind};
use crate::release::ReleaseId;
use crate::reservation::ReservationId;

use super::codec::{conversion_error, systemtime_to_unix_secs, unix_secs_to_systemtime};
use super::connection::Database;
use super::schema::INSERT_NOTIFICATION;

const NOTIFICATION_COLUMNS: &str =
    "id, kind, user_id, reservation_id, release_id, message, created_at";

fn row_to_event(row: &rusqlite::Row<'_>) -> rusqlite::Result<NotificationEvent> {
    let id: i64 = row.get(0)?;
    let kind: String = row.get(1)?;
    let user: String = row.get(2)?;
    let reservation: Option<i64> = row.get(3)?;
    let release: Option<i64> = row.get(4)?;
    let message: String = row.get(5)?;
    let created_secs: i64 = row.get(6)?;

    Ok(NotificationEvent {
        id: NotificationId::new(id),
        kind: NotificationKind::parse(&kind).map_err(conversion_error)?,
        user: UserId::new(user).map_err(conversion_error)?,
        reservation: reservation.map(ReservationId::new),
        release: release.map(ReleaseId::new),
        message,
        created_at: unix_secs_to_systemtime(created_secs),
    })
}

impl Database {
    /// Appends an event to the outbox and returns it with its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn insert_notification(
        conn: &Connection,
        draft: NotificationDraft,
    ) -> Result<NotificationEvent> {
        conn.execute(
            INSERT_NOTIFICATION,
            params![
                draft.kind.as_str(),
                draft.user.as_str(),
                draft.reservation.map(ReservationId::value),
                draft.release.map(ReleaseId::value),
                draft.message,
                systemtime_to_unix_secs(draft.created_at)?,
            ],
        )?;
        let id = NotificationId::new(conn.last_insert_rowid());
        Ok(draft.into_event(id))
    }

    /// Lists undelivered events, oldest first, optionally for one user.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_undelivered_notifications(
        conn: &Connection,
        user: Option<&UserId>,
    ) -> Result<Vec<NotificationEvent>> {
        let sql = format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications \
             WHERE delivered = 0 AND (?1 IS NULL OR user_id = ?1) ORDER BY id"
        );
        let mut stmt = conn.prepare_cached(&sql)?;
        let events = stmt
            .query_map([user.map(UserId::as_str)], row_to_event)?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
        Ok(events)
    }

    /// Lists every event for a user, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_notifications_for_user(
        conn: &Connection,
        user: &UserId,
    ) -> Result<Vec<NotificationEvent>> {
        let sql =
            format!("SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE user_id = ? ORDER BY id");
        let mut stmt = conn.prepare_cached(&sql)?;
        let events = stmt
            .query_map([user.as_str()], row_to_event)?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
        Ok(events)
    }

    /// Marks an event as delivered.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    ///
    /// # Returns
    ///
    /// `Ok(true)` if the event exists.
    pub fn mark_notification_delivered(conn: &Connection, id: NotificationId) -> Result<bool> {
        let rows = conn.execute(
            "UPDATE notifications SET delivered = 1 WHERE id = ?",
            [id.value()],
        )?;
        Ok(rows > 0)
    }
}
