//! Database schema definitions and SQL constants.
//!
//! This module contains all SQL table definitions, indices, and constants
//! related to the database schema for the labres reservation system.
//!
//! Dates are stored as `YYYY-MM-DD` text and clock times as `HH:MM` text, so
//! lexical comparison matches chronological order. Timestamps are Unix
//! seconds.

/// Current schema version for the database.
///
/// This version is stored in the metadata table and is used to ensure
/// compatibility between the database and the application.
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// SQL statement to create the metadata table.
pub const CREATE_METADATA_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS metadata (
        key TEXT PRIMARY KEY NOT NULL,
        value TEXT NOT NULL
    )";

/// SQL statement to create the resources table.
pub const CREATE_RESOURCES_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS resources (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        label TEXT NOT NULL UNIQUE,
        location TEXT,
        specification TEXT,
        status TEXT NOT NULL CHECK (status IN ('available', 'maintenance')),
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )";

/// SQL statement to create the reservations table.
///
/// Deleting a resource removes its (necessarily historical) reservations.
pub const CREATE_RESERVATIONS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS reservations (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        owner TEXT NOT NULL,
        resource_id INTEGER NOT NULL REFERENCES resources(id) ON DELETE CASCADE,
        start_date TEXT NOT NULL,
        end_date TEXT NOT NULL,
        start_time TEXT NOT NULL,
        end_time TEXT NOT NULL,
        reason TEXT NOT NULL,
        status TEXT NOT NULL CHECK (status IN ('pending', 'approved', 'rejected', 'cancelled')),
        metadata TEXT,
        decision_reason TEXT,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL,
        CHECK (start_date <= end_date),
        CHECK (start_time < end_time)
    )";

/// SQL statement to create the releases table.
pub const CREATE_RELEASES_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS releases (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        reservation_id INTEGER NOT NULL REFERENCES reservations(id) ON DELETE CASCADE,
        owner TEXT NOT NULL,
        resource_id INTEGER NOT NULL,
        reason TEXT NOT NULL,
        status TEXT NOT NULL CHECK (status IN ('active', 'partially_booked', 'cancelled')),
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )";

/// SQL statement to create the release dates table.
///
/// One row per original date; `reclaimed_by` is set once another
/// reservation takes the date.
pub const CREATE_RELEASE_DATES_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS release_dates (
        release_id INTEGER NOT NULL REFERENCES releases(id) ON DELETE CASCADE,
        date TEXT NOT NULL,
        reclaimed_by INTEGER,
        PRIMARY KEY (release_id, date)
    )";

/// SQL statement to create the notification outbox.
pub const CREATE_NOTIFICATIONS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS notifications (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        kind TEXT NOT NULL,
        user_id TEXT NOT NULL,
        reservation_id INTEGER,
        release_id INTEGER,
        message TEXT NOT NULL,
        created_at INTEGER NOT NULL,
        delivered INTEGER NOT NULL DEFAULT 0
    )";

/// Index for the per-resource overlap query.
pub const CREATE_RESERVATION_RESOURCE_INDEX: &str = r"
    CREATE INDEX IF NOT EXISTS idx_reservations_resource
    ON reservations(resource_id, status, start_date, end_date)";

/// Index for per-user listings.
pub const CREATE_RESERVATION_OWNER_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_reservations_owner ON reservations(owner)";

/// Index for releases of a reservation.
pub const CREATE_RELEASE_RESERVATION_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_releases_reservation ON releases(reservation_id)";

/// Index for releases on a resource.
pub const CREATE_RELEASE_RESOURCE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_releases_resource ON releases(resource_id, status)";

/// Index for the undelivered outbox scan.
pub const CREATE_NOTIFICATION_DELIVERED_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_notifications_delivered ON notifications(delivered, id)";

/// SQL statement to select the schema version from the metadata table.
pub const SELECT_SCHEMA_VERSION: &str = "SELECT value FROM metadata WHERE key = 'schema_version'";

/// SQL statement to insert or update the schema version in the metadata table.
pub const INSERT_SCHEMA_VERSION: &str =
    "INSERT OR REPLACE INTO metadata (key, value) VALUES ('schema_version', ?)";

/// SQL statement to insert a resource with a pre-allocated id.
pub const INSERT_RESOURCE: &str = r"
    INSERT INTO resources
    (id, label, location, specification, status, created_at, updated_at)
    VALUES (?, ?, ?, ?, ?, ?, ?)
";

/// SQL statement to insert a reservation with a pre-allocated id.
pub const INSERT_RESERVATION: &str = r"
    INSERT INTO reservations
    (id, owner, resource_id, start_date, end_date, start_time, end_time,
     reason, status, metadata, decision_reason, created_at, updated_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
";

/// SQL statement to insert a release with a pre-allocated id.
pub const INSERT_RELEASE: &str = r"
    INSERT INTO releases
    (id, reservation_id, owner, resource_id, reason, status, created_at, updated_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?)
";

/// SQL statement to insert one original release date.
pub const INSERT_RELEASE_DATE: &str = r"
    INSERT INTO release_dates (release_id, date, reclaimed_by)
    VALUES (?, ?, ?)
";

/// SQL statement to append an event to the outbox.
pub const INSERT_NOTIFICATION: &str = r"
    INSERT INTO notifications
    (kind, user_id, reservation_id, release_id, message, created_at)
    VALUES (?, ?, ?, ?, ?, ?)
";
