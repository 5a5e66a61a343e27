//! Resource registry storage.

use std::time::SystemTime;

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;
use crate::resource::{Resource, ResourceId, ResourceStatus};

use super::codec::{
    conversion_error, next_id, systemtime_to_unix_secs, unix_secs_to_systemtime, IdTable,
};
use super::connection::Database;
use super::schema::INSERT_RESOURCE;

const RESOURCE_COLUMNS: &str =
    "id, label, location, specification, status, created_at, updated_at";

/// Deserializes a resource from a row selected with `RESOURCE_COLUMNS`.
fn row_to_resource(row: &rusqlite::Row<'_>) -> rusqlite::Result<Resource> {
    let id: i64 = row.get(0)?;
    let label: String = row.get(1)?;
    let location: Option<String> = row.get(2)?;
    let specification: Option<String> = row.get(3)?;
    let status: String = row.get(4)?;
    let created_secs: i64 = row.get(5)?;
    let updated_secs: i64 = row.get(6)?;

    let status = ResourceStatus::parse(&status).map_err(conversion_error)?;

    Resource::builder(ResourceId::new(id), label)
        .location(location)
        .specification(specification)
        .status(status)
        .created_at(unix_secs_to_systemtime(created_secs))
        .updated_at(unix_secs_to_systemtime(updated_secs))
        .build()
        .map_err(conversion_error)
}

impl Database {
    /// Returns the id the next registered resource will receive.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn next_resource_id(conn: &Connection) -> Result<ResourceId> {
        next_id(conn, IdTable::Resources).map(ResourceId::new)
    }

    /// Inserts a resource using its pre-allocated id.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails (including a duplicate label).
    pub fn insert_resource(conn: &Connection, resource: &Resource) -> Result<()> {
        conn.execute(
            INSERT_RESOURCE,
            params![
                resource.id().value(),
                resource.label(),
                resource.location(),
                resource.specification(),
                resource.status().as_str(),
                systemtime_to_unix_secs(resource.created_at())?,
                systemtime_to_unix_secs(resource.updated_at())?,
            ],
        )?;
        Ok(())
    }

    /// Retrieves a resource by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails (other than "not found").
    pub fn get_resource(conn: &Connection, id: ResourceId) -> Result<Option<Resource>> {
        let sql = format!("SELECT {RESOURCE_COLUMNS} FROM resources WHERE id = ?");
        Ok(conn
            .query_row(&sql, [id.value()], row_to_resource)
            .optional()?)
    }

    /// Retrieves a resource by its label.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails (other than "not found").
    pub fn get_resource_by_label(conn: &Connection, label: &str) -> Result<Option<Resource>> {
        let sql = format!("SELECT {RESOURCE_COLUMNS} FROM resources WHERE label = ?");
        Ok(conn
            .query_row(&sql, [label.trim()], row_to_resource)
            .optional()?)
    }

    /// Lists all resources ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_resources(conn: &Connection) -> Result<Vec<Resource>> {
        let sql = format!("SELECT {RESOURCE_COLUMNS} FROM resources ORDER BY id");
        let mut stmt = conn.prepare(&sql)?;
        let resources = stmt
            .query_map([], row_to_resource)?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
        Ok(resources)
    }

    /// Sets the operational status of a resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    ///
    /// # Returns
    ///
    /// `Ok(true)` if the resource exists.
    pub fn update_resource_status(
        conn: &Connection,
        id: ResourceId,
        status: ResourceStatus,
        updated_at: SystemTime,
    ) -> Result<bool> {
        let rows = conn.execute(
            "UPDATE resources SET status = ?, updated_at = ? WHERE id = ?",
            params![
                status.as_str(),
                systemtime_to_unix_secs(updated_at)?,
                id.value()
            ],
        )?;
        Ok(rows > 0)
    }

    /// Deletes a resource together with its reservation history.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    ///
    /// # Returns
    ///
    /// `Ok(true)` if the resource existed.
    pub fn delete_resource(conn: &Connection, id: ResourceId) -> Result<bool> {
        let rows = conn.execute("DELETE FROM resources WHERE id = ?", [id.value()])?;
        Ok(rows > 0)
    }
}
