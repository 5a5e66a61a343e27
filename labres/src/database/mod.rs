//! Database layer for persistent storage of the reservation ledger.
//!
//! This module provides a SQLite-based storage layer for resources,
//! reservations, releases and the notification outbox, including connection
//! management, schema versioning and per-table CRUD operations. Mutations
//! are expected to run inside [`Database::begin_transaction`].
//!
//! # Examples
//!
//! ```no_run
//! use labres::database::{Database, DatabaseConfig};
//!
//! let config = DatabaseConfig::new("/tmp/labres.db");
//! let db = Database::open(config).unwrap();
//!
//! for resource in Database::list_resources(db.connection()).unwrap() {
//!     println!("{}", resource.label());
//! }
//! ```

mod codec;
mod config;
mod connection;
pub mod migrations;
mod notifications;
mod releases;
mod reservations;
mod resources;
mod schema;

#[cfg(test)]
pub(crate) mod test_util;

// Re-export public API
pub use config::{
    default_data_dir, resolve_data_dir, resolve_database_path, DatabaseConfig, DATABASE_FILE,
    DATA_DIR_ENV,
};
pub use connection::Database;

// Re-export migration functions for advanced use cases
pub use migrations::{check_schema_compatibility, get_schema_version, initialize_schema};
