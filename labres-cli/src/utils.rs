//! Utility functions for CLI operations.
//!
//! This module provides common utility functions used across CLI commands,
//! including identity resolution, configuration loading, engine setup and
//! argument parsing.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{NaiveDate, NaiveTime};
use labres::database::{resolve_data_dir, DatabaseConfig};
use labres::schedule::{parse_date, parse_time};
use labres::{Actor, Config, ConfigBuilder, Database, Engine, Outcome, UserId};

use crate::error::CliError;

/// Global CLI options shared across all commands.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Enable verbose output.
    pub verbose: bool,

    /// Suppress non-essential output.
    pub quiet: bool,

    /// Override the data directory location.
    pub data_dir: Option<PathBuf>,

    /// Override the busy timeout (in seconds).
    pub busy_timeout: Option<u32>,

    /// The acting user id.
    pub user: Option<String>,

    /// Act with the administrator role.
    pub admin: bool,

    /// Plan and check mutations without committing them.
    pub dry_run: bool,
}

impl GlobalOptions {
    /// Resolves the data directory: `--data-dir`, then `LABRES_DATA_DIR`,
    /// then `~/.labres`.
    pub fn data_dir(&self) -> Result<PathBuf, CliError> {
        resolve_data_dir(self.data_dir.as_deref()).map_err(|e| CliError::Config(e.to_string()))
    }

    /// Returns the acting identity.
    pub fn actor(&self) -> Result<Actor, CliError> {
        let id = self.user.as_deref().ok_or_else(|| {
            CliError::InvalidArguments("no acting user: pass --as or set LABRES_USER".to_string())
        })?;
        let actor = if self.admin {
            Actor::admin(id)
        } else {
            Actor::user(id)
        };
        actor.map_err(|e| CliError::InvalidArguments(e.to_string()))
    }
}

/// Load hierarchical configuration.
///
/// Configuration is merged from multiple sources with precedence:
/// 1. Environment variables (highest priority)
/// 2. `<data_dir>/config.yaml`
/// 3. Built-in defaults (lowest priority)
pub fn load_configuration(global: &GlobalOptions) -> Result<Config, CliError> {
    ConfigBuilder::new()
        .with_data_dir(global.data_dir()?)
        .build()
        .map_err(|e| CliError::Config(e.to_string()))
}

/// Opens the database and builds an engine from the configuration.
///
/// Events stay in the outbox for `labres notifications`; the CLI does not
/// deliver them itself.
pub fn open_engine(global: &GlobalOptions, config: &Config) -> Result<Engine, CliError> {
    let mut db_config = DatabaseConfig::in_data_dir(global.data_dir()?);

    if let Some(timeout_seconds) = global.busy_timeout {
        db_config = db_config.with_busy_timeout(Duration::from_secs(timeout_seconds.into()));
    } else if let Some(timeout_seconds) = config.maximum_lock_wait_seconds {
        db_config = db_config.with_busy_timeout(Duration::from_secs(timeout_seconds));
    }

    log::debug!("opening database at {}", db_config.path.display());
    let db = Database::open(db_config)?;
    Ok(Engine::from_config(db, config)?
        .without_emitter()
        .dry_run(global.dry_run))
}

/// Parses a `YYYY-MM-DD` argument.
pub fn date_arg(value: &str, field: &str) -> Result<NaiveDate, CliError> {
    parse_date(value, field).map_err(|e| CliError::InvalidArguments(e.to_string()))
}

/// Parses an `HH:MM` argument.
pub fn time_arg(value: &str, field: &str) -> Result<NaiveTime, CliError> {
    parse_time(value, field).map_err(|e| CliError::InvalidArguments(e.to_string()))
}

/// Parses a user id argument.
pub fn user_arg(value: &str) -> Result<UserId, CliError> {
    UserId::new(value).map_err(|e| CliError::InvalidArguments(e.to_string()))
}

/// Reports a mutation on stderr: planned actions for a dry run, warnings
/// otherwise.
///
/// Returns `true` if the outcome was committed and the caller should print
/// its result.
pub fn report<T>(global: &GlobalOptions, outcome: &Outcome<T>) -> bool {
    if global.quiet {
        return outcome.committed;
    }

    if !outcome.committed {
        eprintln!("Dry run - would perform the following actions:");
        for (i, action) in outcome.actions.iter().enumerate() {
            eprintln!("  {}. {action}", i + 1);
        }
    }

    for warning in &outcome.warnings {
        eprintln!("Warning: {warning}");
    }

    outcome.committed
}

/// Format a timestamp for display.
pub fn format_timestamp(ts: std::time::SystemTime) -> String {
    use chrono::{DateTime, Utc};
    let dt: DateTime<Utc> = ts.into();
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp() {
        use std::time::UNIX_EPOCH;
        let st = UNIX_EPOCH + Duration::from_secs(1_705_323_045);
        assert_eq!(format_timestamp(st), "2024-01-15 12:50:45");
    }

    #[test]
    fn test_actor_requires_user() {
        let global = GlobalOptions::default();
        assert!(matches!(global.actor(), Err(CliError::InvalidArguments(_))));

        let global = GlobalOptions {
            user: Some("carol".into()),
            admin: true,
            ..Default::default()
        };
        let actor = global.actor().unwrap();
        assert!(actor.is_admin());
        assert_eq!(actor.id().as_str(), "carol");
    }

    #[test]
    fn test_date_and_time_args() {
        assert_eq!(
            date_arg("2024-06-01", "from").unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
        );
        assert!(matches!(
            date_arg("June 1", "from"),
            Err(CliError::InvalidArguments(_))
        ));
        assert_eq!(
            time_arg("09:30", "start").unwrap(),
            NaiveTime::from_hms_opt(9, 30, 0).unwrap()
        );
    }
}
