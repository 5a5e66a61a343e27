//! Integration tests for the configuration system.
//!
//! These tests cover file discovery in the data directory, explicit config
//! files, `LABRES_*` environment overrides, validation, and an engine built
//! from the resulting configuration.
//!
//! Tests that modify environment variables are marked with `#[serial]`;
//! environment variables are process-global, so they must not run
//! concurrently with each other.

mod common;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Weekday;
use common::{dates, june, start_time, user, window};
use labres::config::{ClosedDayScope, Config, ConfigBuilder, OutputFormat};
use labres::database::DatabaseConfig;
use labres::error::Error;
use labres::{
    Database, Engine, ExtendRequest, FixedClock, NewResource, ReservationRequest,
};
use serial_test::serial;
use tempfile::TempDir;

// ============================================================================
// Test Utilities
// ============================================================================

fn create_temp_config(dir: &Path, filename: &str, content: &str) -> PathBuf {
    let path = dir.join(filename);
    fs::write(&path, content).unwrap();
    path
}

/// RAII guard for setting and restoring environment variables.
struct EnvGuard {
    key: String,
    old_value: Option<String>,
}

impl EnvGuard {
    fn new(key: &str, value: &str) -> Self {
        let old_value = env::var(key).ok();
        env::set_var(key, value);
        Self {
            key: key.to_string(),
            old_value,
        }
    }

    fn remove(key: &str) -> Self {
        let old_value = env::var(key).ok();
        env::remove_var(key);
        Self {
            key: key.to_string(),
            old_value,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match &self.old_value {
            Some(value) => env::set_var(&self.key, value),
            None => env::remove_var(&self.key),
        }
    }
}

fn field_of(err: &Error) -> &str {
    match err {
        Error::Validation { field, .. } => field,
        other => panic!("expected validation error, got {other:?}"),
    }
}

fn engine_for(dir: &Path, config: &Config) -> Engine {
    let db = Database::open(DatabaseConfig::in_data_dir(dir)).unwrap();
    Engine::from_config(db, config)
        .unwrap()
        .with_clock(FixedClock::new(start_time()))
        .without_emitter()
}

// ============================================================================
// File discovery
// ============================================================================

#[test]
fn test_user_config_in_data_dir() {
    let dir = TempDir::new().unwrap();
    create_temp_config(
        dir.path(),
        "config.yaml",
        "policy:\n  closed_weekdays: [sat, sun]\n  max_span_days: 10\noutput_format: json\n",
    );

    let config = ConfigBuilder::new()
        .with_data_dir(dir.path())
        .skip_env()
        .build()
        .unwrap();

    let policy = config.policy.unwrap();
    assert_eq!(policy.closed_weekdays, Some(vec![Weekday::Sat, Weekday::Sun]));
    assert_eq!(policy.max_span_days, Some(10));
    // Untouched fields keep their defaults
    assert_eq!(policy.closed_day_scope, Some(ClosedDayScope::EveryDate));
    assert_eq!(config.output_format, Some(OutputFormat::Json));
    assert_eq!(config.maximum_lock_wait_seconds, Some(5));
}

#[test]
fn test_missing_user_config_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let config = ConfigBuilder::new()
        .with_data_dir(dir.path())
        .skip_env()
        .build()
        .unwrap();
    assert_eq!(config, Config::with_defaults());
}

#[test]
fn test_explicit_file_overrides_user_config() {
    let dir = TempDir::new().unwrap();
    create_temp_config(dir.path(), "config.yaml", "maximum_lock_wait_seconds: 9\n");
    let extra = create_temp_config(
        dir.path(),
        "override.yaml",
        "maximum_lock_wait_seconds: 30\navailability:\n  day_start: \"07:00\"\n",
    );

    let config = ConfigBuilder::new()
        .with_data_dir(dir.path())
        .with_config_file(&extra)
        .skip_env()
        .build()
        .unwrap();

    assert_eq!(config.maximum_lock_wait_seconds, Some(30));
    let availability = config.availability.unwrap();
    assert_eq!(availability.day_start.as_deref(), Some("07:00"));
    assert_eq!(availability.day_end.as_deref(), Some("22:00"));
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let result = ConfigBuilder::new()
        .with_data_dir(dir.path())
        .with_config_file(dir.path().join("absent.yaml"))
        .skip_env()
        .build();
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn test_unknown_field_rejected() {
    let dir = TempDir::new().unwrap();
    create_temp_config(dir.path(), "config.yaml", "seats:\n  count: 4\n");

    let result = ConfigBuilder::new()
        .with_data_dir(dir.path())
        .skip_env()
        .build();
    assert!(matches!(result, Err(Error::Configuration(_))));
}

#[test]
fn test_inverted_hours_rejected() {
    let dir = TempDir::new().unwrap();
    create_temp_config(
        dir.path(),
        "config.yaml",
        "availability:\n  day_start: \"20:00\"\n  day_end: \"08:00\"\n",
    );

    let err = ConfigBuilder::new()
        .with_data_dir(dir.path())
        .skip_env()
        .build()
        .unwrap_err();
    assert_eq!(field_of(&err), "availability.day_end");
}

// ============================================================================
// Environment overrides
// ============================================================================

#[test]
#[serial]
fn test_env_overrides_file() {
    let dir = TempDir::new().unwrap();
    create_temp_config(dir.path(), "config.yaml", "policy:\n  max_span_days: 10\n");

    let _span = EnvGuard::new("LABRES_MAX_SPAN_DAYS", "3");
    let _closed = EnvGuard::new("LABRES_CLOSED_WEEKDAYS", "sun");
    let _format = EnvGuard::new("LABRES_OUTPUT_FORMAT", "csv");

    let config = ConfigBuilder::new()
        .with_data_dir(dir.path())
        .build()
        .unwrap();

    let policy = config.policy.unwrap();
    assert_eq!(policy.max_span_days, Some(3));
    assert_eq!(policy.closed_weekdays, Some(vec![Weekday::Sun]));
    assert_eq!(config.output_format, Some(OutputFormat::Csv));
}

#[test]
#[serial]
fn test_invalid_env_value() {
    let dir = TempDir::new().unwrap();
    let _lock = EnvGuard::new("LABRES_MAXIMUM_LOCK_WAIT_SECONDS", "soon");

    let err = ConfigBuilder::new()
        .with_data_dir(dir.path())
        .build()
        .unwrap_err();
    assert_eq!(field_of(&err), "LABRES_MAXIMUM_LOCK_WAIT_SECONDS");
}

#[test]
#[serial]
fn test_programmatic_override_beats_env() {
    let dir = TempDir::new().unwrap();
    let _lock = EnvGuard::new("LABRES_MAXIMUM_LOCK_WAIT_SECONDS", "12");
    let _span = EnvGuard::remove("LABRES_MAX_SPAN_DAYS");

    let config = ConfigBuilder::new()
        .with_data_dir(dir.path())
        .with_config(Config {
            maximum_lock_wait_seconds: Some(2),
            ..Default::default()
        })
        .build()
        .unwrap();
    assert_eq!(config.maximum_lock_wait_seconds, Some(2));
}

// ============================================================================
// Engine built from configuration
// ============================================================================

/// June 2, 2024 is a Sunday.
#[test]
fn test_engine_applies_closed_weekdays() {
    let dir = TempDir::new().unwrap();
    create_temp_config(dir.path(), "config.yaml", "policy:\n  closed_weekdays: [sun]\n");
    let config = ConfigBuilder::new()
        .with_data_dir(dir.path())
        .skip_env()
        .build()
        .unwrap();

    let mut engine = engine_for(dir.path(), &config);
    let admin = labres::Actor::admin("carol").unwrap();
    let ws = engine
        .create_resource(&admin, NewResource::new("ws-01"))
        .unwrap()
        .value;

    let sunday = ReservationRequest::new(ws.id(), dates(2, 2), window((9, 0), (12, 0)), "demo");
    let err = engine
        .create_reservation(&user("alice"), sunday)
        .unwrap_err();
    assert_eq!(field_of(&err), "policy.closed_weekdays");

    let monday = ReservationRequest::new(ws.id(), dates(3, 3), window((9, 0), (12, 0)), "demo");
    engine.create_reservation(&user("alice"), monday).unwrap();
}

#[test]
fn test_engine_applies_span_limit_to_extensions() {
    let dir = TempDir::new().unwrap();
    create_temp_config(dir.path(), "config.yaml", "policy:\n  max_span_days: 3\n");
    let config = ConfigBuilder::new()
        .with_data_dir(dir.path())
        .skip_env()
        .build()
        .unwrap();

    let mut engine = engine_for(dir.path(), &config);
    let admin = labres::Actor::admin("carol").unwrap();
    let ws = engine
        .create_resource(&admin, NewResource::new("ws-01"))
        .unwrap()
        .value;
    let request = ReservationRequest::new(ws.id(), dates(3, 5), window((9, 0), (12, 0)), "demo");
    let r = engine
        .create_reservation(&user("alice"), request)
        .unwrap()
        .value;
    engine.approve_reservation(&admin, r.id()).unwrap();

    let longer = ExtendRequest {
        new_end_date: Some(june(6)),
        new_end_time: None,
    };
    let err = engine
        .extend_reservation(&admin, r.id(), longer)
        .unwrap_err();
    assert_eq!(field_of(&err), "policy.max_span_days");
}
