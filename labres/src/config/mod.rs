//! Configuration system for labres.
//!
//! This module provides layered configuration with support for:
//! - YAML configuration files (the user config in the data directory and an
//!   optional explicit file)
//! - Environment variable overrides
//! - Programmatic configuration via builder pattern
//! - Validation of the merged result
//!
//! # Configuration Precedence
//!
//! Configuration is merged from multiple sources with the following precedence
//! (highest to lowest):
//!
//! 1. Programmatic overrides (via `ConfigBuilder::with_config`)
//! 2. Environment variables (`LABRES_*`)
//! 3. Explicit configuration file (`ConfigBuilder::with_config_file`)
//! 4. User config (`<data_dir>/config.yaml`)
//! 5. Built-in defaults
//!
//! # Examples
//!
//! ```no_run
//! use labres::config::ConfigBuilder;
//!
//! let config = ConfigBuilder::new()
//!     .with_data_dir("/srv/lab")
//!     .build()
//!     .unwrap();
//!
//! println!("lock wait: {:?}", config.maximum_lock_wait_seconds);
//! ```

pub mod builder;
pub mod environment;
pub mod loader;
pub mod merger;
pub mod schema;
pub mod validator;

// Re-export key types at module root
pub use builder::ConfigBuilder;
pub use environment::EnvironmentConfig;
pub use loader::{ConfigLoader, ConfigSource, CONFIG_FILE};
pub use merger::ConfigMerger;
pub use schema::{
    AvailabilityConfig, ClosedDayScope, Config, OutputFormat, PolicyConfig,
    DEFAULT_DAY_END, DEFAULT_DAY_START, DEFAULT_HORIZON_DAYS, DEFAULT_LOCK_WAIT_SECONDS,
    DEFAULT_MIN_SLOT_MINUTES,
};
pub use validator::ConfigValidator;
