//! Library exports for labres-cli.
//!
//! This module exports the CLI structure for the binary and for tests.

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;
pub mod utils;
pub mod views;

pub use cli::Cli;
