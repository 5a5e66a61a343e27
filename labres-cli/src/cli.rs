//! CLI structure and command definitions.
//!
//! This module defines the main CLI structure using clap's derive macros,
//! including global options and subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::commands::{
    ApproveCommand, CancelCommand, CancelReleaseCommand, CompletionsCommand, ExtendCommand,
    ListCommand, NotificationsCommand, RejectCommand, ReleaseCommand, ReleasesCommand,
    ReserveCommand, ResourceCommand, ShowDataDirCommand, ValidateCommand,
};
use crate::utils::GlobalOptions;

/// Command-line tool for reserving shared lab computers.
#[derive(Parser)]
#[command(name = "labres")]
#[command(version, about = "Reserve shared lab computers", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Override the data directory location
    #[arg(long, value_name = "PATH", global = true, env = "LABRES_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Override the default busy timeout (in seconds)
    #[arg(long, value_name = "SECONDS", global = true, env = "LABRES_BUSY_TIMEOUT")]
    pub busy_timeout: Option<u32>,

    /// Act as this user
    #[arg(long = "as", value_name = "USER", global = true, env = "LABRES_USER")]
    pub as_user: Option<String>,

    /// Role of the acting user
    #[arg(
        long,
        value_enum,
        global = true,
        env = "LABRES_ROLE",
        default_value = "user",
        ignore_case = true
    )]
    pub role: RoleArg,

    /// Act as an administrator (same as --role admin)
    #[arg(long, global = true)]
    pub admin: bool,

    /// Check and show what a command would change without committing it
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Role values accepted by `--role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RoleArg {
    /// A regular user
    User,
    /// An administrator
    Admin,
}

impl Cli {
    /// Collects the global options shared by every command.
    pub fn global_options(&self) -> GlobalOptions {
        GlobalOptions {
            verbose: self.verbose,
            quiet: self.quiet,
            data_dir: self.data_dir.clone(),
            busy_timeout: self.busy_timeout,
            user: self.as_user.clone(),
            admin: self.admin || self.role == RoleArg::Admin,
            dry_run: self.dry_run,
        }
    }
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Command {
    /// Manage lab resources
    Resource(ResourceCommand),

    /// Request a resource for a range of dates and a daily window
    Reserve(ReserveCommand),

    /// Approve a pending reservation (admin)
    Approve(ApproveCommand),

    /// Reject a pending reservation (admin)
    Reject(RejectCommand),

    /// Cancel your reservation, or revoke another user's (admin)
    Cancel(CancelCommand),

    /// Extend an approved reservation (admin)
    Extend(ExtendCommand),

    /// Give back dates of an approved reservation
    Release(ReleaseCommand),

    /// Withdraw a release
    CancelRelease(CancelReleaseCommand),

    /// List reservations
    List(ListCommand),

    /// List releases
    Releases(ReleasesCommand),

    /// Show or acknowledge notification events
    Notifications(NotificationsCommand),

    /// Show the resolved data directory path
    ShowDataDir(ShowDataDirCommand),

    /// Validate a configuration file
    Validate(ValidateCommand),

    /// Generate shell completion scripts
    Completions(CompletionsCommand),
}
