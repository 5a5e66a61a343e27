//! Main entry point for the labres CLI.
//!
//! This is the command-line interface for the lab reservation system. It
//! provides commands for managing resources and reservations:
//! - `resource`: Register and maintain lab computers
//! - `reserve`: Request a computer
//! - `approve` / `reject` / `cancel` / `extend`: Manage requests
//! - `release` / `cancel-release`: Give back dates
//! - `list` / `releases` / `notifications`: Inspect the ledger

use clap::Parser;
use labres_cli::cli::{Cli, Command};

fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    labres::init_logger(cli.verbose, cli.quiet).install();

    let global = cli.global_options();

    // Execute the command
    let result = match cli.command {
        Command::Resource(cmd) => cmd.execute(&global),
        Command::Reserve(cmd) => cmd.execute(&global),
        Command::Approve(cmd) => cmd.execute(&global),
        Command::Reject(cmd) => cmd.execute(&global),
        Command::Cancel(cmd) => cmd.execute(&global),
        Command::Extend(cmd) => cmd.execute(&global),
        Command::Release(cmd) => cmd.execute(&global),
        Command::CancelRelease(cmd) => cmd.execute(&global),
        Command::List(cmd) => cmd.execute(&global),
        Command::Releases(cmd) => cmd.execute(&global),
        Command::Notifications(cmd) => cmd.execute(&global),
        Command::ShowDataDir(cmd) => cmd.execute(&global),
        Command::Validate(cmd) => cmd.execute(&global),
        Command::Completions(cmd) => cmd.execute(&global),
    };

    // Handle errors and set exit code
    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
