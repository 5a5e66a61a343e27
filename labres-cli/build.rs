//! Build script for labres-cli.
//!
//! This script generates the man page at build time using clap_mangen.
//! The generated man page is placed in OUT_DIR for inclusion in release builds.
//!
//! A build script cannot depend on the crate being built, so the command
//! outline is declared here again.

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::fs;
use std::path::PathBuf;

/// Build the CLI command outline for man page generation.
///
/// Keep this synchronized with src/cli.rs.
fn build_cli() -> Command {
    Command::new("labres")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Reserve shared lab computers")
        .long_about(
            "Command-line tool for requesting, approving and releasing reservations of shared lab computers",
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .help("Enable verbose output")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .help("Suppress non-essential output")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .help("Override the data directory location")
                .value_name("PATH")
                .global(true)
                .env("LABRES_DATA_DIR"),
        )
        .arg(
            Arg::new("busy-timeout")
                .long("busy-timeout")
                .help("Override the default busy timeout (in seconds)")
                .value_name("SECONDS")
                .global(true)
                .env("LABRES_BUSY_TIMEOUT"),
        )
        .arg(
            Arg::new("as")
                .long("as")
                .help("Act as this user")
                .value_name("USER")
                .global(true)
                .env("LABRES_USER"),
        )
        .arg(
            Arg::new("role")
                .long("role")
                .help("Role of the acting user (user or admin)")
                .value_name("ROLE")
                .global(true)
                .env("LABRES_ROLE"),
        )
        .arg(
            Arg::new("admin")
                .long("admin")
                .help("Act as an administrator")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("Check and show what a command would change without committing it")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .subcommands(vec![
            Command::new("resource")
                .about("Manage lab resources")
                .long_about("Register, remove, maintain and list lab resources"),
            Command::new("reserve")
                .about("Request a resource")
                .long_about("Request a resource for a range of dates and a daily time window"),
            Command::new("approve")
                .about("Approve a pending reservation")
                .long_about("Approve a pending reservation if it overlaps no approved one"),
            Command::new("reject")
                .about("Reject a pending reservation")
                .long_about("Reject a pending reservation with a reason"),
            Command::new("cancel")
                .about("Cancel or revoke a reservation")
                .long_about("Cancel your own reservation, or revoke another user's as an administrator"),
            Command::new("extend")
                .about("Extend an approved reservation")
                .long_about("Move the last date or daily end time of an approved reservation later"),
            Command::new("release")
                .about("Give back dates of a reservation")
                .long_about("Offer some dates of an approved reservation to other users"),
            Command::new("cancel-release")
                .about("Withdraw a release")
                .long_about("Withdraw a release; dates already booked by others stay booked"),
            Command::new("list")
                .about("List reservations")
                .long_about("Display reservations of a user or on a resource in various formats"),
            Command::new("releases")
                .about("List releases")
                .long_about("Display releases on a resource or of a reservation"),
            Command::new("notifications")
                .about("Show or acknowledge notification events")
                .long_about("Display undelivered notification events and mark them delivered"),
            Command::new("show-data-dir")
                .about("Show the resolved data directory path")
                .long_about("Display the path to the labres data directory"),
            Command::new("validate")
                .about("Validate a configuration file")
                .long_about("Check a labres configuration file for errors"),
            Command::new("completions")
                .about("Generate shell completion scripts")
                .long_about("Generate shell completion scripts for bash, zsh, fish, or PowerShell"),
        ])
}

fn main() -> std::io::Result<()> {
    let out_dir = PathBuf::from(std::env::var_os("OUT_DIR").ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::NotFound, "OUT_DIR is not set")
    })?);
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir)?;

    let mut buffer = Vec::new();
    Man::new(build_cli()).render(&mut buffer)?;
    fs::write(man_dir.join("labres.1"), buffer)?;

    println!("cargo:rerun-if-changed=src/cli.rs");
    println!("cargo:rerun-if-changed=src/commands/");
    Ok(())
}
