//! List command implementation.
//!
//! This module implements the `list` command, which displays reservations
//! on one resource or of one user in various formats (table, JSON, CSV,
//! TSV). Statuses are reported as of now, so finished approvals show as
//! `completed`.

use clap::Args;
use labres::{ReservationStatus, ResourceId};

use crate::error::CliError;
use crate::output::OutputFormat;
use crate::utils::{load_configuration, open_engine, user_arg, GlobalOptions};
use crate::views;

/// List reservations.
#[derive(Args)]
pub struct ListCommand {
    /// Show reservations on this resource
    #[arg(long, value_name = "ID", conflicts_with = "user")]
    pub resource: Option<i64>,

    /// Show reservations of this user (default: the acting user)
    #[arg(long, value_name = "USER")]
    pub user: Option<String>,

    /// Only show reservations in this status
    #[arg(long, value_name = "STATUS")]
    pub status: Option<String>,

    /// Output format
    #[arg(long, value_enum, ignore_case = true)]
    pub format: Option<OutputFormat>,
}

impl ListCommand {
    /// Execute the list command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let status = self
            .status
            .as_deref()
            .map(ReservationStatus::parse)
            .transpose()
            .map_err(|e| CliError::InvalidArguments(e.to_string()))?;

        let config = load_configuration(global)?;
        let engine = open_engine(global, &config)?;
        let now = engine.now();

        let reservations = if let Some(resource) = self.resource {
            engine.list_reservations_for_resource(ResourceId::new(resource), status)?
        } else {
            let user = match self.user {
                Some(ref user) => user_arg(user)?,
                None => global.actor()?.id().clone(),
            };
            let mut mine = engine.list_reservations_for_user(&user)?;
            if let Some(status) = status {
                mine.retain(|r| r.effective_status(now) == status);
            }
            mine
        };

        views::reservations(&reservations, now)
            .print(OutputFormat::resolve(self.format, config.output_format))
    }
}
