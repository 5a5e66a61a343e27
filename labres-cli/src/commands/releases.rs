//! Releases command implementation.
//!
//! Lists the releases on a resource or of one reservation, with the dates
//! already booked by others.

use clap::{ArgGroup, Args};
use labres::{ReservationId, ResourceId};

use crate::error::CliError;
use crate::output::OutputFormat;
use crate::utils::{load_configuration, open_engine, GlobalOptions};
use crate::views;

/// List releases.
#[derive(Args)]
#[command(group(ArgGroup::new("target").required(true).args(["resource", "reservation"])))]
pub struct ReleasesCommand {
    /// Show releases on this resource
    #[arg(long, value_name = "ID")]
    pub resource: Option<i64>,

    /// Show releases of this reservation
    #[arg(long, value_name = "ID")]
    pub reservation: Option<i64>,

    /// Output format
    #[arg(long, value_enum, ignore_case = true)]
    pub format: Option<OutputFormat>,
}

impl ReleasesCommand {
    /// Execute the releases command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global)?;
        let engine = open_engine(global, &config)?;

        let releases = match (self.resource, self.reservation) {
            (Some(resource), _) => engine.list_releases_for_resource(ResourceId::new(resource))?,
            (None, Some(reservation)) => {
                engine.list_releases_for_reservation(ReservationId::new(reservation))?
            }
            (None, None) => {
                return Err(CliError::InvalidArguments(
                    "pass --resource or --reservation".to_string(),
                ))
            }
        };

        views::releases(&releases).print(OutputFormat::resolve(self.format, config.output_format))
    }
}
