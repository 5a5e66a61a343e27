//! Reserve command implementation.
//!
//! This module implements the `reserve` command, which submits a pending
//! reservation request for the acting user.

use clap::Args;
use labres::{DateRange, ReservationRequest, ResourceId, TimeWindow};

use crate::error::CliError;
use crate::utils::{date_arg, load_configuration, open_engine, report, time_arg, GlobalOptions};

/// Request a resource for a range of dates and a daily window.
#[derive(Args)]
pub struct ReserveCommand {
    /// Resource id
    #[arg(long, value_name = "ID")]
    pub resource: i64,

    /// First date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub from: String,

    /// Last date, inclusive (default: same as --from)
    #[arg(long, value_name = "DATE")]
    pub to: Option<String>,

    /// Daily start time (HH:MM)
    #[arg(long, value_name = "HH:MM")]
    pub start: String,

    /// Daily end time (HH:MM)
    #[arg(long, value_name = "HH:MM")]
    pub end: String,

    /// Why the resource is needed
    #[arg(long, value_name = "TEXT")]
    pub reason: String,

    /// Opaque JSON metadata stored with the request
    #[arg(long, value_name = "JSON")]
    pub metadata: Option<String>,
}

impl ReserveCommand {
    /// Execute the reserve command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let actor = global.actor()?;

        let start_date = date_arg(&self.from, "start_date")?;
        let end_date = match self.to {
            Some(ref to) => date_arg(to, "end_date")?,
            None => start_date,
        };
        let dates = DateRange::new(start_date, end_date).map_err(labres::Error::from)?;
        let window = TimeWindow::new(
            time_arg(&self.start, "start_time")?,
            time_arg(&self.end, "end_time")?,
        )
        .map_err(labres::Error::from)?;

        let mut request =
            ReservationRequest::new(ResourceId::new(self.resource), dates, window, self.reason);
        if let Some(ref raw) = self.metadata {
            let metadata = serde_json::from_str(raw)
                .map_err(|e| CliError::InvalidArguments(format!("--metadata: {e}")))?;
            request = request.with_metadata(metadata);
        }

        let config = load_configuration(global)?;
        let mut engine = open_engine(global, &config)?;
        let outcome = engine.create_reservation(&actor, request)?;

        // Just the id on stdout, for scripts
        if report(global, &outcome) {
            println!("{}", outcome.value.id());
        }

        Ok(())
    }
}
