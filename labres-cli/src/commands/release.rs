//! Release command implementations.
//!
//! `release` gives back some dates of an approved reservation so others
//! can book them; `cancel-release` withdraws the offer.

use clap::Args;
use labres::{ReleaseId, ReleaseRequest, ReservationId};

use crate::error::CliError;
use crate::utils::{date_arg, load_configuration, open_engine, report, GlobalOptions};

/// Give back dates of an approved reservation.
#[derive(Args)]
pub struct ReleaseCommand {
    /// Reservation id
    #[arg(value_name = "ID")]
    pub reservation: i64,

    /// Date to give back (YYYY-MM-DD); repeat or separate with commas
    #[arg(long = "date", value_name = "DATE", required = true, value_delimiter = ',')]
    pub dates: Vec<String>,

    /// Why the dates are not needed
    #[arg(long, value_name = "TEXT")]
    pub reason: String,
}

impl ReleaseCommand {
    /// Execute the release command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let actor = global.actor()?;
        let dates = self
            .dates
            .iter()
            .map(|d| date_arg(d, "dates"))
            .collect::<Result<Vec<_>, _>>()?;

        let config = load_configuration(global)?;
        let mut engine = open_engine(global, &config)?;
        let request = ReleaseRequest::new(ReservationId::new(self.reservation), dates, self.reason);
        let outcome = engine.create_release(&actor, request)?;

        if report(global, &outcome) {
            println!("{}", outcome.value.id());
        }
        Ok(())
    }
}

/// Withdraw a release.
#[derive(Args)]
pub struct CancelReleaseCommand {
    /// Release id
    #[arg(value_name = "ID")]
    pub id: i64,

    /// Reason (required when an administrator withdraws another user's release)
    #[arg(long, value_name = "TEXT")]
    pub reason: Option<String>,
}

impl CancelReleaseCommand {
    /// Execute the cancel-release command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let actor = global.actor()?;
        let config = load_configuration(global)?;
        let mut engine = open_engine(global, &config)?;

        let outcome =
            engine.cancel_release(&actor, ReleaseId::new(self.id), self.reason.as_deref())?;
        if report(global, &outcome) {
            println!("{}\t{}", outcome.value.id(), outcome.value.status());
        }
        Ok(())
    }
}
