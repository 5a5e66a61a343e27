//! Approve and reject command implementations.
//!
//! Both are administrator decisions on a pending request. Approval runs the
//! conflict check; rejection needs a reason.

use clap::Args;
use labres::ReservationId;

use crate::error::CliError;
use crate::utils::{load_configuration, open_engine, report, GlobalOptions};

/// Approve a pending reservation (admin).
#[derive(Args)]
pub struct ApproveCommand {
    /// Reservation id
    #[arg(value_name = "ID")]
    pub id: i64,
}

impl ApproveCommand {
    /// Execute the approve command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let actor = global.actor()?;
        let config = load_configuration(global)?;
        let mut engine = open_engine(global, &config)?;

        let outcome = engine.approve_reservation(&actor, ReservationId::new(self.id))?;
        if report(global, &outcome) {
            println!("{}\t{}", outcome.value.id(), outcome.value.status());
        }
        Ok(())
    }
}

/// Reject a pending reservation (admin).
#[derive(Args)]
pub struct RejectCommand {
    /// Reservation id
    #[arg(value_name = "ID")]
    pub id: i64,

    /// Why the request is declined
    #[arg(long, value_name = "TEXT")]
    pub reason: String,
}

impl RejectCommand {
    /// Execute the reject command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let actor = global.actor()?;
        let config = load_configuration(global)?;
        let mut engine = open_engine(global, &config)?;

        let outcome =
            engine.reject_reservation(&actor, ReservationId::new(self.id), &self.reason)?;
        if report(global, &outcome) {
            println!("{}\t{}", outcome.value.id(), outcome.value.status());
        }
        Ok(())
    }
}
