//! Cancel command implementation.
//!
//! The owner cancels their own reservation; an administrator cancelling
//! someone else's revokes it and must give a reason.

use clap::Args;
use labres::ReservationId;

use crate::error::CliError;
use crate::utils::{load_configuration, open_engine, report, GlobalOptions};

/// Cancel or revoke a reservation.
#[derive(Args)]
pub struct CancelCommand {
    /// Reservation id
    #[arg(value_name = "ID")]
    pub id: i64,

    /// Reason (required when revoking another user's reservation)
    #[arg(long, value_name = "TEXT")]
    pub reason: Option<String>,
}

impl CancelCommand {
    /// Execute the cancel command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let actor = global.actor()?;
        let config = load_configuration(global)?;
        let mut engine = open_engine(global, &config)?;

        let outcome = engine.cancel_reservation(
            &actor,
            ReservationId::new(self.id),
            self.reason.as_deref(),
        )?;
        if report(global, &outcome) {
            println!("{}\t{}", outcome.value.id(), outcome.value.status());
        }
        Ok(())
    }
}
