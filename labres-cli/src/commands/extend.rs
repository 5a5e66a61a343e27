//! Extend command implementation.
//!
//! Moves the last date and/or the daily end time of an approved
//! reservation later, in place.

use clap::Args;
use labres::{ExtendRequest, ReservationId};

use crate::error::CliError;
use crate::utils::{date_arg, load_configuration, open_engine, report, time_arg, GlobalOptions};

/// Extend an approved reservation (admin).
#[derive(Args)]
pub struct ExtendCommand {
    /// Reservation id
    #[arg(value_name = "ID")]
    pub id: i64,

    /// New last date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub until: Option<String>,

    /// New daily end time (HH:MM)
    #[arg(long, value_name = "HH:MM")]
    pub end_time: Option<String>,
}

impl ExtendCommand {
    /// Execute the extend command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let actor = global.actor()?;
        let request = ExtendRequest {
            new_end_date: self
                .until
                .as_deref()
                .map(|d| date_arg(d, "new_end_date"))
                .transpose()?,
            new_end_time: self
                .end_time
                .as_deref()
                .map(|t| time_arg(t, "new_end_time"))
                .transpose()?,
        };

        let config = load_configuration(global)?;
        let mut engine = open_engine(global, &config)?;
        let outcome = engine.extend_reservation(&actor, ReservationId::new(self.id), request)?;

        if report(global, &outcome) {
            let r = &outcome.value;
            println!("{}\t{}\t{}", r.id(), r.dates(), r.window());
        }
        Ok(())
    }
}
