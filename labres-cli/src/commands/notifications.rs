//! Notifications command implementation.
//!
//! The CLI does not deliver events itself; they wait in the outbox. This
//! command shows them and acknowledges delivered ones.

use clap::Args;
use labres::NotificationId;

use crate::error::CliError;
use crate::output::OutputFormat;
use crate::utils::{load_configuration, open_engine, GlobalOptions};
use crate::views;

/// Show or acknowledge notification events.
#[derive(Args)]
pub struct NotificationsCommand {
    /// Mark an event as delivered; may be repeated
    #[arg(long = "ack", value_name = "ID")]
    pub ack: Vec<i64>,

    /// Include events already delivered
    #[arg(long, conflicts_with = "all")]
    pub history: bool,

    /// Show undelivered events for every user (admin)
    #[arg(long)]
    pub all: bool,

    /// Output format
    #[arg(long, value_enum, ignore_case = true)]
    pub format: Option<OutputFormat>,
}

impl NotificationsCommand {
    /// Execute the notifications command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let actor = global.actor()?;
        let config = load_configuration(global)?;
        let engine = open_engine(global, &config)?;

        if !self.ack.is_empty() {
            for id in &self.ack {
                engine.mark_notification_delivered(NotificationId::new(*id))?;
            }
            if !global.quiet {
                eprintln!("Acknowledged {} event(s)", self.ack.len());
            }
            return Ok(());
        }

        let events = if self.all {
            if !actor.is_admin() {
                return Err(labres::Error::Authorization {
                    actor: actor.id().to_string(),
                    action: "list every user's notifications".to_string(),
                }
                .into());
            }
            engine.list_undelivered_notifications(None)?
        } else if self.history {
            engine.list_notifications_for_user(actor.id())?
        } else {
            engine.list_undelivered_notifications(Some(actor.id()))?
        };

        views::notifications(&events)
            .print(OutputFormat::resolve(self.format, config.output_format))
    }
}
