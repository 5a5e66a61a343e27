//! Resource command implementation.
//!
//! This module implements `resource add|remove|maintenance|available|list`:
//! the registry administration calls plus the two resource listings.

use clap::{Args, Subcommand};
use labres::{NewResource, ResourceId, ResourceStatus};

use crate::error::CliError;
use crate::output::OutputFormat;
use crate::utils::{load_configuration, open_engine, report, GlobalOptions};
use crate::views;

/// Manage lab resources.
#[derive(Args)]
pub struct ResourceCommand {
    #[command(subcommand)]
    pub action: ResourceAction,
}

/// Resource subcommands.
#[derive(Subcommand)]
pub enum ResourceAction {
    /// Register a resource (admin)
    Add {
        /// Unique label, e.g. `ws-01`
        #[arg(value_name = "LABEL")]
        label: String,

        /// Where the machine is
        #[arg(long, value_name = "LOCATION")]
        location: Option<String>,

        /// Hardware description
        #[arg(long = "spec", value_name = "TEXT")]
        specification: Option<String>,
    },

    /// Remove a resource and its booking history (admin)
    Remove {
        /// Resource id
        #[arg(value_name = "ID")]
        id: i64,
    },

    /// Put a resource into or out of maintenance (admin)
    Maintenance {
        /// Resource id
        #[arg(value_name = "ID")]
        id: i64,

        /// Return the resource to service
        #[arg(long)]
        off: bool,
    },

    /// Show each resource's current state and next free window
    Available {
        /// Output format
        #[arg(long, value_enum, ignore_case = true)]
        format: Option<OutputFormat>,
    },

    /// List registered resources
    List {
        /// Output format
        #[arg(long, value_enum, ignore_case = true)]
        format: Option<OutputFormat>,
    },
}

impl ResourceCommand {
    /// Execute the resource command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global)?;
        let mut engine = open_engine(global, &config)?;

        match self.action {
            ResourceAction::Add {
                label,
                location,
                specification,
            } => {
                let mut spec = NewResource::new(label);
                if let Some(location) = location {
                    spec = spec.location(location);
                }
                if let Some(specification) = specification {
                    spec = spec.specification(specification);
                }
                let outcome = engine.create_resource(&global.actor()?, spec)?;
                if report(global, &outcome) {
                    println!("{}", outcome.value.id());
                }
            }
            ResourceAction::Remove { id } => {
                let outcome = engine.delete_resource(&global.actor()?, ResourceId::new(id))?;
                if report(global, &outcome) && !global.quiet {
                    eprintln!("Removed resource {}", outcome.value);
                }
            }
            ResourceAction::Maintenance { id, off } => {
                let status = if off {
                    ResourceStatus::Available
                } else {
                    ResourceStatus::Maintenance
                };
                let outcome =
                    engine.set_resource_status(&global.actor()?, ResourceId::new(id), status)?;
                if report(global, &outcome) {
                    println!("{}\t{}", outcome.value.id(), outcome.value.status());
                }
            }
            ResourceAction::Available { format } => {
                let entries = engine.list_resources_with_availability()?;
                views::availability(&entries)
                    .print(OutputFormat::resolve(format, config.output_format))?;
            }
            ResourceAction::List { format } => {
                let resources = engine.list_resources()?;
                views::resources(&resources)
                    .print(OutputFormat::resolve(format, config.output_format))?;
            }
        }

        Ok(())
    }
}
