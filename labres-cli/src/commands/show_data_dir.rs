//! Command to show the resolved data directory path.

use clap::Args;

use crate::error::CliError;
use crate::utils::GlobalOptions;

/// Show the resolved data directory path.
#[derive(Args)]
pub struct ShowDataDirCommand {}

impl ShowDataDirCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        println!("{}", global.data_dir()?.display());
        Ok(())
    }
}
