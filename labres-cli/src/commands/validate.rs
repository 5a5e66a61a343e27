//! Command to validate a labres configuration file.

use std::path::PathBuf;

use clap::Args;
use labres::config::{ConfigLoader, ConfigValidator};

use crate::error::CliError;
use crate::utils::GlobalOptions;

/// Validate a labres configuration file.
#[derive(Args)]
pub struct ValidateCommand {
    /// Configuration file to validate
    #[arg(value_name = "CONFIG_PATH")]
    pub config_path: PathBuf,
}

impl ValidateCommand {
    pub fn execute(self, _global: &GlobalOptions) -> Result<(), CliError> {
        if !self.config_path.exists() {
            return Err(CliError::InvalidArguments(format!(
                "File not found: {}",
                self.config_path.display()
            )));
        }

        let config = ConfigLoader::load_file(&self.config_path)
            .map_err(|e| CliError::Config(format!("parse error: {e}")))?;

        ConfigValidator::validate(&config).map_err(|e| CliError::Config(e.to_string()))?;
        println!("Configuration is valid");
        Ok(())
    }
}
