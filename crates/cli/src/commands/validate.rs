//! `validate` command implementation.

use anyhow::Result;
use serde::Serialize;
use tracing::info;

use config_loader::ConfigLoader;

use crate::cli::ValidateArgs;
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct ValidationReport {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    let result = ConfigLoader::load_from_path(&args.config);
    let report = ValidationReport {
        valid: result.is_ok(),
        error: result.as_ref().err().map(|e| e.to_string()),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if let Err(ref e) = result {
        println!("Configuration is INVALID: {e}");
    } else {
        println!("Configuration is valid");
    }

    match result {
        Ok(_) => {
            info!(config = %args.config.display(), "Configuration validated");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
