//! Configuration CLI commands

use std::path::PathBuf;

use clap::Subcommand;

use crate::config::{LedgerPaths, Settings};
use crate::error::{VoucherError, VoucherResult};

/// Configuration subcommands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration and data locations
    Show,
    /// Point the ledger at a catalog file (JSON or YAML)
    SetCatalog {
        /// Catalog file path
        path: PathBuf,
    },
    /// Revert to the built-in tranche catalog
    ClearCatalog,
}

pub fn handle_config_command(paths: &LedgerPaths, cmd: ConfigCommands) -> VoucherResult<()> {
    let mut settings = Settings::load_or_create(paths)?;

    match cmd {
        ConfigCommands::Show => {
            println!("Data directory: {}", paths.data_dir().display());
            println!("Audit directory: {}", paths.audit_dir().display());
            println!("Settings file: {}", paths.settings_file().display());
            match &settings.catalog_file {
                Some(path) => println!("Catalog: {}", path.display()),
                None => println!("Catalog: built-in"),
            }
            println!("Timestamp format: {}", settings.timestamp_format);
        }

        ConfigCommands::SetCatalog { path } => {
            if !path.exists() {
                return Err(VoucherError::Catalog(format!(
                    "Catalog file not found: {}",
                    path.display()
                )));
            }
            // Fail now, not at the next command, if the file does not parse
            crate::catalog::TrancheCatalog::load(&path)?;

            settings.catalog_file = Some(path.clone());
            settings.save(paths)?;
            println!("Catalog set to {}", path.display());
        }

        ConfigCommands::ClearCatalog => {
            settings.catalog_file = None;
            settings.save(paths)?;
            println!("Catalog reverted to built-in definitions");
        }
    }

    Ok(())
}
