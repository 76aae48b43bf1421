//! Tranche catalog CLI commands

use clap::Subcommand;

use crate::catalog::TrancheCatalog;
use crate::error::{VoucherError, VoucherResult};
use crate::models::TrancheId;

/// Catalog subcommands
#[derive(Subcommand)]
pub enum CatalogCommands {
    /// List all tranche definitions
    List,
    /// Show one tranche definition
    Show {
        /// Tranche id
        id: String,
    },
}

pub fn handle_catalog_command(catalog: &TrancheCatalog, cmd: CatalogCommands) -> VoucherResult<()> {
    match cmd {
        CatalogCommands::List => {
            println!(
                "{:<12}  {:>5}  {:>5}  {:>5}  {:>10}  {}",
                "Tranche", "$2", "$5", "$10", "Value", "Expires"
            );
            for definition in catalog.definitions() {
                let expires = definition
                    .expires_on
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{:<12}  {:>5}  {:>5}  {:>5}  {:>10}  {}",
                    definition.id.as_str(),
                    definition.distribution.twos,
                    definition.distribution.fives,
                    definition.distribution.tens,
                    definition.face_value().to_string(),
                    expires,
                );
            }
        }

        CatalogCommands::Show { id } => {
            let tranche_id = TrancheId::new(&id);
            let definition = catalog
                .get(&tranche_id)
                .ok_or(VoucherError::UnknownTranche(id))?;

            println!("Tranche {}", definition.id);
            for (denomination, count) in definition.distribution.iter() {
                println!("  {:>4} x ${}", count, denomination.dollars());
            }
            println!("Face value: {}", definition.face_value());
            match definition.expires_on {
                Some(date) => println!("Expires: {}", date.format("%Y-%m-%d")),
                None => println!("Expires: never"),
            }
        }
    }

    Ok(())
}
