//! Merchant CLI commands

use clap::Subcommand;

use crate::error::VoucherResult;
use crate::models::MerchantId;
use crate::services::RegistrationService;
use crate::storage::Storage;

/// Merchant subcommands
#[derive(Subcommand)]
pub enum MerchantCommands {
    /// Register a new merchant
    Register {
        /// Merchant id (e.g. "M803")
        id: String,
        /// Display name
        name: String,
    },
    /// List all registered merchants
    List,
}

pub fn handle_merchant_command(storage: &Storage, cmd: MerchantCommands) -> VoucherResult<()> {
    match cmd {
        MerchantCommands::Register { id, name } => {
            let service = RegistrationService::new(storage);
            let today = chrono::Local::now().date_naive();
            let merchant = service.register_merchant(MerchantId::new(id), name, today)?;

            println!("Registered merchant: {} ({})", merchant.name, merchant.id);
        }

        MerchantCommands::List => {
            let merchants = storage.merchants.get_all()?;
            if merchants.is_empty() {
                println!("No merchants registered.");
                return Ok(());
            }
            for merchant in merchants {
                println!(
                    "{:<8}  {:<30}  {}",
                    merchant.id.as_str(),
                    merchant.name,
                    merchant.registered_on.format("%Y-%m-%d"),
                );
            }
        }
    }

    Ok(())
}
