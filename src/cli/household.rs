//! Household CLI commands

use clap::Subcommand;

use crate::display::{format_balance, format_household_list};
use crate::error::{VoucherError, VoucherResult};
use crate::models::HouseholdId;
use crate::services::{RegistrationService, VoucherLedger};
use crate::storage::Storage;

/// Household subcommands
#[derive(Subcommand)]
pub enum HouseholdCommands {
    /// Register a new household
    Register {
        /// Household id (e.g. "H001")
        id: String,
        /// Member name; repeat for multiple members
        #[arg(short, long = "member")]
        members: Vec<String>,
        /// Postal code of the registered address
        #[arg(short, long, default_value = "")]
        postal_code: String,
    },
    /// Show one household's balance and voucher breakdown
    Show {
        /// Household id
        id: String,
    },
    /// List all registered households
    List,
}

pub fn handle_household_command(
    storage: &Storage,
    catalog: &crate::catalog::TrancheCatalog,
    cmd: HouseholdCommands,
) -> VoucherResult<()> {
    match cmd {
        HouseholdCommands::Register {
            id,
            members,
            postal_code,
        } => {
            let service = RegistrationService::new(storage);
            let today = chrono::Local::now().date_naive();
            let household =
                service.register_household(HouseholdId::new(id), members, postal_code, today)?;

            println!("Registered household: {}", household.id);
            println!("  Members: {}", household.members.len());
            println!("  Registered: {}", household.registered_on.format("%Y-%m-%d"));
        }

        HouseholdCommands::Show { id } => {
            let household_id = HouseholdId::new(&id);
            if !storage.households.contains(&household_id)? {
                return Err(VoucherError::UnknownHousehold(id));
            }
            let ledger = VoucherLedger::new(storage, catalog);
            let view = ledger.balance(&household_id)?;
            print!("{}", format_balance(household_id.as_str(), &view));
        }

        HouseholdCommands::List => {
            let households = storage.households.get_all()?;
            print!("{}", format_household_list(&households));
        }
    }

    Ok(())
}
