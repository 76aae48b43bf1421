use anyhow::Result;
use clap::{Parser, Subcommand};

use voucher_ledger::catalog::TrancheCatalog;
use voucher_ledger::cli::{
    handle_catalog_command, handle_claim, handle_config_command, handle_expire,
    handle_export_hour, handle_household_command, handle_merchant_command, handle_redeem,
    handle_suggest,
};
use voucher_ledger::config::{LedgerPaths, Settings};
use voucher_ledger::storage::Storage;

#[derive(Parser)]
#[command(
    name = "voucher",
    version,
    about = "Household voucher ledger and redemption engine",
    long_about = "Tracks household voucher tranches ($2/$5/$10 denominations), \
                  redeems them at registered merchants, and compiles an \
                  hour-bucketed CSV audit trail of every transaction."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Household management commands
    #[command(subcommand)]
    Household(voucher_ledger::cli::HouseholdCommands),

    /// Merchant management commands
    #[command(subcommand)]
    Merchant(voucher_ledger::cli::MerchantCommands),

    /// Claim a voucher tranche for a household
    Claim(voucher_ledger::cli::ClaimArgs),

    /// Show a household's balance
    Balance {
        /// Household id
        household: String,
    },

    /// Redeem vouchers at a merchant
    Redeem(voucher_ledger::cli::RedeemArgs),

    /// Preview the balanced combination for an amount without redeeming
    Suggest(voucher_ledger::cli::SuggestArgs),

    /// Expire vouchers past their tranche expiry date
    Expire(voucher_ledger::cli::ExpireArgs),

    /// Locate (and optionally print) an hourly audit bucket
    ExportHour(voucher_ledger::cli::ExportHourArgs),

    /// Tranche catalog commands
    #[command(subcommand)]
    Catalog(voucher_ledger::cli::CatalogCommands),

    /// Configuration commands
    #[command(subcommand)]
    Config(voucher_ledger::cli::ConfigCommands),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = LedgerPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    let catalog = match &settings.catalog_file {
        Some(path) => TrancheCatalog::load(path)?,
        None => TrancheCatalog::builtin(),
    };

    let storage = Storage::new(paths.clone())?;
    storage.load_all()?;

    match cli.command {
        Commands::Household(cmd) => {
            handle_household_command(&storage, &catalog, cmd)?;
        }
        Commands::Merchant(cmd) => {
            handle_merchant_command(&storage, cmd)?;
        }
        Commands::Claim(args) => {
            handle_claim(&storage, &catalog, args)?;
        }
        Commands::Balance { household } => {
            handle_household_command(
                &storage,
                &catalog,
                voucher_ledger::cli::HouseholdCommands::Show { id: household },
            )?;
        }
        Commands::Redeem(args) => {
            handle_redeem(&storage, &catalog, args)?;
        }
        Commands::Suggest(args) => {
            handle_suggest(&storage, args)?;
        }
        Commands::Expire(args) => {
            handle_expire(&storage, &catalog, args)?;
        }
        Commands::ExportHour(args) => {
            handle_export_hour(&storage, &catalog, args)?;
        }
        Commands::Catalog(cmd) => {
            handle_catalog_command(&catalog, cmd)?;
        }
        Commands::Config(cmd) => {
            handle_config_command(&paths, cmd)?;
        }
    }

    Ok(())
}
