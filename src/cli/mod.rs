//! CLI command handlers
//!
//! Bridges clap argument parsing with the service layer.

pub mod audit;
pub mod catalog;
pub mod config_cmd;
pub mod household;
pub mod ledger;
pub mod merchant;

pub use audit::{handle_export_hour, ExportHourArgs};
pub use catalog::{handle_catalog_command, CatalogCommands};
pub use config_cmd::{handle_config_command, ConfigCommands};
pub use household::{handle_household_command, HouseholdCommands};
pub use ledger::{
    handle_claim, handle_expire, handle_redeem, handle_suggest, ClaimArgs, ExpireArgs, RedeemArgs,
    SuggestArgs,
};
pub use merchant::{handle_merchant_command, MerchantCommands};
