//! Display formatting for terminal output
//!
//! Formats balances, claim outcomes and redemption receipts for the
//! terminal.

pub mod balance;
pub mod receipt;

pub use balance::{format_balance, format_household_list};
pub use receipt::{format_claim, format_redemption, format_suggestion};
