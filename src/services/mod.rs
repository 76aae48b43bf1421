//! Business logic services

pub mod ledger;
pub mod registry;
pub mod selector;

pub use ledger::{BalanceView, ClaimOutcome, RedemptionOutcome, VoucherLedger};
pub use registry::RegistrationService;
pub use selector::{suggest_balanced, BalancedCombo, RedemptionRequest, Selection};
