//! Core data models for the voucher ledger
//!
//! Households, vouchers, merchants, tranche definitions and redemption
//! records, plus the money and denomination primitives they share.

pub mod denomination;
pub mod household;
pub mod ids;
pub mod merchant;
pub mod money;
pub mod redemption;
pub mod tranche;
pub mod voucher;

pub use denomination::{Denomination, DenominationCounts};
pub use household::Household;
pub use ids::{HouseholdId, MerchantId, TrancheId, TransactionId, VoucherId};
pub use merchant::Merchant;
pub use money::Money;
pub use redemption::{PaymentStatus, RedemptionGroup, RedemptionRecord};
pub use tranche::TrancheDefinition;
pub use voucher::{Voucher, VoucherStatus};
