//! Redemption records
//!
//! A `RedemptionRecord` is the committed output of a redeem operation: the
//! consumed vouchers grouped by denomination (largest tier first, matching
//! the audit row order), the total amount, and the transaction metadata the
//! audit compiler needs.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::denomination::{Denomination, DenominationCounts};
use super::ids::{HouseholdId, MerchantId, TransactionId, VoucherId};
use super::money::Money;

/// Payment settlement status carried into the audit trail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PaymentStatus {
    #[default]
    Completed,
    Pending,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed => write!(f, "Completed"),
            Self::Pending => write!(f, "Pending"),
        }
    }
}

/// The vouchers consumed at one denomination within a transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedemptionGroup {
    pub denomination: Denomination,
    /// Ids in consumption order; the last one gets the final-use remark
    pub voucher_ids: Vec<VoucherId>,
}

impl RedemptionGroup {
    pub fn count(&self) -> u32 {
        self.voucher_ids.len() as u32
    }

    /// Denomination x group size, repeated on every audit row of the group
    pub fn amount(&self) -> Money {
        Money::from_dollars(self.denomination.dollars() * self.voucher_ids.len() as i64)
    }
}

/// A committed redemption
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedemptionRecord {
    pub transaction_id: TransactionId,
    pub household_id: HouseholdId,
    pub merchant_id: MerchantId,

    /// Commit timestamp; drives the audit bucket key
    pub timestamp: NaiveDateTime,

    /// Consumed vouchers grouped by denomination, descending tier order
    pub groups: Vec<RedemptionGroup>,

    pub payment_status: PaymentStatus,
}

impl RedemptionRecord {
    /// Total committed amount across all groups
    pub fn total(&self) -> Money {
        self.groups.iter().map(|g| g.amount()).sum()
    }

    /// Per-denomination breakdown of consumed vouchers
    pub fn breakdown(&self) -> DenominationCounts {
        let mut counts = DenominationCounts::default();
        for group in &self.groups {
            counts.add(group.denomination, group.count());
        }
        counts
    }

    /// Total number of vouchers consumed
    pub fn voucher_count(&self) -> u32 {
        self.groups.iter().map(|g| g.count()).sum()
    }
}
