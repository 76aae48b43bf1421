//! Household model
//!
//! A household exclusively owns its vouchers and caches the aggregate value
//! of the active ones. The cache is the only O(1) balance source; it is
//! recomputed at every mutation point (claim, redeem, expire) and must
//! always equal the sum over active vouchers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::denomination::DenominationCounts;
use super::ids::{HouseholdId, TrancheId, VoucherId};
use super::money::Money;
use super::voucher::Voucher;

/// A registered household account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Household {
    /// External identifier (e.g. "H001")
    pub id: HouseholdId,

    /// Names of household members
    #[serde(default)]
    pub members: Vec<String>,

    /// Registered address postal code
    #[serde(default)]
    pub postal_code: String,

    /// Date the household was registered
    pub registered_on: NaiveDate,

    /// Tranches this household has claimed; each may appear at most once
    #[serde(default)]
    pub claimed_tranches: BTreeSet<TrancheId>,

    /// Vouchers owned by this household, all lifecycles included
    #[serde(default)]
    pub vouchers: Vec<Voucher>,

    /// Cached sum of active voucher values
    #[serde(default)]
    pub balance: Money,

    /// Cached per-denomination counts of active vouchers
    #[serde(default)]
    pub breakdown: DenominationCounts,
}

impl Household {
    pub fn new(
        id: HouseholdId,
        members: Vec<String>,
        postal_code: String,
        registered_on: NaiveDate,
    ) -> Self {
        Self {
            id,
            members,
            postal_code,
            registered_on,
            claimed_tranches: BTreeSet::new(),
            vouchers: Vec::new(),
            balance: Money::zero(),
            breakdown: DenominationCounts::default(),
        }
    }

    pub fn has_claimed(&self, tranche_id: &TrancheId) -> bool {
        self.claimed_tranches.contains(tranche_id)
    }

    /// Counts of active vouchers per denomination
    pub fn active_counts(&self) -> DenominationCounts {
        let mut counts = DenominationCounts::default();
        for voucher in self.vouchers.iter().filter(|v| v.is_active()) {
            counts.add(voucher.denomination, 1);
        }
        counts
    }

    /// Look up an owned voucher by id
    pub fn voucher(&self, id: VoucherId) -> Option<&Voucher> {
        self.vouchers.iter().find(|v| v.id == id)
    }

    pub fn voucher_mut(&mut self, id: VoucherId) -> Option<&mut Voucher> {
        self.vouchers.iter_mut().find(|v| v.id == id)
    }

    /// Recompute the cached balance and breakdown from the active inventory
    ///
    /// Called at the end of every mutating operation, inside the same
    /// critical section as the mutation itself. Balance reads serve both
    /// caches without rescanning the vouchers.
    pub fn recompute_balance(&mut self) {
        self.breakdown = self.active_counts();
        self.balance = self.breakdown.total_value();
    }

    /// Debug check: cached balance and breakdown match the active inventory
    #[cfg(test)]
    pub fn balance_is_consistent(&self) -> bool {
        let recomputed = self.active_counts();
        self.breakdown == recomputed && self.balance == recomputed.total_value()
    }
}
