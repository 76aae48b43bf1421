//! Voucher model
//!
//! A voucher is issued in bulk by a tranche claim, spent exactly once by a
//! committed redemption, or lapses when its expiry date passes. Both exits
//! from `Active` are terminal.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::denomination::Denomination;
use super::ids::{HouseholdId, TrancheId, VoucherId};

/// Lifecycle status of a voucher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VoucherStatus {
    /// Issued and spendable
    #[default]
    Active,
    /// Consumed by a committed redemption (terminal)
    Used,
    /// Lapsed past its expiry date without being used (terminal)
    Expired,
}

impl fmt::Display for VoucherStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "Active"),
            Self::Used => write!(f, "Used"),
            Self::Expired => write!(f, "Expired"),
        }
    }
}

/// A single voucher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Voucher {
    /// Unique identifier
    pub id: VoucherId,

    /// Face value tier
    pub denomination: Denomination,

    /// Owning household (lookup key only; the household owns the voucher)
    pub household_id: HouseholdId,

    /// Tranche this voucher was issued from
    pub tranche_id: TrancheId,

    /// Lifecycle status
    #[serde(default)]
    pub status: VoucherStatus,

    /// Date after which the voucher lapses, if the tranche sets one
    pub expires_on: Option<NaiveDate>,

    /// Timestamp of the redemption that consumed this voucher
    pub redeemed_at: Option<NaiveDateTime>,
}

impl Voucher {
    /// Issue a new active voucher
    pub fn issue(
        denomination: Denomination,
        household_id: HouseholdId,
        tranche_id: TrancheId,
        expires_on: Option<NaiveDate>,
    ) -> Self {
        Self {
            id: VoucherId::new(),
            denomination,
            household_id,
            tranche_id,
            status: VoucherStatus::Active,
            expires_on,
            redeemed_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == VoucherStatus::Active
    }

    /// Whether an active voucher has lapsed as of the given date
    pub fn is_expired_as_of(&self, as_of: NaiveDate) -> bool {
        self.is_active()
            && self
                .expires_on
                .map(|expiry| expiry < as_of)
                .unwrap_or(false)
    }

    /// Transition `Active -> Used`; rejects any other starting state
    pub fn mark_used(&mut self, at: NaiveDateTime) -> Result<(), VoucherStateError> {
        if !self.is_active() {
            return Err(VoucherStateError {
                id: self.id,
                from: self.status,
            });
        }
        self.status = VoucherStatus::Used;
        self.redeemed_at = Some(at);
        Ok(())
    }

    /// Transition `Active -> Expired`; used vouchers never expire retroactively
    pub fn mark_expired(&mut self) -> Result<(), VoucherStateError> {
        if !self.is_active() {
            return Err(VoucherStateError {
                id: self.id,
                from: self.status,
            });
        }
        self.status = VoucherStatus::Expired;
        Ok(())
    }
}

/// Attempted transition out of a terminal status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoucherStateError {
    pub id: VoucherId,
    pub from: VoucherStatus,
}

impl fmt::Display for VoucherStateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "voucher {} is {}, not active", self.id, self.from)
    }
}

impl std::error::Error for VoucherStateError {}
