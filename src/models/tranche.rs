//! Tranche definitions
//!
//! A tranche is a named voucher batch with a fixed denomination distribution
//! and a declared face value. The declared value must equal the computed
//! distribution value; the catalog rejects definitions where they disagree.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::denomination::DenominationCounts;
use super::ids::TrancheId;
use super::money::Money;

/// Configuration for one claimable voucher batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrancheDefinition {
    /// Tranche identifier (e.g. "May2025")
    pub id: TrancheId,

    /// Vouchers issued per denomination when the tranche is claimed
    pub distribution: DenominationCounts,

    /// Declared total value of the bundle, in whole dollars
    pub total_value: i64,

    /// Expiry date applied to every voucher in the bundle, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_on: Option<NaiveDate>,
}

impl TrancheDefinition {
    /// Face value as a monetary amount
    pub fn face_value(&self) -> Money {
        Money::from_dollars(self.total_value)
    }

    /// Check the declared face value against the distribution
    pub fn validate(&self) -> Result<(), String> {
        let computed = self.distribution.total_value();
        if computed != self.face_value() {
            return Err(format!(
                "tranche {}: declared value {} does not match distribution value {}",
                self.id,
                self.face_value(),
                computed
            ));
        }
        if self.distribution.is_empty() {
            return Err(format!("tranche {}: empty distribution", self.id));
        }
        Ok(())
    }
}
