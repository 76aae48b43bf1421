//! Merchant model
//!
//! Merchants are external collaborators: the ledger existence-checks them
//! at redemption time and never mutates them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ids::MerchantId;

/// A registered merchant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Merchant {
    /// External identifier (e.g. "M803")
    pub id: MerchantId,

    /// Display name
    pub name: String,

    /// Date the merchant was registered
    pub registered_on: NaiveDate,
}

impl Merchant {
    pub fn new(id: MerchantId, name: impl Into<String>, registered_on: NaiveDate) -> Self {
        Self {
            id,
            name: name.into(),
            registered_on,
        }
    }
}
