//! Error types for the voucher ledger
//!
//! All fallible operations return `VoucherResult`. Errors that reject a
//! mutating request (unknown ids, double claims, infeasible selections)
//! guarantee that no ledger state changed.

use thiserror::Error;

use crate::models::Money;

/// The main error type for voucher ledger operations
#[derive(Error, Debug)]
pub enum VoucherError {
    /// Caller supplied a household id that is not registered
    #[error("Unknown household: {0}")]
    UnknownHousehold(String),

    /// Caller supplied a merchant id that is not registered
    #[error("Unknown merchant: {0}")]
    UnknownMerchant(String),

    /// Caller supplied a tranche id absent from the catalog
    #[error("Unknown tranche: {0}")]
    UnknownTranche(String),

    /// Idempotence guard: the household already claimed this tranche
    #[error("Tranche {tranche} already claimed by household {household}")]
    TrancheAlreadyClaimed { household: String, tranche: String },

    /// A requested denomination count exceeds what the household holds
    #[error("Insufficient balance: requested {requested} x {denomination}, {available} available")]
    InsufficientBalance {
        denomination: String,
        requested: u32,
        available: u32,
    },

    /// The balanced-suggestion search found no positive achievable amount
    #[error("No feasible voucher combination for target {0}")]
    NoFeasibleCombination(Money),

    /// Explicit voucher ids were not owned or not active at commit time
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    /// Audit append or inventory flush failed after retry
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Duplicate registration
    #[error("{entity_type} already registered: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// Catalog file could not be loaded or failed its face-value check
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Validation errors for data models and CLI input
    #[error("Validation error: {0}")]
    Validation(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Repository/lock errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl VoucherError {
    /// Create a duplicate-registration error for households
    pub fn duplicate_household(identifier: impl Into<String>) -> Self {
        Self::Duplicate {
            entity_type: "Household",
            identifier: identifier.into(),
        }
    }

    /// Create a duplicate-registration error for merchants
    pub fn duplicate_merchant(identifier: impl Into<String>) -> Self {
        Self::Duplicate {
            entity_type: "Merchant",
            identifier: identifier.into(),
        }
    }

    /// Check if this error rejected the request without mutating state
    pub fn is_rejection(&self) -> bool {
        !matches!(self, Self::Persistence(_) | Self::Io(_) | Self::Storage(_))
    }
}

impl From<std::io::Error> for VoucherError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for VoucherError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for voucher ledger operations
pub type VoucherResult<T> = Result<T, VoucherError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VoucherError::UnknownHousehold("H999".into());
        assert_eq!(err.to_string(), "Unknown household: H999");
    }

    #[test]
    fn test_already_claimed_display() {
        let err = VoucherError::TrancheAlreadyClaimed {
            household: "H001".into(),
            tranche: "May2025".into(),
        };
        assert_eq!(
            err.to_string(),
            "Tranche May2025 already claimed by household H001"
        );
    }

    #[test]
    fn test_insufficient_balance_display() {
        let err = VoucherError::InsufficientBalance {
            denomination: "$5.00".into(),
            requested: 30,
            available: 20,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient balance: requested 30 x $5.00, 20 available"
        );
    }

    #[test]
    fn test_rejections_leave_state_untouched() {
        assert!(VoucherError::UnknownTranche("X".into()).is_rejection());
        assert!(!VoucherError::Persistence("disk full".into()).is_rejection());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: VoucherError = io_err.into();
        assert!(matches!(err, VoucherError::Io(_)));
    }
}
