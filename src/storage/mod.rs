//! Storage layer
//!
//! JSON file repositories with atomic writes, plus the per-household lock
//! registry. Claim, redeem-commit and expiry all hold a household's lock
//! across their full check-then-mutate-then-flush sequence; operations on
//! different households proceed in parallel.

pub mod file_io;
pub mod households;
pub mod merchants;

pub use households::HouseholdRepository;
pub use merchants::MerchantRepository;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::config::paths::LedgerPaths;
use crate::error::{VoucherError, VoucherResult};
use crate::models::HouseholdId;

/// Main storage coordinator
pub struct Storage {
    paths: LedgerPaths,
    pub households: HouseholdRepository,
    pub merchants: MerchantRepository,
    /// One mutex per household, created on first use
    household_locks: Mutex<HashMap<HouseholdId, Arc<Mutex<()>>>>,
}

impl Storage {
    pub fn new(paths: LedgerPaths) -> VoucherResult<Self> {
        paths.ensure_directories()?;

        Ok(Self {
            households: HouseholdRepository::new(paths.households_file()),
            merchants: MerchantRepository::new(paths.merchants_file()),
            household_locks: Mutex::new(HashMap::new()),
            paths,
        })
    }

    pub fn paths(&self) -> &LedgerPaths {
        &self.paths
    }

    /// Load all state from disk
    pub fn load_all(&self) -> VoucherResult<()> {
        self.households.load()?;
        self.merchants.load()?;
        Ok(())
    }

    /// Flush all state to disk
    pub fn save_all(&self) -> VoucherResult<()> {
        self.households.save()?;
        self.merchants.save()?;
        Ok(())
    }

    /// The exclusive lock for one household
    ///
    /// Mutating operations hold this across check and mutation so a second
    /// claim of the same tranche, or a racing redemption, cannot interleave.
    pub fn household_lock(&self, id: &HouseholdId) -> VoucherResult<Arc<Mutex<()>>> {
        let mut locks = self
            .household_locks
            .lock()
            .map_err(|e| VoucherError::Storage(format!("Failed to acquire lock registry: {}", e)))?;

        Ok(locks.entry(id.clone()).or_default().clone())
    }
}
