//! Path management
//!
//! Resolves where ledger state and audit buckets live.
//!
//! ## Path Resolution Order
//!
//! 1. `VOUCHER_LEDGER_DATA_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/voucher-ledger` or `~/.config/voucher-ledger`
//! 3. Windows: `%APPDATA%\voucher-ledger`

use std::path::PathBuf;

use crate::error::VoucherError;

/// Manages all paths used by the voucher ledger
#[derive(Debug, Clone)]
pub struct LedgerPaths {
    base_dir: PathBuf,
}

impl LedgerPaths {
    /// Create a new LedgerPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, VoucherError> {
        let base_dir = if let Ok(custom) = std::env::var("VOUCHER_LEDGER_DATA_DIR") {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create LedgerPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Directory holding ledger state files
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Directory holding hourly audit buckets (RedeemYYYYMMDDHH.csv)
    pub fn audit_dir(&self) -> PathBuf {
        self.base_dir.join("redemptions")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    pub fn households_file(&self) -> PathBuf {
        self.data_dir().join("households.json")
    }

    pub fn merchants_file(&self) -> PathBuf {
        self.data_dir().join("merchants.json")
    }

    /// Ensure the base, data and audit directories exist
    pub fn ensure_directories(&self) -> Result<(), VoucherError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| VoucherError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| VoucherError::Io(format!("Failed to create data directory: {}", e)))?;

        std::fs::create_dir_all(self.audit_dir())
            .map_err(|e| VoucherError::Io(format!("Failed to create audit directory: {}", e)))?;

        Ok(())
    }
}

/// Resolve the default data directory path based on platform
#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, VoucherError> {
    let config_base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| {
            std::env::var("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .map_err(|_| VoucherError::Io("HOME environment variable not set".into()))
        })?;

    Ok(config_base.join("voucher-ledger"))
}

#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, VoucherError> {
    std::env::var("APPDATA")
        .map(|appdata| PathBuf::from(appdata).join("voucher-ledger"))
        .map_err(|_| VoucherError::Io("APPDATA environment variable not set".into()))
}
