//! User settings
//!
//! Small JSON config persisted at the base directory. Mostly defaults; the
//! catalog file override is the setting that changes behavior.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::paths::LedgerPaths;
use crate::error::VoucherResult;
use crate::storage::file_io::{read_json, write_json_atomic};

fn default_schema_version() -> u32 {
    1
}

fn default_timestamp_format() -> String {
    "%Y-%m-%d %H:%M:%S".to_string()
}

/// Persisted user settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Tranche catalog file; the built-in catalog is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_file: Option<PathBuf>,

    /// strftime format for transaction timestamps in CLI input and audit rows
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            catalog_file: None,
            timestamp_format: default_timestamp_format(),
        }
    }
}

impl Settings {
    /// Load settings, creating the default file on first run
    pub fn load_or_create(paths: &LedgerPaths) -> VoucherResult<Self> {
        let path = paths.settings_file();
        if path.exists() {
            read_json(&path)
        } else {
            let settings = Self::default();
            settings.save(paths)?;
            Ok(settings)
        }
    }

    pub fn save(&self, paths: &LedgerPaths) -> VoucherResult<()> {
        write_json_atomic(paths.settings_file(), self)
    }
}
