//! Merchant repository
//!
//! Merchants are read-mostly: registered once, then existence-checked at
//! every redemption.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::{VoucherError, VoucherResult};
use crate::models::{Merchant, MerchantId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable merchant data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct MerchantData {
    merchants: Vec<Merchant>,
}

/// Repository for merchant persistence
pub struct MerchantRepository {
    path: PathBuf,
    data: RwLock<HashMap<MerchantId, Merchant>>,
}

impl MerchantRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(&self) -> VoucherResult<()> {
        let file_data: MerchantData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| VoucherError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        for merchant in file_data.merchants {
            data.insert(merchant.id.clone(), merchant);
        }

        Ok(())
    }

    pub fn save(&self) -> VoucherResult<()> {
        let data = self
            .data
            .read()
            .map_err(|e| VoucherError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut merchants: Vec<_> = data.values().cloned().collect();
        merchants.sort_by(|a, b| a.id.cmp(&b.id));

        write_json_atomic(&self.path, &MerchantData { merchants })
    }

    pub fn get(&self, id: &MerchantId) -> VoucherResult<Option<Merchant>> {
        let data = self
            .data
            .read()
            .map_err(|e| VoucherError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(id).cloned())
    }

    /// Existence check used by the redemption path
    pub fn contains(&self, id: &MerchantId) -> VoucherResult<bool> {
        let data = self
            .data
            .read()
            .map_err(|e| VoucherError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.contains_key(id))
    }

    pub fn get_all(&self) -> VoucherResult<Vec<Merchant>> {
        let data = self
            .data
            .read()
            .map_err(|e| VoucherError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut merchants: Vec<_> = data.values().cloned().collect();
        merchants.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(merchants)
    }

    pub fn upsert(&self, merchant: Merchant) -> VoucherResult<()> {
        let mut data = self
            .data
            .write()
            .map_err(|e| VoucherError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.insert(merchant.id.clone(), merchant);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    #[test]
    fn test_register_and_check() {
        let temp = TempDir::new().unwrap();
        let repo = MerchantRepository::new(temp.path().join("merchants.json"));
        repo.load().unwrap();

        let merchant = Merchant::new(
            MerchantId::new("M803"),
            "Corner Minimart",
            NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
        );
        repo.upsert(merchant).unwrap();

        assert!(repo.contains(&MerchantId::new("M803")).unwrap());
        assert!(!repo.contains(&MerchantId::new("M999")).unwrap());
    }

    #[test]
    fn test_save_and_reload() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("merchants.json");
        let repo = MerchantRepository::new(path.clone());
        repo.load().unwrap();
        repo.upsert(Merchant::new(
            MerchantId::new("M001"),
            "Wet Market Stall 12",
            NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
        ))
        .unwrap();
        repo.save().unwrap();

        let repo2 = MerchantRepository::new(path);
        repo2.load().unwrap();
        assert_eq!(repo2.get_all().unwrap().len(), 1);
    }
}
