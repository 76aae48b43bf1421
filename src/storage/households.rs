//! Household repository
//!
//! In-memory household map persisted to households.json. Callers mutating a
//! household must hold that household's lock (see `Storage::household_lock`)
//! across the read-modify-write-flush cycle; the repository's own `RwLock`
//! only protects the map structure.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::{VoucherError, VoucherResult};
use crate::models::{Household, HouseholdId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable household data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct HouseholdData {
    households: Vec<Household>,
}

/// Repository for household persistence
pub struct HouseholdRepository {
    path: PathBuf,
    data: RwLock<HashMap<HouseholdId, Household>>,
}

impl HouseholdRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load households from disk, replacing the in-memory map
    pub fn load(&self) -> VoucherResult<()> {
        let file_data: HouseholdData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| VoucherError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        for household in file_data.households {
            data.insert(household.id.clone(), household);
        }

        Ok(())
    }

    /// Flush all households to disk
    pub fn save(&self) -> VoucherResult<()> {
        let data = self
            .data
            .read()
            .map_err(|e| VoucherError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut households: Vec<_> = data.values().cloned().collect();
        households.sort_by(|a, b| a.id.cmp(&b.id));

        write_json_atomic(&self.path, &HouseholdData { households })
    }

    pub fn get(&self, id: &HouseholdId) -> VoucherResult<Option<Household>> {
        let data = self
            .data
            .read()
            .map_err(|e| VoucherError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(id).cloned())
    }

    pub fn contains(&self, id: &HouseholdId) -> VoucherResult<bool> {
        let data = self
            .data
            .read()
            .map_err(|e| VoucherError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.contains_key(id))
    }

    /// All households in id order
    pub fn get_all(&self) -> VoucherResult<Vec<Household>> {
        let data = self
            .data
            .read()
            .map_err(|e| VoucherError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut households: Vec<_> = data.values().cloned().collect();
        households.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(households)
    }

    /// All household ids, for sweep-style iteration
    pub fn ids(&self) -> VoucherResult<Vec<HouseholdId>> {
        let data = self
            .data
            .read()
            .map_err(|e| VoucherError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut ids: Vec<_> = data.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    /// Insert or replace a household
    pub fn upsert(&self, household: Household) -> VoucherResult<()> {
        let mut data = self
            .data
            .write()
            .map_err(|e| VoucherError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.insert(household.id.clone(), household);
        Ok(())
    }

    pub fn count(&self) -> VoucherResult<usize> {
        let data = self
            .data
            .read()
            .map_err(|e| VoucherError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, HouseholdRepository) {
        let temp = TempDir::new().unwrap();
        let repo = HouseholdRepository::new(temp.path().join("households.json"));
        (temp, repo)
    }

    fn sample_household(id: &str) -> Household {
        Household::new(
            HouseholdId::new(id),
            vec!["Test Member".into()],
            "520000".into(),
            NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
        )
    }

    #[test]
    fn test_empty_load() {
        let (_temp, repo) = create_test_repo();
        repo.load().unwrap();
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_upsert_and_get() {
        let (_temp, repo) = create_test_repo();
        repo.load().unwrap();

        repo.upsert(sample_household("H001")).unwrap();

        let h = repo.get(&HouseholdId::new("H001")).unwrap().unwrap();
        assert_eq!(h.postal_code, "520000");
        assert!(repo.contains(&HouseholdId::new("H001")).unwrap());
        assert!(!repo.contains(&HouseholdId::new("H002")).unwrap());
    }

    #[test]
    fn test_save_and_reload() {
        let (temp, repo) = create_test_repo();
        repo.load().unwrap();
        repo.upsert(sample_household("H001")).unwrap();
        repo.upsert(sample_household("H002")).unwrap();
        repo.save().unwrap();

        let repo2 = HouseholdRepository::new(temp.path().join("households.json"));
        repo2.load().unwrap();
        assert_eq!(repo2.count().unwrap(), 2);
    }

    #[test]
    fn test_ids_sorted() {
        let (_temp, repo) = create_test_repo();
        repo.load().unwrap();
        repo.upsert(sample_household("H002")).unwrap();
        repo.upsert(sample_household("H001")).unwrap();

        let ids = repo.ids().unwrap();
        assert_eq!(ids[0], HouseholdId::new("H001"));
        assert_eq!(ids[1], HouseholdId::new("H002"));
    }
}
