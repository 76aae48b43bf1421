//! Tranche catalog
//!
//! Static configuration mapping tranche ids to their denomination
//! distributions. Loads from a JSON or YAML file (picked by extension) or
//! falls back to the built-in tranches. Every definition is face-value
//! checked at load time; a catalog with a bad definition is rejected whole.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{VoucherError, VoucherResult};
use crate::models::{DenominationCounts, TrancheDefinition, TrancheId};

/// On-disk catalog layout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CatalogFile {
    tranches: Vec<TrancheDefinition>,
}

/// Read-only lookup of claimable tranches
#[derive(Debug, Clone)]
pub struct TrancheCatalog {
    tranches: BTreeMap<TrancheId, TrancheDefinition>,
}

impl TrancheCatalog {
    /// Build a catalog from definitions, validating each
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = TrancheDefinition>,
    ) -> VoucherResult<Self> {
        let mut tranches = BTreeMap::new();
        for def in definitions {
            def.validate().map_err(VoucherError::Catalog)?;
            if tranches.insert(def.id.clone(), def).is_some() {
                return Err(VoucherError::Catalog("duplicate tranche id".into()));
            }
        }
        Ok(Self { tranches })
    }

    /// The built-in tranche pair used when no catalog file is configured
    pub fn builtin() -> Self {
        let definitions = vec![
            TrancheDefinition {
                id: TrancheId::new("May2025"),
                distribution: DenominationCounts::new(50, 20, 30),
                total_value: 500,
                expires_on: None,
            },
            TrancheDefinition {
                id: TrancheId::new("Jan2026"),
                distribution: DenominationCounts::new(30, 12, 15),
                total_value: 270,
                expires_on: None,
            },
        ];
        Self::from_definitions(definitions).expect("built-in catalog is valid")
    }

    /// Load a catalog file; format chosen by extension (.json, .yaml/.yml)
    pub fn load(path: &Path) -> VoucherResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            VoucherError::Catalog(format!("failed to read {}: {}", path.display(), e))
        })?;

        let file: CatalogFile = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&contents).map_err(|e| {
                VoucherError::Catalog(format!("failed to parse {}: {}", path.display(), e))
            })?,
            _ => serde_json::from_str(&contents).map_err(|e| {
                VoucherError::Catalog(format!("failed to parse {}: {}", path.display(), e))
            })?,
        };

        Self::from_definitions(file.tranches)
    }

    pub fn get(&self, id: &TrancheId) -> Option<&TrancheDefinition> {
        self.tranches.get(id)
    }

    pub fn contains(&self, id: &TrancheId) -> bool {
        self.tranches.contains_key(id)
    }

    /// All definitions in id order
    pub fn definitions(&self) -> impl Iterator<Item = &TrancheDefinition> {
        self.tranches.values()
    }

    pub fn len(&self) -> usize {
        self.tranches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tranches.is_empty()
    }
}
