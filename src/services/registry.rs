//! Registration service
//!
//! Creates household and merchant records. Ids are externally assigned and
//! must be unique within their kind.

use chrono::NaiveDate;

use crate::error::{VoucherError, VoucherResult};
use crate::models::{Household, HouseholdId, Merchant, MerchantId};
use crate::storage::Storage;

pub struct RegistrationService<'a> {
    storage: &'a Storage,
}

impl<'a> RegistrationService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Register a new household
    pub fn register_household(
        &self,
        id: HouseholdId,
        members: Vec<String>,
        postal_code: String,
        registered_on: NaiveDate,
    ) -> VoucherResult<Household> {
        if id.as_str().trim().is_empty() {
            return Err(VoucherError::Validation(
                "Household id cannot be empty".to_string(),
            ));
        }
        if self.storage.households.contains(&id)? {
            return Err(VoucherError::duplicate_household(id.as_str()));
        }

        let household = Household::new(id, members, postal_code, registered_on);
        self.storage.households.upsert(household.clone())?;
        self.storage.households.save()?;
        Ok(household)
    }

    /// Register a new merchant
    pub fn register_merchant(
        &self,
        id: MerchantId,
        name: impl Into<String>,
        registered_on: NaiveDate,
    ) -> VoucherResult<Merchant> {
        let name = name.into();
        if id.as_str().trim().is_empty() {
            return Err(VoucherError::Validation(
                "Merchant id cannot be empty".to_string(),
            ));
        }
        if name.trim().is_empty() {
            return Err(VoucherError::Validation(
                "Merchant name cannot be empty".to_string(),
            ));
        }
        if self.storage.merchants.contains(&id)? {
            return Err(VoucherError::duplicate_merchant(id.as_str()));
        }

        let merchant = Merchant::new(id, name, registered_on);
        self.storage.merchants.upsert(merchant.clone())?;
        self.storage.merchants.save()?;
        Ok(merchant)
    }
}
