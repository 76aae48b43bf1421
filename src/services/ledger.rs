//! Voucher ledger service
//!
//! The mutating core: tranche claims, redemption commits and expiry sweeps.
//! Each mutation holds the target household's lock across its full
//! check-then-mutate-then-flush sequence, so a retried claim or a racing
//! redemption observes either none or all of the change. Balance reads go
//! through the cached aggregate.

use chrono::{NaiveDate, NaiveDateTime};

use crate::audit::AuditCompiler;
use crate::catalog::TrancheCatalog;
use crate::error::{VoucherError, VoucherResult};
use crate::models::{
    DenominationCounts, Household, HouseholdId, MerchantId, Money, PaymentStatus,
    RedemptionGroup, RedemptionRecord, TrancheId, TransactionId, Voucher,
};
use crate::storage::Storage;

use super::selector::{self, RedemptionRequest, Selection};

/// Result of a successful tranche claim
#[derive(Debug, Clone)]
pub struct ClaimOutcome {
    pub tranche_id: TrancheId,
    /// The exact bundle issued
    pub issued: DenominationCounts,
    pub new_balance: Money,
}

/// A household's balance: cached total plus active-voucher breakdown
#[derive(Debug, Clone)]
pub struct BalanceView {
    pub total: Money,
    pub breakdown: DenominationCounts,
}

/// Result of a committed redemption
#[derive(Debug, Clone)]
pub struct RedemptionOutcome {
    pub transaction_id: TransactionId,
    pub amount: Money,
    pub breakdown: DenominationCounts,
    pub new_balance: Money,
    /// Audit bucket the transaction was compiled into
    pub audit_bucket: std::path::PathBuf,
}

/// Service for claim, balance, redeem and expiry operations
pub struct VoucherLedger<'a> {
    storage: &'a Storage,
    catalog: &'a TrancheCatalog,
    audit: AuditCompiler,
}

impl<'a> VoucherLedger<'a> {
    pub fn new(storage: &'a Storage, catalog: &'a TrancheCatalog) -> Self {
        let audit = AuditCompiler::new(storage.paths().audit_dir());
        Self {
            storage,
            catalog,
            audit,
        }
    }

    /// Claim a tranche for a household, issuing its voucher bundle
    ///
    /// Idempotence guard: a second claim of the same tranche fails with
    /// `TrancheAlreadyClaimed` and mutates nothing.
    pub fn claim(
        &self,
        household_id: &HouseholdId,
        tranche_id: &TrancheId,
    ) -> VoucherResult<ClaimOutcome> {
        let definition = self
            .catalog
            .get(tranche_id)
            .ok_or_else(|| VoucherError::UnknownTranche(tranche_id.to_string()))?;

        let lock = self.storage.household_lock(household_id)?;
        let _guard = lock
            .lock()
            .map_err(|e| VoucherError::Storage(format!("Household lock poisoned: {}", e)))?;

        let mut household = self
            .storage
            .households
            .get(household_id)?
            .ok_or_else(|| VoucherError::UnknownHousehold(household_id.to_string()))?;

        if household.has_claimed(tranche_id) {
            return Err(VoucherError::TrancheAlreadyClaimed {
                household: household_id.to_string(),
                tranche: tranche_id.to_string(),
            });
        }

        for (denomination, count) in definition.distribution.iter() {
            for _ in 0..count {
                household.vouchers.push(Voucher::issue(
                    denomination,
                    household_id.clone(),
                    tranche_id.clone(),
                    definition.expires_on,
                ));
            }
        }
        household.claimed_tranches.insert(tranche_id.clone());
        household.recompute_balance();

        let new_balance = household.balance;
        self.commit_household(household)?;

        Ok(ClaimOutcome {
            tranche_id: tranche_id.clone(),
            issued: definition.distribution,
            new_balance,
        })
    }

    /// A household's balance; total and breakdown both come from the cache,
    /// not a voucher rescan
    pub fn balance(&self, household_id: &HouseholdId) -> VoucherResult<BalanceView> {
        let household = self
            .storage
            .households
            .get(household_id)?
            .ok_or_else(|| VoucherError::UnknownHousehold(household_id.to_string()))?;

        Ok(BalanceView {
            total: household.balance,
            breakdown: household.breakdown,
        })
    }

    /// Redeem vouchers at a merchant and compile the audit trail
    ///
    /// Selection runs outside the lock on a snapshot; the chosen voucher
    /// ids are re-validated under the lock before anything is marked used.
    /// All-or-nothing: a failed validation commits nothing.
    pub fn redeem(
        &self,
        household_id: &HouseholdId,
        merchant_id: &MerchantId,
        request: &RedemptionRequest,
        at: NaiveDateTime,
    ) -> VoucherResult<RedemptionOutcome> {
        if !self.storage.merchants.contains(merchant_id)? {
            return Err(VoucherError::UnknownMerchant(merchant_id.to_string()));
        }

        let snapshot = self
            .storage
            .households
            .get(household_id)?
            .ok_or_else(|| VoucherError::UnknownHousehold(household_id.to_string()))?;

        let selection = selector::select(&snapshot, request)?;

        let lock = self.storage.household_lock(household_id)?;
        let _guard = lock
            .lock()
            .map_err(|e| VoucherError::Storage(format!("Household lock poisoned: {}", e)))?;

        // Reload under the lock; the snapshot may be stale
        let mut household = self
            .storage
            .households
            .get(household_id)?
            .ok_or_else(|| VoucherError::UnknownHousehold(household_id.to_string()))?;

        let record = self.commit_selection(&mut household, merchant_id, &selection, at)?;

        let new_balance = household.balance;
        self.commit_household(household)?;

        // Ledger state is committed; an audit failure past its retry is a
        // durability degradation surfaced to the caller, not a rollback.
        let audit_bucket = self.audit.record(&record)?;

        Ok(RedemptionOutcome {
            transaction_id: record.transaction_id,
            amount: record.total(),
            breakdown: record.breakdown(),
            new_balance,
            audit_bucket,
        })
    }

    /// Expire active vouchers whose expiry date precedes `as_of`
    ///
    /// Idempotent; returns the number of vouchers expired in this pass.
    pub fn expire_sweep(&self, as_of: NaiveDate) -> VoucherResult<usize> {
        let mut expired_total = 0;

        for household_id in self.storage.households.ids()? {
            let lock = self.storage.household_lock(&household_id)?;
            let _guard = lock
                .lock()
                .map_err(|e| VoucherError::Storage(format!("Household lock poisoned: {}", e)))?;

            let Some(mut household) = self.storage.households.get(&household_id)? else {
                continue;
            };

            let mut expired_here = 0;
            for voucher in household.vouchers.iter_mut() {
                if voucher.is_expired_as_of(as_of) {
                    voucher
                        .mark_expired()
                        .map_err(|e| VoucherError::Validation(e.to_string()))?;
                    expired_here += 1;
                }
            }

            if expired_here > 0 {
                household.recompute_balance();
                self.commit_household(household)?;
                expired_total += expired_here;
            }
        }

        Ok(expired_total)
    }

    /// Retrieve the audit bucket for a given date and hour
    pub fn export_hour(&self, date: NaiveDate, hour: u32) -> VoucherResult<std::path::PathBuf> {
        self.audit.export_hour(date, hour)
    }

    /// Re-validate a selection under the lock and mark its vouchers used
    fn commit_selection(
        &self,
        household: &mut Household,
        merchant_id: &MerchantId,
        selection: &Selection,
        at: NaiveDateTime,
    ) -> VoucherResult<RedemptionRecord> {
        // Validate the full selection before mutating anything
        for id in &selection.voucher_ids {
            match household.voucher(*id) {
                Some(v) if v.is_active() => {}
                Some(v) => {
                    return Err(VoucherError::InvalidSelection(format!(
                        "voucher {} is {} at commit time",
                        id, v.status
                    )))
                }
                None => {
                    return Err(VoucherError::InvalidSelection(format!(
                        "voucher {} is not owned by household {}",
                        id, household.id
                    )))
                }
            }
        }

        let mut groups: Vec<RedemptionGroup> = Vec::new();
        for id in &selection.voucher_ids {
            let voucher = household
                .voucher_mut(*id)
                .ok_or_else(|| VoucherError::InvalidSelection(format!("voucher {} vanished", id)))?;
            let denomination = voucher.denomination;
            voucher
                .mark_used(at)
                .map_err(|e| VoucherError::InvalidSelection(e.to_string()))?;

            match groups.iter_mut().find(|g| g.denomination == denomination) {
                Some(group) => group.voucher_ids.push(*id),
                None => groups.push(RedemptionGroup {
                    denomination,
                    voucher_ids: vec![*id],
                }),
            }
        }
        // Audit order: largest tier first
        groups.sort_by(|a, b| b.denomination.cmp(&a.denomination));

        household.recompute_balance();

        Ok(RedemptionRecord {
            transaction_id: TransactionId::new(),
            household_id: household.id.clone(),
            merchant_id: merchant_id.clone(),
            timestamp: at,
            groups,
            payment_status: PaymentStatus::Completed,
        })
    }

    /// Upsert and flush a household inside the caller's critical section
    fn commit_household(&self, household: Household) -> VoucherResult<()> {
        self.storage.households.upsert(household)?;
        self.storage
            .households
            .save()
            .map_err(|e| VoucherError::Persistence(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::LedgerPaths;
    use crate::services::registry::RegistrationService;
    use tempfile::TempDir;

    struct Fixture {
        _temp: TempDir,
        storage: Storage,
        catalog: TrancheCatalog,
    }

    fn fixture() -> Fixture {
        let temp = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        Fixture {
            _temp: temp,
            storage,
            catalog: TrancheCatalog::builtin(),
        }
    }

    fn register_defaults(f: &Fixture) {
        let registry = RegistrationService::new(&f.storage);
        registry
            .register_household(
                HouseholdId::new("H001"),
                vec!["Alex Tan".into()],
                "520123".into(),
                NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            )
            .unwrap();
        registry
            .register_merchant(
                MerchantId::new("M803"),
                "Corner Minimart",
                NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            )
            .unwrap();
    }

    fn tx_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(14, 5, 0)
            .unwrap()
    }

    #[test]
    fn test_claim_issues_full_bundle() {
        let f = fixture();
        register_defaults(&f);
        let ledger = VoucherLedger::new(&f.storage, &f.catalog);

        let outcome = ledger
            .claim(&HouseholdId::new("H001"), &TrancheId::new("May2025"))
            .unwrap();

        // Scenario A: {2:50, 5:20, 10:30} worth $500
        assert_eq!(outcome.issued, DenominationCounts::new(50, 20, 30));
        assert_eq!(outcome.new_balance, Money::from_dollars(500));

        let view = ledger.balance(&HouseholdId::new("H001")).unwrap();
        assert_eq!(view.total, Money::from_dollars(500));
        assert_eq!(view.breakdown, DenominationCounts::new(50, 20, 30));
    }

    #[test]
    fn test_second_claim_rejected_without_mutation() {
        let f = fixture();
        register_defaults(&f);
        let ledger = VoucherLedger::new(&f.storage, &f.catalog);
        let household = HouseholdId::new("H001");
        let tranche = TrancheId::new("May2025");

        ledger.claim(&household, &tranche).unwrap();
        let err = ledger.claim(&household, &tranche).unwrap_err();

        // Scenario B: second claim fails, balance unchanged at $500
        assert!(matches!(err, VoucherError::TrancheAlreadyClaimed { .. }));
        let view = ledger.balance(&household).unwrap();
        assert_eq!(view.total, Money::from_dollars(500));
    }

    #[test]
    fn test_claims_of_distinct_tranches_accumulate() {
        let f = fixture();
        register_defaults(&f);
        let ledger = VoucherLedger::new(&f.storage, &f.catalog);
        let household = HouseholdId::new("H001");

        ledger.claim(&household, &TrancheId::new("May2025")).unwrap();
        ledger.claim(&household, &TrancheId::new("Jan2026")).unwrap();

        let view = ledger.balance(&household).unwrap();
        assert_eq!(view.total, Money::from_dollars(770));
    }

    #[test]
    fn test_claim_unknown_tranche() {
        let f = fixture();
        register_defaults(&f);
        let ledger = VoucherLedger::new(&f.storage, &f.catalog);

        let err = ledger
            .claim(&HouseholdId::new("H001"), &TrancheId::new("Nov2030"))
            .unwrap_err();
        assert!(matches!(err, VoucherError::UnknownTranche(_)));
    }

    #[test]
    fn test_claim_unknown_household() {
        let f = fixture();
        register_defaults(&f);
        let ledger = VoucherLedger::new(&f.storage, &f.catalog);

        let err = ledger
            .claim(&HouseholdId::new("H999"), &TrancheId::new("May2025"))
            .unwrap_err();
        assert!(matches!(err, VoucherError::UnknownHousehold(_)));
    }

    #[test]
    fn test_redeem_amount_conserves_balance() {
        let f = fixture();
        register_defaults(&f);
        let ledger = VoucherLedger::new(&f.storage, &f.catalog);
        let household = HouseholdId::new("H001");
        ledger.claim(&household, &TrancheId::new("May2025")).unwrap();

        // Scenario C: $23 has an exact combination
        let outcome = ledger
            .redeem(
                &household,
                &MerchantId::new("M803"),
                &RedemptionRequest::Amount {
                    target: Money::from_dollars(23),
                },
                tx_time(),
            )
            .unwrap();

        assert_eq!(outcome.amount, Money::from_dollars(23));
        assert_eq!(outcome.new_balance, Money::from_dollars(477));
        assert_eq!(outcome.breakdown.total_value(), Money::from_dollars(23));

        let view = ledger.balance(&household).unwrap();
        assert_eq!(view.total, Money::from_dollars(477));
    }

    #[test]
    fn test_redeem_infeasible_amount() {
        let f = fixture();
        register_defaults(&f);
        let ledger = VoucherLedger::new(&f.storage, &f.catalog);
        let household = HouseholdId::new("H001");
        ledger.claim(&household, &TrancheId::new("May2025")).unwrap();

        // Scenario D: $1 is below the smallest denomination
        let err = ledger
            .redeem(
                &household,
                &MerchantId::new("M803"),
                &RedemptionRequest::Amount {
                    target: Money::from_dollars(1),
                },
                tx_time(),
            )
            .unwrap_err();

        assert!(matches!(err, VoucherError::NoFeasibleCombination(_)));
        let view = ledger.balance(&household).unwrap();
        assert_eq!(view.total, Money::from_dollars(500));
    }

    #[test]
    fn test_redeem_unknown_merchant() {
        let f = fixture();
        register_defaults(&f);
        let ledger = VoucherLedger::new(&f.storage, &f.catalog);
        let household = HouseholdId::new("H001");
        ledger.claim(&household, &TrancheId::new("May2025")).unwrap();

        let err = ledger
            .redeem(
                &household,
                &MerchantId::new("M999"),
                &RedemptionRequest::Amount {
                    target: Money::from_dollars(10),
                },
                tx_time(),
            )
            .unwrap_err();
        assert!(matches!(err, VoucherError::UnknownMerchant(_)));
    }

    #[test]
    fn test_redeem_writes_audit_bucket() {
        let f = fixture();
        register_defaults(&f);
        let ledger = VoucherLedger::new(&f.storage, &f.catalog);
        let household = HouseholdId::new("H001");
        ledger.claim(&household, &TrancheId::new("May2025")).unwrap();

        // Scenario E: two $5 vouchers in one transaction
        let outcome = ledger
            .redeem(
                &household,
                &MerchantId::new("M803"),
                &RedemptionRequest::FixedCounts {
                    counts: DenominationCounts::new(0, 2, 0),
                },
                tx_time(),
            )
            .unwrap();

        assert!(outcome.audit_bucket.ends_with("Redeem2025060114.csv"));
        let compiler = AuditCompiler::new(f.storage.paths().audit_dir());
        let rows = compiler.read_bucket(&outcome.audit_bucket).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].remarks, "1");
        assert_eq!(rows[1].remarks, "Final denomination used");
    }

    #[test]
    fn test_audit_failure_keeps_redemption_committed() {
        let f = fixture();
        register_defaults(&f);
        let ledger = VoucherLedger::new(&f.storage, &f.catalog);
        let household = HouseholdId::new("H001");
        ledger.claim(&household, &TrancheId::new("May2025")).unwrap();

        // Break the audit dir: a file at its path makes every append fail
        let audit_dir = f.storage.paths().audit_dir();
        std::fs::remove_dir_all(&audit_dir).unwrap();
        std::fs::write(&audit_dir, b"").unwrap();

        let err = ledger
            .redeem(
                &household,
                &MerchantId::new("M803"),
                &RedemptionRequest::FixedCounts {
                    counts: DenominationCounts::new(0, 0, 1),
                },
                tx_time(),
            )
            .unwrap_err();
        assert!(matches!(err, VoucherError::Persistence(_)));

        // The ledger mutation committed before the audit append; the failure
        // degrades durability, it does not roll back.
        let after = f.storage.households.get(&household).unwrap().unwrap();
        assert_eq!(after.balance, Money::from_dollars(490));
        let used = after
            .vouchers
            .iter()
            .filter(|v| v.status == crate::models::VoucherStatus::Used)
            .count();
        assert_eq!(used, 1);
        assert!(after.balance_is_consistent());
    }

    #[test]
    fn test_explicit_redeem_marks_exactly_those_vouchers() {
        let f = fixture();
        register_defaults(&f);
        let ledger = VoucherLedger::new(&f.storage, &f.catalog);
        let household = HouseholdId::new("H001");
        ledger.claim(&household, &TrancheId::new("May2025")).unwrap();

        let snapshot = f.storage.households.get(&household).unwrap().unwrap();
        let ids: Vec<_> = snapshot
            .vouchers
            .iter()
            .filter(|v| v.denomination == crate::models::Denomination::Ten)
            .take(2)
            .map(|v| v.id)
            .collect();

        let outcome = ledger
            .redeem(
                &household,
                &MerchantId::new("M803"),
                &RedemptionRequest::Explicit {
                    voucher_ids: ids.clone(),
                },
                tx_time(),
            )
            .unwrap();

        assert_eq!(outcome.amount, Money::from_dollars(20));
        let after = f.storage.households.get(&household).unwrap().unwrap();
        for id in ids {
            assert!(!after.voucher(id).unwrap().is_active());
        }
        assert!(after.balance_is_consistent());
    }

    #[test]
    fn test_stale_selection_rejected_at_commit() {
        let f = fixture();
        register_defaults(&f);
        let ledger = VoucherLedger::new(&f.storage, &f.catalog);
        let household = HouseholdId::new("H001");
        ledger.claim(&household, &TrancheId::new("May2025")).unwrap();

        let snapshot = f.storage.households.get(&household).unwrap().unwrap();
        let id = snapshot.vouchers[0].id;

        // First redemption consumes the voucher; the replayed explicit
        // request loses the race and must commit nothing.
        ledger
            .redeem(
                &household,
                &MerchantId::new("M803"),
                &RedemptionRequest::Explicit {
                    voucher_ids: vec![id],
                },
                tx_time(),
            )
            .unwrap();

        let balance_before = ledger.balance(&household).unwrap().total;
        let err = ledger
            .redeem(
                &household,
                &MerchantId::new("M803"),
                &RedemptionRequest::Explicit {
                    voucher_ids: vec![id],
                },
                tx_time(),
            )
            .unwrap_err();

        assert!(matches!(err, VoucherError::InvalidSelection(_)));
        assert_eq!(ledger.balance(&household).unwrap().total, balance_before);
    }

    #[test]
    fn test_expire_sweep_idempotent() {
        let f = fixture();
        register_defaults(&f);

        // Catalog with an already-ended tranche
        let catalog = TrancheCatalog::from_definitions(vec![crate::models::TrancheDefinition {
            id: TrancheId::new("Pilot2024"),
            distribution: DenominationCounts::new(5, 2, 1),
            total_value: 30,
            expires_on: NaiveDate::from_ymd_opt(2024, 12, 31),
        }])
        .unwrap();
        let ledger = VoucherLedger::new(&f.storage, &catalog);
        let household = HouseholdId::new("H001");
        ledger.claim(&household, &TrancheId::new("Pilot2024")).unwrap();
        assert_eq!(
            ledger.balance(&household).unwrap().total,
            Money::from_dollars(30)
        );

        let as_of = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        assert_eq!(ledger.expire_sweep(as_of).unwrap(), 8);
        assert_eq!(ledger.balance(&household).unwrap().total, Money::zero());

        // Second sweep finds nothing
        assert_eq!(ledger.expire_sweep(as_of).unwrap(), 0);
    }

    #[test]
    fn test_expire_sweep_before_expiry_is_noop() {
        let f = fixture();
        register_defaults(&f);
        let catalog = TrancheCatalog::from_definitions(vec![crate::models::TrancheDefinition {
            id: TrancheId::new("Pilot2024"),
            distribution: DenominationCounts::new(5, 2, 1),
            total_value: 30,
            expires_on: NaiveDate::from_ymd_opt(2024, 12, 31),
        }])
        .unwrap();
        let ledger = VoucherLedger::new(&f.storage, &catalog);
        let household = HouseholdId::new("H001");
        ledger.claim(&household, &TrancheId::new("Pilot2024")).unwrap();

        let as_of = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        assert_eq!(ledger.expire_sweep(as_of).unwrap(), 0);
        assert_eq!(
            ledger.balance(&household).unwrap().total,
            Money::from_dollars(30)
        );
    }

    #[test]
    fn test_used_vouchers_survive_expiry_sweep() {
        let f = fixture();
        register_defaults(&f);
        let catalog = TrancheCatalog::from_definitions(vec![crate::models::TrancheDefinition {
            id: TrancheId::new("Pilot2024"),
            distribution: DenominationCounts::new(0, 0, 2),
            total_value: 20,
            expires_on: NaiveDate::from_ymd_opt(2025, 6, 30),
        }])
        .unwrap();
        let ledger = VoucherLedger::new(&f.storage, &catalog);
        let household = HouseholdId::new("H001");
        ledger.claim(&household, &TrancheId::new("Pilot2024")).unwrap();

        ledger
            .redeem(
                &household,
                &MerchantId::new("M803"),
                &RedemptionRequest::FixedCounts {
                    counts: DenominationCounts::new(0, 0, 1),
                },
                tx_time(),
            )
            .unwrap();

        // Sweep past expiry: only the remaining active voucher lapses
        let expired = ledger
            .expire_sweep(NaiveDate::from_ymd_opt(2025, 7, 1).unwrap())
            .unwrap();
        assert_eq!(expired, 1);

        let after = f.storage.households.get(&household).unwrap().unwrap();
        let used = after
            .vouchers
            .iter()
            .filter(|v| v.status == crate::models::VoucherStatus::Used)
            .count();
        assert_eq!(used, 1);
        assert!(after.balance_is_consistent());
    }
}
