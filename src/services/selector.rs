//! Redemption selector
//!
//! Decides which vouchers satisfy a redemption request without touching the
//! ledger. Three modes: explicit voucher ids, fixed per-denomination counts,
//! and the balanced-suggestion search for a target amount. The selector runs
//! outside any lock; the ledger re-validates its output at commit time.

use std::collections::HashSet;

use crate::error::{VoucherError, VoucherResult};
use crate::models::{Denomination, DenominationCounts, Household, Money, VoucherId};

/// A redemption request in one of the three selection modes
#[derive(Debug, Clone)]
pub enum RedemptionRequest {
    /// Redeem exactly these vouchers
    Explicit { voucher_ids: Vec<VoucherId> },
    /// Redeem a caller-chosen count per denomination
    FixedCounts { counts: DenominationCounts },
    /// Find the combination closest to (but not over) the target amount
    Amount { target: Money },
}

/// A concrete proposal: which vouchers to consume and what they are worth
#[derive(Debug, Clone)]
pub struct Selection {
    /// Voucher ids in consumption order, grouped by descending denomination
    pub voucher_ids: Vec<VoucherId>,
    /// Per-denomination breakdown of the proposal
    pub counts: DenominationCounts,
    /// Total value of the proposal
    pub amount: Money,
}

/// A denomination combination found by the balanced-suggestion search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalancedCombo {
    pub counts: DenominationCounts,
    pub achieved: Money,
}

/// Produce a selection from a household's current active inventory
///
/// Read-only: availability may change before commit, so the ledger must
/// re-validate the returned voucher ids under the household lock.
pub fn select(household: &Household, request: &RedemptionRequest) -> VoucherResult<Selection> {
    match request {
        RedemptionRequest::Explicit { voucher_ids } => select_explicit(household, voucher_ids),
        RedemptionRequest::FixedCounts { counts } => select_fixed(household, *counts),
        RedemptionRequest::Amount { target } => select_amount(household, *target),
    }
}

/// Explicit mode: every id must be owned by the household and active
fn select_explicit(household: &Household, voucher_ids: &[VoucherId]) -> VoucherResult<Selection> {
    if voucher_ids.is_empty() {
        return Err(VoucherError::InvalidSelection(
            "no voucher ids supplied".into(),
        ));
    }

    let mut seen = HashSet::new();
    let mut counts = DenominationCounts::default();

    for id in voucher_ids {
        if !seen.insert(*id) {
            return Err(VoucherError::InvalidSelection(format!(
                "voucher {} listed twice",
                id
            )));
        }
        match household.voucher(*id) {
            Some(v) if v.is_active() => counts.add(v.denomination, 1),
            Some(v) => {
                return Err(VoucherError::InvalidSelection(format!(
                    "voucher {} is {}, not active",
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

    Ok(Selection {
        voucher_ids: voucher_ids.to_vec(),
        counts,
        amount: counts.total_value(),
    })
}

/// Fixed-count mode: vouchers are fungible within a denomination, so any
/// subset of the right size per tier is acceptable
fn select_fixed(household: &Household, counts: DenominationCounts) -> VoucherResult<Selection> {
    if counts.is_empty() {
        return Err(VoucherError::InvalidSelection(
            "no denomination counts supplied".into(),
        ));
    }

    let available = household.active_counts();
    for (denomination, requested) in counts.iter() {
        if requested > available.get(denomination) {
            return Err(VoucherError::InsufficientBalance {
                denomination: denomination.to_string(),
                requested,
                available: available.get(denomination),
            });
        }
    }

    Ok(Selection {
        voucher_ids: pick_active(household, counts),
        counts,
        amount: counts.total_value(),
    })
}

/// Amount mode: balanced-suggestion search, then pick concrete vouchers
fn select_amount(household: &Household, target: Money) -> VoucherResult<Selection> {
    let available = household.active_counts();
    let combo = suggest_balanced(target, &available)
        .ok_or(VoucherError::NoFeasibleCombination(target))?;

    Ok(Selection {
        voucher_ids: pick_active(household, combo.counts),
        counts: combo.counts,
        amount: combo.achieved,
    })
}

/// Pick concrete active voucher ids for the given counts, descending tier
/// order; assumes availability was already checked
fn pick_active(household: &Household, counts: DenominationCounts) -> Vec<VoucherId> {
    let mut ids = Vec::with_capacity(counts.total_count() as usize);
    for (denomination, count) in counts.iter() {
        ids.extend(
            household
                .vouchers
                .iter()
                .filter(|v| v.is_active() && v.denomination == denomination)
                .take(count as usize)
                .map(|v| v.id),
        );
    }
    ids
}

/// Find the denomination combination whose value is closest to, but not
/// over, the target
///
/// The target is first capped at the total spendable value. Ties break
/// lexicographically: smallest leftover, then fewest vouchers, then the
/// smallest mix-imbalance (L2 distance between the pre- and post-redemption
/// denomination share vectors, so the remaining inventory keeps roughly the
/// same composition). Exhaustive over the three-tier space, with each loop
/// bounded by availability and the remaining capped amount.
///
/// Returns `None` when no combination achieves a positive amount.
pub fn suggest_balanced(target: Money, available: &DenominationCounts) -> Option<BalancedCombo> {
    if !target.is_positive() {
        return None;
    }

    let cap = target.min(available.total_value());
    let cap_cents = cap.cents();

    let mut best: Option<(i64, u32, f64, DenominationCounts)> = None;

    let max_tens = (available.tens as i64).min(cap_cents / 1000);
    for tens in 0..=max_tens {
        let after_tens = cap_cents - tens * 1000;
        let max_fives = (available.fives as i64).min(after_tens / 500);
        for fives in 0..=max_fives {
            let after_fives = after_tens - fives * 500;
            let max_twos = (available.twos as i64).min(after_fives / 200);
            for twos in 0..=max_twos {
                let achieved = tens * 1000 + fives * 500 + twos * 200;
                if achieved <= 0 {
                    continue;
                }

                let used =
                    DenominationCounts::new(twos as u32, fives as u32, tens as u32);
                let leftover = cap_cents - achieved;
                let score = (
                    leftover,
                    used.total_count(),
                    imbalance_score(available, &used),
                );

                let improves = match &best {
                    None => true,
                    Some((l, n, s, _)) => {
                        score.0 < *l
                            || (score.0 == *l && score.1 < *n)
                            || (score.0 == *l && score.1 == *n && score.2 < *s)
                    }
                };
                if improves {
                    best = Some((score.0, score.1, score.2, used));
                }
            }
        }
    }

    best.map(|(_, _, _, counts)| BalancedCombo {
        counts,
        achieved: counts.total_value(),
    })
}

/// L2 distance between the original and post-redemption share vectors
///
/// Shares are `count[d] / total_count`, the zero vector when the total is
/// zero.
fn imbalance_score(original: &DenominationCounts, used: &DenominationCounts) -> f64 {
    let remaining = DenominationCounts::new(
        original.twos - used.twos,
        original.fives - used.fives,
        original.tens - used.tens,
    );

    let shares = |counts: &DenominationCounts| -> [f64; 3] {
        let total = counts.total_count();
        if total == 0 {
            return [0.0; 3];
        }
        let mut out = [0.0; 3];
        for (i, d) in Denomination::DESCENDING.iter().enumerate() {
            out[i] = counts.get(*d) as f64 / total as f64;
        }
        out
    };

    let before = shares(original);
    let after = shares(&remaining);

    before
        .iter()
        .zip(after.iter())
        .map(|(a, b)| (a - b) * (a - b))
        .sum::<f64>()
        .sqrt()
}
