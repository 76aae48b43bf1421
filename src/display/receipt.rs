//! Claim and redemption receipt formatting

use crate::models::Money;
use crate::services::{BalancedCombo, ClaimOutcome, RedemptionOutcome};

/// Format the outcome of a tranche claim
pub fn format_claim(outcome: &ClaimOutcome) -> String {
    let mut output = String::new();
    output.push_str(&format!("Claimed tranche {}\n", outcome.tranche_id));

    for (denomination, count) in outcome.issued.iter() {
        if count == 0 {
            continue;
        }
        output.push_str(&format!("  {:>4} x ${}\n", count, denomination.dollars()));
    }

    output.push_str(&format!(
        "Issued {} vouchers worth {}\n",
        outcome.issued.total_count(),
        outcome.issued.total_value(),
    ));
    output.push_str(&format!("New balance: {}\n", outcome.new_balance));
    output
}

/// Format a committed redemption receipt
pub fn format_redemption(outcome: &RedemptionOutcome) -> String {
    let mut output = String::new();
    output.push_str(&format!("Transaction {}\n", outcome.transaction_id));

    for (denomination, count) in outcome.breakdown.iter() {
        if count == 0 {
            continue;
        }
        output.push_str(&format!("  {:>4} x ${}\n", count, denomination.dollars()));
    }

    output.push_str(&format!("Amount redeemed: {}\n", outcome.amount));
    output.push_str(&format!("New balance: {}\n", outcome.new_balance));
    output.push_str(&format!("Audit trail: {}\n", outcome.audit_bucket.display()));
    output
}

/// Format a balanced suggestion without committing it
pub fn format_suggestion(target: Money, combo: &BalancedCombo) -> String {
    let mut output = String::new();
    output.push_str(&format!("Suggestion for {}:\n", target));

    for (denomination, count) in combo.counts.iter() {
        if count == 0 {
            continue;
        }
        output.push_str(&format!("  {:>4} x ${}\n", count, denomination.dollars()));
    }

    output.push_str(&format!("Covers {}", combo.achieved));
    let leftover = target - combo.achieved;
    if leftover.is_positive() {
        output.push_str(&format!(" ({} short of target)", leftover));
    }
    output.push('\n');
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DenominationCounts, TrancheId, TransactionId};
    use std::path::PathBuf;

    #[test]
    fn test_format_claim_skips_zero_tiers() {
        let outcome = ClaimOutcome {
            tranche_id: TrancheId::new("Jan2026"),
            issued: DenominationCounts::new(30, 0, 15),
            new_balance: Money::from_dollars(210),
        };
        let output = format_claim(&outcome);
        assert!(output.contains("30 x $2"));
        assert!(output.contains("15 x $10"));
        assert!(!output.contains("x $5"));
        assert!(output.contains("New balance: $210.00"));
    }

    #[test]
    fn test_format_redemption() {
        let outcome = RedemptionOutcome {
            transaction_id: TransactionId::new(),
            amount: Money::from_dollars(23),
            breakdown: DenominationCounts::new(4, 1, 1),
            new_balance: Money::from_dollars(477),
            audit_bucket: PathBuf::from("/tmp/Redeem2025060114.csv"),
        };
        let output = format_redemption(&outcome);
        assert!(output.contains("Amount redeemed: $23.00"));
        assert!(output.contains("Redeem2025060114.csv"));
    }

    #[test]
    fn test_format_suggestion_notes_shortfall() {
        let combo = BalancedCombo {
            counts: DenominationCounts::new(1, 0, 0),
            achieved: Money::from_dollars(2),
        };
        let output = format_suggestion(Money::from_dollars(3), &combo);
        assert!(output.contains("Covers $2.00"));
        assert!(output.contains("$1.00 short of target"));
    }
}
