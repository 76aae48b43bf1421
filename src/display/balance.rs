//! Balance display formatting

use crate::models::{Household, Money};
use crate::services::BalanceView;

/// Format a household's balance with its per-denomination breakdown
pub fn format_balance(household_id: &str, view: &BalanceView) -> String {
    let mut output = String::new();
    output.push_str(&format!("Household {}\n", household_id));
    output.push_str(&format!("{:<14}  {:>8}  {:>10}\n", "Denomination", "Count", "Value"));
    output.push_str(&format!("{:-<14}  {:->8}  {:->10}\n", "", "", ""));

    for (denomination, count) in view.breakdown.iter() {
        let value = Money::from_cents(denomination.value().cents() * count as i64);
        output.push_str(&format!(
            "{:<14}  {:>8}  {:>10}\n",
            format!("${}", denomination.dollars()),
            count,
            value.to_string(),
        ));
    }

    output.push_str(&format!(
        "{:<14}  {:>8}  {:>10}\n",
        "Total",
        view.breakdown.total_count(),
        view.total.to_string(),
    ));
    output
}

/// Format all registered households as a table
pub fn format_household_list(households: &[Household]) -> String {
    if households.is_empty() {
        return "No households registered.\n".to_string();
    }

    let id_width = households
        .iter()
        .map(|h| h.id.as_str().len())
        .max()
        .unwrap_or(2)
        .max(2);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<id_width$}  {:>7}  {:>10}  {:>8}  {}\n",
        "Id",
        "Members",
        "Balance",
        "Tranches",
        "Registered",
        id_width = id_width,
    ));
    output.push_str(&format!(
        "{:-<id_width$}  {:->7}  {:->10}  {:->8}  {:-<10}\n",
        "",
        "",
        "",
        "",
        "",
        id_width = id_width,
    ));

    for household in households {
        output.push_str(&format!(
            "{:<id_width$}  {:>7}  {:>10}  {:>8}  {}\n",
            household.id.as_str(),
            household.members.len(),
            household.balance.to_string(),
            household.claimed_tranches.len(),
            household.registered_on.format("%Y-%m-%d"),
            id_width = id_width,
        ));
    }

    output
}
