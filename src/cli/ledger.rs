//! Claim, balance, redeem and expiry CLI commands

use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::Args;

use crate::audit::TIMESTAMP_FORMAT;
use crate::catalog::TrancheCatalog;
use crate::display::{format_claim, format_redemption, format_suggestion};
use crate::error::{VoucherError, VoucherResult};
use crate::models::{DenominationCounts, HouseholdId, MerchantId, Money, TrancheId, VoucherId};
use crate::services::{selector, RedemptionRequest, VoucherLedger};
use crate::storage::Storage;

/// Arguments for `voucher claim`
#[derive(Args)]
pub struct ClaimArgs {
    /// Household id
    pub household: String,
    /// Tranche id (e.g. "May2025")
    pub tranche: String,
}

/// Arguments for `voucher redeem`
#[derive(Args)]
pub struct RedeemArgs {
    /// Household id
    pub household: String,
    /// Merchant id
    pub merchant: String,
    /// Target amount; the closest combination not exceeding it is chosen
    #[arg(short, long, conflicts_with_all = ["twos", "fives", "tens", "vouchers"])]
    pub amount: Option<String>,
    /// Number of $2 vouchers to redeem
    #[arg(long, default_value_t = 0, conflicts_with = "vouchers")]
    pub twos: u32,
    /// Number of $5 vouchers to redeem
    #[arg(long, default_value_t = 0, conflicts_with = "vouchers")]
    pub fives: u32,
    /// Number of $10 vouchers to redeem
    #[arg(long, default_value_t = 0, conflicts_with = "vouchers")]
    pub tens: u32,
    /// Explicit voucher id; repeat to redeem several
    #[arg(short, long = "voucher")]
    pub vouchers: Vec<String>,
    /// Transaction timestamp, "YYYY-MM-DD HH:MM:SS" (defaults to now)
    #[arg(long)]
    pub at: Option<String>,
}

/// Arguments for `voucher suggest`
#[derive(Args)]
pub struct SuggestArgs {
    /// Household id
    pub household: String,
    /// Target amount
    pub amount: String,
}

/// Arguments for `voucher expire`
#[derive(Args)]
pub struct ExpireArgs {
    /// Sweep cutoff date, "YYYY-MM-DD" (defaults to today)
    #[arg(long)]
    pub as_of: Option<String>,
}

pub fn handle_claim(
    storage: &Storage,
    catalog: &TrancheCatalog,
    args: ClaimArgs,
) -> VoucherResult<()> {
    let ledger = VoucherLedger::new(storage, catalog);
    let outcome = ledger.claim(
        &HouseholdId::new(args.household),
        &TrancheId::new(args.tranche),
    )?;
    print!("{}", format_claim(&outcome));
    Ok(())
}

pub fn handle_redeem(
    storage: &Storage,
    catalog: &TrancheCatalog,
    args: RedeemArgs,
) -> VoucherResult<()> {
    let household_id = HouseholdId::new(&args.household);
    let request = build_request(storage, &household_id, &args)?;
    let at = parse_timestamp(args.at.as_deref())?;

    let ledger = VoucherLedger::new(storage, catalog);
    let outcome = ledger.redeem(&household_id, &MerchantId::new(args.merchant), &request, at)?;
    print!("{}", format_redemption(&outcome));
    Ok(())
}

pub fn handle_suggest(storage: &Storage, args: SuggestArgs) -> VoucherResult<()> {
    let household_id = HouseholdId::new(&args.household);
    let household = storage
        .households
        .get(&household_id)?
        .ok_or_else(|| VoucherError::UnknownHousehold(args.household.clone()))?;

    let target = parse_amount(&args.amount)?;
    let combo = selector::suggest_balanced(target, &household.active_counts())
        .ok_or(VoucherError::NoFeasibleCombination(target))?;
    print!("{}", format_suggestion(target, &combo));
    Ok(())
}

pub fn handle_expire(
    storage: &Storage,
    catalog: &TrancheCatalog,
    args: ExpireArgs,
) -> VoucherResult<()> {
    let as_of = match args.as_of.as_deref() {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| {
            VoucherError::Validation(format!("Invalid date '{}': {}", s, e))
        })?,
        None => Local::now().date_naive(),
    };

    let ledger = VoucherLedger::new(storage, catalog);
    let expired = ledger.expire_sweep(as_of)?;
    println!("Expired {} vouchers as of {}", expired, as_of.format("%Y-%m-%d"));
    Ok(())
}

fn build_request(
    storage: &Storage,
    household_id: &HouseholdId,
    args: &RedeemArgs,
) -> VoucherResult<RedemptionRequest> {
    if let Some(amount) = &args.amount {
        return Ok(RedemptionRequest::Amount {
            target: parse_amount(amount)?,
        });
    }

    if !args.vouchers.is_empty() {
        let household = storage
            .households
            .get(household_id)?
            .ok_or_else(|| VoucherError::UnknownHousehold(household_id.to_string()))?;
        let voucher_ids = args
            .vouchers
            .iter()
            .map(|raw| resolve_voucher_id(&household.vouchers, raw))
            .collect::<VoucherResult<Vec<_>>>()?;
        return Ok(RedemptionRequest::Explicit { voucher_ids });
    }

    let counts = DenominationCounts::new(args.twos, args.fives, args.tens);
    if counts.is_empty() {
        return Err(VoucherError::Validation(
            "Specify --amount, per-denomination counts, or --voucher ids".to_string(),
        ));
    }
    Ok(RedemptionRequest::FixedCounts { counts })
}

/// Resolve a CLI-supplied voucher id: full UUID or displayed short form
fn resolve_voucher_id(
    vouchers: &[crate::models::Voucher],
    raw: &str,
) -> VoucherResult<VoucherId> {
    if let Ok(id) = raw.parse::<VoucherId>() {
        return Ok(id);
    }

    let matches: Vec<VoucherId> = vouchers
        .iter()
        .filter(|v| v.id.to_string() == raw)
        .map(|v| v.id)
        .collect();
    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(VoucherError::InvalidSelection(format!(
            "No voucher matches '{}'",
            raw
        ))),
        _ => Err(VoucherError::InvalidSelection(format!(
            "Ambiguous voucher id '{}'; use the full UUID",
            raw
        ))),
    }
}

fn parse_amount(raw: &str) -> VoucherResult<Money> {
    Money::parse(raw)
        .map_err(|e| VoucherError::Validation(format!("Invalid amount '{}': {}", raw, e)))
}

fn parse_timestamp(raw: Option<&str>) -> VoucherResult<NaiveDateTime> {
    match raw {
        Some(s) => NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).map_err(|e| {
            VoucherError::Validation(format!("Invalid timestamp '{}': {}", s, e))
        }),
        None => Ok(Local::now().naive_local()),
    }
}
