//! Audit trail CLI commands

use chrono::NaiveDate;
use clap::Args;

use crate::audit::AuditCompiler;
use crate::catalog::TrancheCatalog;
use crate::error::{VoucherError, VoucherResult};
use crate::services::VoucherLedger;
use crate::storage::Storage;

/// Arguments for `voucher export-hour`
#[derive(Args)]
pub struct ExportHourArgs {
    /// Bucket date, "YYYY-MM-DD"
    pub date: String,
    /// Bucket hour, 0..=23
    pub hour: u32,
    /// Print the bucket contents instead of just its path
    #[arg(long)]
    pub show: bool,
}

pub fn handle_export_hour(
    storage: &Storage,
    catalog: &TrancheCatalog,
    args: ExportHourArgs,
) -> VoucherResult<()> {
    let date = NaiveDate::parse_from_str(&args.date, "%Y-%m-%d")
        .map_err(|e| VoucherError::Validation(format!("Invalid date '{}': {}", args.date, e)))?;

    let ledger = VoucherLedger::new(storage, catalog);
    let path = ledger.export_hour(date, args.hour)?;
    println!("{}", path.display());

    if args.show {
        let compiler = AuditCompiler::new(storage.paths().audit_dir());
        for row in compiler.read_bucket(&path)? {
            println!(
                "{},{},{},{},{},{},{},{},{}",
                row.transaction_id,
                row.household_id,
                row.merchant_id,
                row.transaction_date_time,
                row.voucher_code,
                row.denomination_used,
                row.amount_redeemed,
                row.payment_status,
                row.remarks,
            );
        }
    }

    Ok(())
}
