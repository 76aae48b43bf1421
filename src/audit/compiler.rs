//! Audit compiler
//!
//! Appends committed redemptions to hour-keyed CSV buckets
//! (`Redeem{YYYYMMDDHH}.csv`). Buckets are append-only: the header is
//! written once when the bucket is created, and re-recording the same
//! redemption appends nothing. The bucket key derives from the
//! transaction's commit time, never from wall clock at audit time.

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{VoucherError, VoucherResult};
use crate::models::RedemptionRecord;

use super::row::{rows_for, AuditRow};

/// Bucket key for a transaction timestamp: YYYYMMDDHH
pub fn hour_key(timestamp: NaiveDateTime) -> String {
    timestamp.format("%Y%m%d%H").to_string()
}

/// Compiles committed redemptions into hourly audit buckets
pub struct AuditCompiler {
    audit_dir: PathBuf,
    /// Serializes the read-check-append sequence. The household lock only
    /// covers one household; commits for different households can target
    /// the same hour bucket, and without this lock both could observe a
    /// missing bucket and each write a header row.
    append_lock: Mutex<()>,
}

impl AuditCompiler {
    pub fn new(audit_dir: PathBuf) -> Self {
        Self {
            audit_dir,
            append_lock: Mutex::new(()),
        }
    }

    /// Path of the bucket for the given key
    pub fn bucket_path(&self, key: &str) -> PathBuf {
        self.audit_dir.join(format!("Redeem{}.csv", key))
    }

    /// Append a committed redemption to its hour bucket
    ///
    /// Rows already present in the bucket (same transaction id and voucher
    /// code) are skipped, so replaying a redemption result is a no-op. The
    /// append is retried once before surfacing `Persistence`.
    pub fn record(&self, record: &RedemptionRecord) -> VoucherResult<PathBuf> {
        let key = hour_key(record.timestamp);
        let path = self.bucket_path(&key);
        let rows = rows_for(record);

        match self.append_new_rows(&path, &rows) {
            Ok(()) => Ok(path),
            Err(_) => {
                // One retry; the ledger mutation is already committed, so a
                // second failure degrades durability rather than rolling back.
                self.append_new_rows(&path, &rows)
                    .map_err(|e| VoucherError::Persistence(e.to_string()))?;
                Ok(path)
            }
        }
    }

    /// Retrieve the compiled bucket for a given date and hour
    pub fn export_hour(&self, date: NaiveDate, hour: u32) -> VoucherResult<PathBuf> {
        if hour > 23 {
            return Err(VoucherError::Validation(format!(
                "hour must be 0-23, got {}",
                hour
            )));
        }

        let key = format!("{}{:02}", date.format("%Y%m%d"), hour);
        let path = self.bucket_path(&key);
        if !path.exists() {
            return Err(VoucherError::Validation(format!(
                "no audit bucket for {}",
                key
            )));
        }
        Ok(path)
    }

    /// Read all rows of a bucket, oldest first
    pub fn read_bucket(&self, path: &Path) -> VoucherResult<Vec<AuditRow>> {
        if !path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(path)
            .map_err(|e| VoucherError::Io(format!("Failed to open {}: {}", path.display(), e)))?;

        let mut rows = Vec::new();
        for result in reader.deserialize() {
            let row: AuditRow = result.map_err(|e| {
                VoucherError::Io(format!("Failed to parse {}: {}", path.display(), e))
            })?;
            rows.push(row);
        }
        Ok(rows)
    }

    fn append_new_rows(&self, path: &Path, rows: &[AuditRow]) -> VoucherResult<()> {
        let _guard = self
            .append_lock
            .lock()
            .map_err(|e| VoucherError::Storage(format!("Audit lock poisoned: {}", e)))?;

        std::fs::create_dir_all(&self.audit_dir)
            .map_err(|e| VoucherError::Io(format!("Failed to create audit dir: {}", e)))?;

        // Replay guard: skip rows the bucket already holds
        let existing: HashSet<(String, String)> = self
            .read_bucket(path)?
            .into_iter()
            .map(|r| (r.transaction_id, r.voucher_code))
            .collect();

        let new_rows: Vec<&AuditRow> = rows
            .iter()
            .filter(|r| !existing.contains(&(r.transaction_id.clone(), r.voucher_code.clone())))
            .collect();

        if new_rows.is_empty() {
            return Ok(());
        }

        let bucket_exists = path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| VoucherError::Io(format!("Failed to open {}: {}", path.display(), e)))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(!bucket_exists)
            .from_writer(file);

        for row in new_rows {
            writer
                .serialize(row)
                .map_err(|e| VoucherError::Io(format!("Failed to write audit row: {}", e)))?;
        }

        writer
            .flush()
            .map_err(|e| VoucherError::Io(format!("Failed to flush audit bucket: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Denomination, HouseholdId, MerchantId, PaymentStatus, RedemptionGroup, RedemptionRecord,
        TransactionId, VoucherId,
    };
    use tempfile::TempDir;

    fn sample_record(hour: u32) -> RedemptionRecord {
        RedemptionRecord {
            transaction_id: TransactionId::new(),
            household_id: HouseholdId::new("H001"),
            merchant_id: MerchantId::new("M803"),
            timestamp: NaiveDate::from_ymd_opt(2025, 6, 1)
                .unwrap()
                .and_hms_opt(hour, 15, 0)
                .unwrap(),
            groups: vec![RedemptionGroup {
                denomination: Denomination::Five,
                voucher_ids: vec![VoucherId::new(), VoucherId::new()],
            }],
            payment_status: PaymentStatus::Completed,
        }
    }

    fn create_compiler() -> (AuditCompiler, TempDir) {
        let temp = TempDir::new().unwrap();
        (AuditCompiler::new(temp.path().join("redemptions")), temp)
    }

    #[test]
    fn test_hour_key() {
        let ts = NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(14, 59, 59)
            .unwrap();
        assert_eq!(hour_key(ts), "2025060114");
    }

    #[test]
    fn test_record_creates_hour_bucket() {
        let (compiler, _temp) = create_compiler();
        let path = compiler.record(&sample_record(14)).unwrap();

        assert!(path.ends_with("Redeem2025060114.csv"));
        let rows = compiler.read_bucket(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].remarks, "1");
        assert_eq!(rows[1].remarks, "Final denomination used");
    }

    #[test]
    fn test_same_hour_appends_without_second_header() {
        let (compiler, _temp) = create_compiler();
        let first = sample_record(14);
        let second = sample_record(14);

        let path = compiler.record(&first).unwrap();
        compiler.record(&second).unwrap();

        let rows = compiler.read_bucket(&path).unwrap();
        assert_eq!(rows.len(), 4);

        // Exactly one header line in the raw file
        let raw = std::fs::read_to_string(&path).unwrap();
        let header_count = raw.lines().filter(|l| l.starts_with("Transaction_ID")).count();
        assert_eq!(header_count, 1);
    }

    #[test]
    fn test_different_hours_use_different_buckets() {
        let (compiler, _temp) = create_compiler();
        let path_a = compiler.record(&sample_record(9)).unwrap();
        let path_b = compiler.record(&sample_record(10)).unwrap();
        assert_ne!(path_a, path_b);
    }

    #[test]
    fn test_replay_is_idempotent() {
        let (compiler, _temp) = create_compiler();
        let record = sample_record(14);

        let path = compiler.record(&record).unwrap();
        compiler.record(&record).unwrap();
        compiler.record(&record).unwrap();

        let rows = compiler.read_bucket(&path).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_export_hour() {
        let (compiler, _temp) = create_compiler();
        compiler.record(&sample_record(14)).unwrap();

        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let path = compiler.export_hour(date, 14).unwrap();
        assert!(path.exists());

        assert!(compiler.export_hour(date, 3).is_err());
        assert!(compiler.export_hour(date, 99).is_err());
    }

    #[test]
    fn test_concurrent_same_bucket_commits_write_one_header() {
        use std::sync::{Arc, Barrier};

        let temp = TempDir::new().unwrap();
        let compiler = Arc::new(AuditCompiler::new(temp.path().join("redemptions")));
        let barrier = Arc::new(Barrier::new(2));

        // Two households committing into the same hour from separate threads
        let handles: Vec<_> = (0..2)
            .map(|_| {
                let compiler = Arc::clone(&compiler);
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    let record = sample_record(14);
                    barrier.wait();
                    compiler.record(&record).unwrap()
                })
            })
            .collect();

        let path = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .next()
            .unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let header_count = raw
            .lines()
            .filter(|l| l.starts_with("Transaction_ID"))
            .count();
        assert_eq!(header_count, 1);

        let rows = compiler.read_bucket(&path).unwrap();
        assert_eq!(rows.len(), 4);
    }

    #[test]
    fn test_field_order() {
        let (compiler, _temp) = create_compiler();
        let path = compiler.record(&sample_record(14)).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let header = raw.lines().next().unwrap();
        assert_eq!(
            header,
            "Transaction_ID,Household_ID,Merchant_ID,Transaction_Date_Time,\
             Voucher_Code,Denomination_Used,Amount_Redeemed,Payment_Status,Remarks"
        );
    }
}
