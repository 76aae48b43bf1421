//! Hour-bucketed audit trail for committed redemptions
//!
//! Every redeem commit produces one CSV row per voucher consumed, appended
//! to the bucket for the transaction's hour.

pub mod compiler;
pub mod row;

pub use compiler::{hour_key, AuditCompiler};
pub use row::{rows_for, AuditRow, FINAL_REMARK, TIMESTAMP_FORMAT};
