//! Audit row layout and remark sequencing
//!
//! One row per voucher consumed. Field order is fixed; downstream
//! reconciliation consumes these files positionally.

use serde::{Deserialize, Serialize};

use crate::models::{Money, RedemptionRecord};

/// Marker carried by the last row of each denomination group
pub const FINAL_REMARK: &str = "Final denomination used";

/// strftime format for the Transaction_Date_Time column
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One line item in an hourly audit bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRow {
    #[serde(rename = "Transaction_ID")]
    pub transaction_id: String,

    #[serde(rename = "Household_ID")]
    pub household_id: String,

    #[serde(rename = "Merchant_ID")]
    pub merchant_id: String,

    #[serde(rename = "Transaction_Date_Time")]
    pub transaction_date_time: String,

    #[serde(rename = "Voucher_Code")]
    pub voucher_code: String,

    /// Face value of this voucher, currency-formatted
    #[serde(rename = "Denomination_Used")]
    pub denomination_used: String,

    /// Denomination x group size, repeated on every row of the group
    #[serde(rename = "Amount_Redeemed")]
    pub amount_redeemed: String,

    #[serde(rename = "Payment_Status")]
    pub payment_status: String,

    /// Within a denomination group of size N: "1".."N-1", then the final
    /// marker on row N
    #[serde(rename = "Remarks")]
    pub remarks: String,
}

/// Expand a committed redemption into its audit rows
///
/// Groups are emitted in the record's order (descending denomination);
/// within each group, rows follow consumption order.
pub fn rows_for(record: &RedemptionRecord) -> Vec<AuditRow> {
    let timestamp = record.timestamp.format(TIMESTAMP_FORMAT).to_string();
    let mut rows = Vec::with_capacity(record.voucher_count() as usize);

    for group in &record.groups {
        let count = group.voucher_ids.len();
        let group_amount: Money = group.amount();

        for (idx, voucher_id) in group.voucher_ids.iter().enumerate() {
            let remarks = if idx + 1 == count {
                FINAL_REMARK.to_string()
            } else {
                (idx + 1).to_string()
            };

            rows.push(AuditRow {
                transaction_id: record.transaction_id.to_string(),
                household_id: record.household_id.to_string(),
                merchant_id: record.merchant_id.to_string(),
                transaction_date_time: timestamp.clone(),
                voucher_code: voucher_id.to_string(),
                denomination_used: group.denomination.value().to_string(),
                amount_redeemed: group_amount.to_string(),
                payment_status: record.payment_status.to_string(),
                remarks,
            });
        }
    }

    rows
}
