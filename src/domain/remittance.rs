use super::bank_profile::BankDetails;
use super::ids::OrderId;
use super::money::Amount;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Immutable record of funds released from platform custody to an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemittanceRecord {
    pub order_id: OrderId,
    /// Snapshot of the organization account at the time of remittance.
    pub organization_bank: BankDetails,
    pub amount_remitted: Amount,
    pub settlement_date: NaiveDate,
    pub operator_bank_name: String,
    pub operator_account_number: String,
    pub payment_evidence_url: String,
    pub processed_by: String,
    pub created_at: DateTime<Utc>,
}
