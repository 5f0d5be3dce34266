use super::calculator::PaymentType;
use super::ids::OrderId;
use super::money::Money;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentStatus {
    Pending,
    Confirmed,
}

/// A payment the gateway has been asked to collect but has not yet confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub reference: String,
    pub order_id: OrderId,
    pub payment_type: PaymentType,
    pub amount_due: Money,
    pub payment_link: String,
    pub status: IntentStatus,
    pub created_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
}

impl PaymentIntent {
    pub fn is_pending(&self) -> bool {
        self.status == IntentStatus::Pending
    }

    pub fn mark_confirmed(&mut self, now: DateTime<Utc>) {
        self.status = IntentStatus::Confirmed;
        self.confirmed_at = Some(now);
    }
}
