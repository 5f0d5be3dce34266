use super::context::EscrowContext;
use crate::domain::events::NotificationEvent;
use crate::domain::ids::OrderId;
use crate::domain::money::{Amount, Money};
use crate::domain::order::Order;
use crate::domain::ports::InsertOutcome;
use crate::domain::remittance::RemittanceRecord;
use crate::error::{EscrowError, Result};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// An operator's instruction to release an order's funds to the organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemittanceRequest {
    pub order_id: OrderId,
    pub amount_remitted: Decimal,
    pub settlement_date: NaiveDate,
    pub operator_bank_name: String,
    pub operator_account_number: String,
    pub payment_evidence_url: String,
    pub processed_by: String,
}

impl RemittanceRequest {
    fn validate(&self, order: &Order) -> Result<Amount> {
        let amount = Amount::new(self.amount_remitted)?;
        if Money::from(amount) > order.total_amount_paid {
            return Err(EscrowError::validation(format!(
                "remittance of {} exceeds the {} paid on order {}",
                self.amount_remitted, order.total_amount_paid, order.id
            )));
        }
        for (field, value) in [
            ("operator bank name", &self.operator_bank_name),
            ("operator account number", &self.operator_account_number),
            ("payment evidence url", &self.payment_evidence_url),
            ("processed by", &self.processed_by),
        ] {
            if value.trim().is_empty() {
                return Err(EscrowError::validation(format!("{} is required", field)));
            }
        }
        Ok(amount)
    }

    /// Same remittance regardless of who retried it or when.
    fn describes(&self, record: &RemittanceRecord) -> bool {
        record.order_id == self.order_id
            && record.amount_remitted.value() == self.amount_remitted
            && record.settlement_date == self.settlement_date
            && record.operator_bank_name == self.operator_bank_name.trim()
            && record.operator_account_number == self.operator_account_number.trim()
            && record.payment_evidence_url == self.payment_evidence_url.trim()
    }
}

/// Releases collected funds to the organization once delivery is confirmed.
pub struct RemittanceService {
    ctx: Arc<EscrowContext>,
}

impl RemittanceService {
    pub fn new(ctx: Arc<EscrowContext>) -> Self {
        Self { ctx }
    }

    /// Creates the single remittance record of an order.
    ///
    /// A retry of a successful call returns the stored record; a different
    /// request for an already remitted order fails with `AlreadyExists`.
    #[instrument(
        name = "remittance.process",
        skip(self, request),
        fields(order_id = %request.order_id, amount = %request.amount_remitted),
        err
    )]
    pub async fn process_remittance(&self, request: RemittanceRequest) -> Result<RemittanceRecord> {
        let _guard = self.ctx.lock_order(&request.order_id).await?;
        let mut order = self.ctx.load_order(&request.order_id).await?;
        let amount = request.validate(&order)?;

        if let Some(existing) = self.ctx.stores.remittances.get(&order.id).await? {
            let record = replay(&request, existing)?;
            if order.organization_bank_details.is_none() {
                order.attach_bank_details(record.organization_bank.clone(), Utc::now());
                self.ctx.stores.orders.store(order).await?;
            }
            return Ok(record);
        }
        if self.ctx.stores.deliveries.get(&order.id).await?.is_none() {
            return Err(EscrowError::transition(format!(
                "order {} has no delivery confirmation",
                order.id
            )));
        }
        let profile = self
            .ctx
            .bounded(
                "bank profile lookup",
                self.ctx.stores.bank_profiles.get(&order.organization_id),
            )
            .await?
            .ok_or_else(|| EscrowError::MissingBankDetails(order.organization_id.to_string()))?;

        let now = Utc::now();
        let record = RemittanceRecord {
            order_id: order.id.clone(),
            organization_bank: profile.details.clone(),
            amount_remitted: amount,
            settlement_date: request.settlement_date,
            operator_bank_name: request.operator_bank_name.trim().to_string(),
            operator_account_number: request.operator_account_number.trim().to_string(),
            payment_evidence_url: request.payment_evidence_url.trim().to_string(),
            processed_by: request.processed_by.trim().to_string(),
            created_at: now,
        };
        // The order snapshot is persisted before the record; a replay treats
        // the record as complete.
        let before = order.clone();
        order.attach_bank_details(profile.details, now);
        self.ctx.stores.orders.store(order.clone()).await?;
        match self
            .ctx
            .stores
            .remittances
            .insert_if_absent(record.clone())
            .await
        {
            Ok(InsertOutcome::Inserted) => {}
            Ok(InsertOutcome::Existing(existing)) => {
                self.ctx.restore_order(before).await;
                return replay(&request, existing);
            }
            Err(e) => {
                self.ctx.restore_order(before).await;
                return Err(e);
            }
        }

        info!(organization_id = %order.organization_id, "remittance processed");
        self.ctx
            .notify(NotificationEvent::Settled {
                order_id: order.id.clone(),
                organization_id: order.organization_id.clone(),
                amount_remitted: amount,
                settlement_date: record.settlement_date,
            })
            .await;
        Ok(record)
    }

    pub async fn record(&self, order_id: &OrderId) -> Result<Option<RemittanceRecord>> {
        self.ctx.stores.remittances.get(order_id).await
    }
}

fn replay(request: &RemittanceRequest, existing: RemittanceRecord) -> Result<RemittanceRecord> {
    if request.describes(&existing) {
        debug!(order_id = %existing.order_id, "remittance replayed");
        Ok(existing)
    } else {
        Err(EscrowError::AlreadyExists(format!(
            "remittance for order {}",
            existing.order_id
        )))
    }
}
