use super::context::EscrowContext;
use crate::domain::bank_profile::BankDetails;
use crate::domain::calculator::PaymentType;
use crate::domain::events::NotificationEvent;
use crate::domain::ids::OrderId;
use crate::domain::money::{Amount, Money};
use crate::domain::order::{Order, OrderContext, SubServiceCharge};
use crate::domain::payment_intent::{IntentStatus, PaymentIntent};
use crate::domain::ports::PaymentMetadata;
use crate::error::{EscrowError, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// A customer's request to pay for an order, creating it on first use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub order: OrderContext,
    pub payment_type: PaymentType,
    #[serde(default)]
    pub sub_service_charges: Option<Vec<SubServiceCharge>>,
}

/// What the customer needs to complete a payment at the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInitiation {
    pub order_id: OrderId,
    pub payment_type: PaymentType,
    pub amount_due: Money,
    pub payment_reference: String,
    pub payment_link: String,
    /// The organization's registered account, for display only.
    pub organization_bank: Option<BankDetails>,
}

/// Validates payment requests against the order and records gateway confirmations.
pub struct PaymentIntake {
    ctx: Arc<EscrowContext>,
}

impl PaymentIntake {
    pub fn new(ctx: Arc<EscrowContext>) -> Self {
        Self { ctx }
    }

    /// Creates a pending payment intent; the order is not marked paid here.
    #[instrument(
        name = "payment.initiate",
        skip(self, request),
        fields(order_id = %request.order.order_id, payment_type = request.payment_type.as_str()),
        err
    )]
    pub async fn initiate_payment(&self, request: PaymentRequest) -> Result<PaymentInitiation> {
        request.order.validate()?;
        if let Some(charges) = &request.sub_service_charges
            && charges.iter().any(|c| c.code.trim().is_empty())
        {
            return Err(EscrowError::validation("sub-service code is required"));
        }

        let order_id = request.order.order_id.clone();
        let _guard = self.ctx.lock_order(&order_id).await?;

        let (order, is_new) = match self.ctx.stores.orders.get(&order_id).await? {
            Some(order) => {
                if !order.matches_context(&request.order) {
                    return Err(EscrowError::validation(format!(
                        "order context does not match existing order {}",
                        order_id
                    )));
                }
                if let Some(charges) = &request.sub_service_charges
                    && charges != &order.sub_service_charges
                {
                    return Err(EscrowError::validation(
                        "sub-service charges cannot change after the order is created",
                    ));
                }
                (order, false)
            }
            None => {
                let charges = request.sub_service_charges.clone().unwrap_or_default();
                let order = Order::new(request.order.clone(), request.payment_type, charges, Utc::now())?;
                (order, true)
            }
        };

        let amount_due = order.amount_due(request.payment_type)?;
        let organization_bank = self.display_bank_details(&order).await;

        let metadata = PaymentMetadata {
            order_id: order.id.clone(),
            customer_id: order.customer_id.clone(),
            organization_id: order.organization_id.clone(),
            payment_type: request.payment_type.as_str(),
        };
        let checkout = self
            .ctx
            .bounded("payment gateway", self.ctx.gateway.initiate(amount_due, metadata))
            .await?;

        let intent = PaymentIntent {
            reference: checkout.reference.clone(),
            order_id: order_id.clone(),
            payment_type: request.payment_type,
            amount_due,
            payment_link: checkout.link.clone(),
            status: IntentStatus::Pending,
            created_at: Utc::now(),
            confirmed_at: None,
        };
        if is_new {
            self.ctx.stores.orders.store(order).await?;
        }
        self.ctx.stores.intents.store(intent).await?;

        info!(%amount_due, reference = %checkout.reference, new_order = is_new, "payment initiated");
        Ok(PaymentInitiation {
            order_id,
            payment_type: request.payment_type,
            amount_due,
            payment_reference: checkout.reference,
            payment_link: checkout.link,
            organization_bank,
        })
    }

    /// Gateway callback: applies the confirmed amount to the order.
    ///
    /// A reference that was already confirmed returns the current order untouched.
    #[instrument(name = "payment.confirm", skip(self), err)]
    pub async fn confirm_payment(&self, reference: &str, amount_paid: Amount) -> Result<Order> {
        let order_id = self.find_intent(reference).await?.order_id;
        let _guard = self.ctx.lock_order(&order_id).await?;

        // Re-read under the lock; a concurrent callback may have confirmed it.
        let mut intent = self.find_intent(reference).await?;
        let mut order = self.ctx.load_order(&order_id).await?;
        if !intent.is_pending() {
            debug!(%order_id, "payment confirmation replayed");
            return Ok(order);
        }
        if Money::from(amount_paid) != intent.amount_due {
            return Err(EscrowError::validation(format!(
                "confirmed amount {} does not match the {} due on {}",
                amount_paid.value(),
                intent.amount_due,
                reference
            )));
        }

        let before = order.clone();
        let now = Utc::now();
        let change = order.record_payment(amount_paid, intent.payment_type, now)?;
        intent.mark_confirmed(now);
        self.ctx.stores.orders.store(order.clone()).await?;
        if let Err(e) = self.ctx.stores.intents.store(intent).await {
            // The intent stays pending, so the order must not count the payment either.
            self.ctx.restore_order(before).await;
            return Err(e);
        }

        info!(%order_id, from = %change.from, to = %change.to, paid = %order.total_amount_paid, "payment confirmed");
        self.ctx.notify(status_event(&order)).await;
        Ok(order)
    }

    /// Gateway callback keyed by order id: confirms the latest pending intent.
    pub async fn confirm_order_payment(&self, order_id: &OrderId, amount_paid: Amount) -> Result<Order> {
        let intent = self.pending_intent(order_id).await?.ok_or_else(|| {
            EscrowError::NotFound(format!("pending payment for order {}", order_id))
        })?;
        self.confirm_payment(&intent.reference, amount_paid).await
    }

    pub async fn pending_intent(&self, order_id: &OrderId) -> Result<Option<PaymentIntent>> {
        self.ctx.stores.intents.latest_pending(order_id).await
    }

    /// Cancels a pending or partially paid order; no payment is accepted afterwards.
    #[instrument(name = "payment.cancel", skip(self), err)]
    pub async fn cancel_order(&self, order_id: &OrderId) -> Result<Order> {
        let _guard = self.ctx.lock_order(order_id).await?;
        let mut order = self.ctx.load_order(order_id).await?;
        let change = order.cancel(Utc::now())?;
        self.ctx.stores.orders.store(order.clone()).await?;

        info!(from = %change.from, "order cancelled");
        self.ctx.notify(status_event(&order)).await;
        Ok(order)
    }

    async fn find_intent(&self, reference: &str) -> Result<PaymentIntent> {
        self.ctx
            .stores
            .intents
            .get(reference)
            .await?
            .ok_or_else(|| EscrowError::NotFound(format!("payment reference {}", reference)))
    }

    async fn display_bank_details(&self, order: &Order) -> Option<BankDetails> {
        let lookup = self
            .ctx
            .bounded(
                "bank profile lookup",
                self.ctx.stores.bank_profiles.get(&order.organization_id),
            )
            .await;
        match lookup {
            Ok(profile) => profile.map(|p| p.details),
            Err(e) => {
                warn!(organization_id = %order.organization_id, error = %e, "bank details unavailable for display");
                None
            }
        }
    }
}

pub(crate) fn status_event(order: &Order) -> NotificationEvent {
    NotificationEvent::StatusChanged {
        order_id: order.id.clone(),
        status: order.order_status,
        customer_id: order.customer_id.clone(),
        organization_id: order.organization_id.clone(),
    }
}
