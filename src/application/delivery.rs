use super::context::EscrowContext;
use crate::domain::delivery::{
    DeliveryConfirmation, DeliveryDestination, DeliveryEvidence, DeliveryMode,
};
use crate::domain::events::NotificationEvent;
use crate::domain::ids::OrderId;
use crate::domain::order::OrderStatus;
use crate::domain::ports::InsertOutcome;
use crate::error::{EscrowError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Fulfillment evidence submitted by the organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryRequest {
    pub order_id: OrderId,
    pub delivery_mode: DeliveryMode,
    #[serde(default)]
    pub delivery_address: Option<String>,
    #[serde(default)]
    pub pickup_center_name: Option<String>,
    #[serde(default)]
    pub evidence: DeliveryEvidence,
    pub satisfaction_declaration: String,
}

impl DeliveryRequest {
    fn to_confirmation(&self, now: DateTime<Utc>) -> Result<DeliveryConfirmation> {
        let destination = DeliveryDestination::from_parts(
            self.delivery_mode,
            self.delivery_address.as_deref(),
            self.pickup_center_name.as_deref(),
        )?;
        DeliveryConfirmation::new(
            self.order_id.clone(),
            destination,
            self.evidence.clone(),
            &self.satisfaction_declaration,
            now,
        )
    }
}

/// Accepts delivery evidence for fully paid orders.
pub struct DeliveryConfirmationService {
    ctx: Arc<EscrowContext>,
}

impl DeliveryConfirmationService {
    pub fn new(ctx: Arc<EscrowContext>) -> Self {
        Self { ctx }
    }

    /// Server-provided text the declaration field may be pre-filled with.
    pub fn satisfaction_template(&self) -> Option<&str> {
        self.ctx.config.delivery.satisfaction_template.as_deref()
    }

    /// Records the single delivery confirmation of an order.
    ///
    /// Retrying with the same content returns the stored confirmation; any
    /// other second attempt fails with `AlreadyExists`.
    #[instrument(
        name = "delivery.confirm",
        skip(self, request),
        fields(order_id = %request.order_id, mode = ?request.delivery_mode),
        err
    )]
    pub async fn confirm_delivery(&self, request: DeliveryRequest) -> Result<DeliveryConfirmation> {
        let _guard = self.ctx.lock_order(&request.order_id).await?;
        let order = self.ctx.load_order(&request.order_id).await?;

        if let Some(existing) = self.ctx.stores.deliveries.get(&order.id).await? {
            return replay(&request, existing);
        }
        if order.order_status != OrderStatus::FullyPaid {
            return Err(EscrowError::transition(format!(
                "order {} is {} and cannot be marked delivered until fully paid",
                order.id, order.order_status
            )));
        }

        let confirmation = request.to_confirmation(Utc::now())?;
        if let InsertOutcome::Existing(existing) = self
            .ctx
            .stores
            .deliveries
            .insert_if_absent(confirmation.clone())
            .await?
        {
            return replay(&request, existing);
        }

        info!("delivery confirmed");
        self.ctx
            .notify(NotificationEvent::ReadyForRemittance {
                order_id: order.id.clone(),
                customer_id: order.customer_id.clone(),
                organization_id: order.organization_id.clone(),
            })
            .await;
        Ok(confirmation)
    }

    pub async fn confirmation(&self, order_id: &OrderId) -> Result<Option<DeliveryConfirmation>> {
        self.ctx.stores.deliveries.get(order_id).await
    }
}

fn replay(request: &DeliveryRequest, existing: DeliveryConfirmation) -> Result<DeliveryConfirmation> {
    match request.to_confirmation(existing.created_at) {
        Ok(candidate) if existing.same_content(&candidate) => {
            debug!(order_id = %existing.order_id, "delivery confirmation replayed");
            Ok(existing)
        }
        _ => Err(EscrowError::AlreadyExists(format!(
            "delivery confirmation for order {}",
            existing.order_id
        ))),
    }
}
