use super::ids::{OrderId, OrganizationId};
use super::money::Amount;
use super::order::OrderStatus;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Events handed to the notification channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum NotificationEvent {
    StatusChanged {
        order_id: OrderId,
        status: OrderStatus,
        customer_id: String,
        organization_id: OrganizationId,
    },
    ReadyForRemittance {
        order_id: OrderId,
        customer_id: String,
        organization_id: OrganizationId,
    },
    Settled {
        order_id: OrderId,
        organization_id: OrganizationId,
        amount_remitted: Amount,
        settlement_date: NaiveDate,
    },
}

impl NotificationEvent {
    pub fn order_id(&self) -> &OrderId {
        match self {
            NotificationEvent::StatusChanged { order_id, .. }
            | NotificationEvent::ReadyForRemittance { order_id, .. }
            | NotificationEvent::Settled { order_id, .. } => order_id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            NotificationEvent::StatusChanged { .. } => "status_changed",
            NotificationEvent::ReadyForRemittance { .. } => "ready_for_remittance",
            NotificationEvent::Settled { .. } => "settled",
        }
    }
}
