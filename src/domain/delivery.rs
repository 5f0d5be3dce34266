use super::ids::OrderId;
use crate::error::{EscrowError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMode {
    PickupCenter,
    Shipping,
    OrganizationLocation,
}

/// Where the goods were handed over, with the field its mode requires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "delivery_mode", rename_all = "snake_case")]
pub enum DeliveryDestination {
    PickupCenter { pickup_center_name: String },
    Shipping { delivery_address: String },
    OrganizationLocation,
}

impl DeliveryDestination {
    /// Builds the destination, requiring exactly the field the mode needs.
    pub fn from_parts(
        mode: DeliveryMode,
        delivery_address: Option<&str>,
        pickup_center_name: Option<&str>,
    ) -> Result<Self> {
        let address = non_blank(delivery_address);
        let center = non_blank(pickup_center_name);
        match mode {
            DeliveryMode::Shipping => {
                if center.is_some() {
                    return Err(EscrowError::validation(
                        "pickup center name is only allowed for pickup center deliveries",
                    ));
                }
                let delivery_address = address.ok_or_else(|| {
                    EscrowError::validation("delivery address is required for shipping")
                })?;
                Ok(Self::Shipping { delivery_address })
            }
            DeliveryMode::PickupCenter => {
                if address.is_some() {
                    return Err(EscrowError::validation(
                        "delivery address is only allowed for shipping",
                    ));
                }
                let pickup_center_name = center.ok_or_else(|| {
                    EscrowError::validation("pickup center name is required for pickup center deliveries")
                })?;
                Ok(Self::PickupCenter { pickup_center_name })
            }
            DeliveryMode::OrganizationLocation => {
                if address.is_some() || center.is_some() {
                    return Err(EscrowError::validation(
                        "organization location deliveries take no address or pickup center",
                    ));
                }
                Ok(Self::OrganizationLocation)
            }
        }
    }

    pub fn mode(&self) -> DeliveryMode {
        match self {
            Self::PickupCenter { .. } => DeliveryMode::PickupCenter,
            Self::Shipping { .. } => DeliveryMode::Shipping,
            Self::OrganizationLocation => DeliveryMode::OrganizationLocation,
        }
    }
}

/// Optional media and notes backing a delivery.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryEvidence {
    #[serde(default)]
    pub product_image: Option<String>,
    #[serde(default)]
    pub representative_image: Option<String>,
    #[serde(default)]
    pub user_image: Option<String>,
    #[serde(default)]
    pub image_comment: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
}

/// The single fulfillment record attached to a fully paid order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryConfirmation {
    pub order_id: OrderId,
    pub destination: DeliveryDestination,
    pub evidence: DeliveryEvidence,
    pub satisfaction_declaration: String,
    pub created_at: DateTime<Utc>,
}

impl DeliveryConfirmation {
    pub fn new(
        order_id: OrderId,
        destination: DeliveryDestination,
        evidence: DeliveryEvidence,
        satisfaction_declaration: &str,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let satisfaction_declaration = satisfaction_declaration.trim();
        if satisfaction_declaration.is_empty() {
            return Err(EscrowError::validation(
                "satisfaction declaration is required",
            ));
        }
        Ok(Self {
            order_id,
            destination,
            evidence,
            satisfaction_declaration: satisfaction_declaration.to_string(),
            created_at: now,
        })
    }

    /// True when `other` carries the same content, ignoring creation time.
    pub fn same_content(&self, other: &DeliveryConfirmation) -> bool {
        self.order_id == other.order_id
            && self.destination == other.destination
            && self.evidence == other.evidence
            && self.satisfaction_declaration == other.satisfaction_declaration
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
