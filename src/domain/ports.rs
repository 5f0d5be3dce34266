use super::bank_profile::OrganizationBankProfile;
use super::delivery::DeliveryConfirmation;
use super::events::NotificationEvent;
use super::ids::{OrderId, OrganizationId};
use super::money::Money;
use super::order::Order;
use super::payment_intent::PaymentIntent;
use super::remittance::RemittanceRecord;
use crate::error::Result;
use async_trait::async_trait;

/// Result of inserting into a store keyed uniquely by order id.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome<T> {
    Inserted,
    Existing(T),
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn store(&self, order: Order) -> Result<()>;
    async fn get(&self, order_id: &OrderId) -> Result<Option<Order>>;
    async fn get_all(&self) -> Result<Vec<Order>>;
}

#[async_trait]
pub trait PaymentIntentStore: Send + Sync {
    async fn store(&self, intent: PaymentIntent) -> Result<()>;
    async fn get(&self, reference: &str) -> Result<Option<PaymentIntent>>;
    /// The most recently created pending intent for the order, if any.
    async fn latest_pending(&self, order_id: &OrderId) -> Result<Option<PaymentIntent>>;
}

#[async_trait]
pub trait DeliveryStore: Send + Sync {
    async fn insert_if_absent(
        &self,
        confirmation: DeliveryConfirmation,
    ) -> Result<InsertOutcome<DeliveryConfirmation>>;
    async fn get(&self, order_id: &OrderId) -> Result<Option<DeliveryConfirmation>>;
}

#[async_trait]
pub trait RemittanceStore: Send + Sync {
    async fn insert_if_absent(
        &self,
        record: RemittanceRecord,
    ) -> Result<InsertOutcome<RemittanceRecord>>;
    async fn get(&self, order_id: &OrderId) -> Result<Option<RemittanceRecord>>;
}

#[async_trait]
pub trait BankProfileStore: Send + Sync {
    async fn store(&self, profile: OrganizationBankProfile) -> Result<()>;
    async fn get(&self, organization_id: &OrganizationId)
    -> Result<Option<OrganizationBankProfile>>;
}

/// Checkout handle returned by the payment gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayCheckout {
    pub link: String,
    pub reference: String,
}

/// Metadata forwarded to the gateway with a checkout request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentMetadata {
    pub order_id: OrderId,
    pub customer_id: String,
    pub organization_id: OrganizationId,
    pub payment_type: &'static str,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn initiate(&self, amount: Money, metadata: PaymentMetadata) -> Result<GatewayCheckout>;
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn publish(&self, event: NotificationEvent) -> Result<()>;
}

pub type OrderStoreBox = Box<dyn OrderStore>;
pub type PaymentIntentStoreBox = Box<dyn PaymentIntentStore>;
pub type DeliveryStoreBox = Box<dyn DeliveryStore>;
pub type RemittanceStoreBox = Box<dyn RemittanceStore>;
pub type BankProfileStoreBox = Box<dyn BankProfileStore>;
pub type PaymentGatewayBox = Box<dyn PaymentGateway>;
pub type NotifierBox = Box<dyn Notifier>;
