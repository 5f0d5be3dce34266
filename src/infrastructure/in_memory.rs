use crate::domain::bank_profile::OrganizationBankProfile;
use crate::domain::delivery::DeliveryConfirmation;
use crate::domain::ids::{OrderId, OrganizationId};
use crate::domain::order::Order;
use crate::domain::payment_intent::PaymentIntent;
use crate::domain::ports::{
    BankProfileStore, DeliveryStore, InsertOutcome, OrderStore, PaymentIntentStore,
    RemittanceStore,
};
use crate::domain::remittance::RemittanceRecord;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for orders.
///
/// Uses `Arc<RwLock<HashMap<OrderId, Order>>>` so clones share the same map.
#[derive(Default, Clone)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn store(&self, order: Order) -> Result<()> {
        let mut orders = self.orders.write().await;
        orders.insert(order.id.clone(), order);
        Ok(())
    }

    async fn get(&self, order_id: &OrderId) -> Result<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.get(order_id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut all: Vec<Order> = orders.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }
}

/// In-memory payment intents keyed by gateway reference.
#[derive(Default, Clone)]
pub struct InMemoryPaymentIntentStore {
    intents: Arc<RwLock<HashMap<String, PaymentIntent>>>,
}

impl InMemoryPaymentIntentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentIntentStore for InMemoryPaymentIntentStore {
    async fn store(&self, intent: PaymentIntent) -> Result<()> {
        let mut intents = self.intents.write().await;
        intents.insert(intent.reference.clone(), intent);
        Ok(())
    }

    async fn get(&self, reference: &str) -> Result<Option<PaymentIntent>> {
        let intents = self.intents.read().await;
        Ok(intents.get(reference).cloned())
    }

    async fn latest_pending(&self, order_id: &OrderId) -> Result<Option<PaymentIntent>> {
        let intents = self.intents.read().await;
        Ok(intents
            .values()
            .filter(|i| &i.order_id == order_id && i.is_pending())
            .max_by_key(|i| i.created_at)
            .cloned())
    }
}

/// In-memory delivery confirmations, at most one per order.
#[derive(Default, Clone)]
pub struct InMemoryDeliveryStore {
    confirmations: Arc<RwLock<HashMap<OrderId, DeliveryConfirmation>>>,
}

impl InMemoryDeliveryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DeliveryStore for InMemoryDeliveryStore {
    async fn insert_if_absent(
        &self,
        confirmation: DeliveryConfirmation,
    ) -> Result<InsertOutcome<DeliveryConfirmation>> {
        let mut confirmations = self.confirmations.write().await;
        match confirmations.entry(confirmation.order_id.clone()) {
            Entry::Occupied(existing) => Ok(InsertOutcome::Existing(existing.get().clone())),
            Entry::Vacant(slot) => {
                slot.insert(confirmation);
                Ok(InsertOutcome::Inserted)
            }
        }
    }

    async fn get(&self, order_id: &OrderId) -> Result<Option<DeliveryConfirmation>> {
        let confirmations = self.confirmations.read().await;
        Ok(confirmations.get(order_id).cloned())
    }
}

/// In-memory remittance records, at most one per order.
#[derive(Default, Clone)]
pub struct InMemoryRemittanceStore {
    records: Arc<RwLock<HashMap<OrderId, RemittanceRecord>>>,
}

impl InMemoryRemittanceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RemittanceStore for InMemoryRemittanceStore {
    async fn insert_if_absent(
        &self,
        record: RemittanceRecord,
    ) -> Result<InsertOutcome<RemittanceRecord>> {
        let mut records = self.records.write().await;
        match records.entry(record.order_id.clone()) {
            Entry::Occupied(existing) => Ok(InsertOutcome::Existing(existing.get().clone())),
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(InsertOutcome::Inserted)
            }
        }
    }

    async fn get(&self, order_id: &OrderId) -> Result<Option<RemittanceRecord>> {
        let records = self.records.read().await;
        Ok(records.get(order_id).cloned())
    }
}

/// In-memory bank profiles keyed by organization.
#[derive(Default, Clone)]
pub struct InMemoryBankProfileStore {
    profiles: Arc<RwLock<HashMap<OrganizationId, OrganizationBankProfile>>>,
}

impl InMemoryBankProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BankProfileStore for InMemoryBankProfileStore {
    async fn store(&self, profile: OrganizationBankProfile) -> Result<()> {
        let mut profiles = self.profiles.write().await;
        profiles.insert(profile.organization_id.clone(), profile);
        Ok(())
    }

    async fn get(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Option<OrganizationBankProfile>> {
        let profiles = self.profiles.read().await;
        Ok(profiles.get(organization_id).cloned())
    }
}
