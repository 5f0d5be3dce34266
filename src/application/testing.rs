//! Fixtures shared by the application unit tests.

use super::context::{EscrowContext, Stores};
use crate::config::EscrowConfig;
use crate::domain::events::NotificationEvent;
use crate::domain::money::{Money, Percentage};
use crate::domain::order::OrderContext;
use crate::domain::ids::OrderId;
use crate::domain::order::Order;
use crate::domain::payment_intent::PaymentIntent;
use crate::domain::ports::{
    InsertOutcome, OrderStore, PaymentGatewayBox, PaymentIntentStore, RemittanceStore,
};
use crate::domain::remittance::RemittanceRecord;
use crate::error::{EscrowError, Result};
use crate::infrastructure::gateway::SimulatedGateway;
use crate::infrastructure::in_memory::{
    InMemoryOrderStore, InMemoryPaymentIntentStore, InMemoryRemittanceStore,
};
use crate::infrastructure::notify::ChannelNotifier;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc::UnboundedReceiver;

pub fn test_context() -> (Arc<EscrowContext>, UnboundedReceiver<NotificationEvent>) {
    let config = EscrowConfig::default();
    context_with(Box::new(SimulatedGateway::new(config.gateway)), 1_000)
}

pub fn context_with(
    gateway: PaymentGatewayBox,
    upstream_timeout_ms: u64,
) -> (Arc<EscrowContext>, UnboundedReceiver<NotificationEvent>) {
    let config = EscrowConfig {
        upstream_timeout_ms,
        lock_timeout_ms: 1_000,
        ..EscrowConfig::default()
    };
    let (notifier, events) = ChannelNotifier::new();
    let ctx = EscrowContext::new(Stores::in_memory(), gateway, Box::new(notifier), config);
    (Arc::new(ctx), events)
}

/// Context over the given stores with the default gateway.
pub fn context_with_stores(
    stores: Stores,
) -> (Arc<EscrowContext>, UnboundedReceiver<NotificationEvent>) {
    let config = EscrowConfig::default();
    let (notifier, events) = ChannelNotifier::new();
    let gateway = Box::new(SimulatedGateway::new(config.gateway.clone()));
    let ctx = EscrowContext::new(stores, gateway, Box::new(notifier), config);
    (Arc::new(ctx), events)
}

/// Shared switch that makes the failing stores reject writes.
#[derive(Clone, Default)]
pub struct WriteFailure(Arc<AtomicBool>);

impl WriteFailure {
    pub fn arm(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn disarm(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.0.load(Ordering::SeqCst) {
            Err(EscrowError::UpstreamUnavailable("db write failed".into()))
        } else {
            Ok(())
        }
    }
}

/// In-memory stores whose writes fail while the switch is armed.
#[derive(Clone, Default)]
pub struct FailingOrderStore {
    pub inner: InMemoryOrderStore,
    pub failure: WriteFailure,
}

#[async_trait]
impl OrderStore for FailingOrderStore {
    async fn store(&self, order: Order) -> Result<()> {
        self.failure.check()?;
        self.inner.store(order).await
    }

    async fn get(&self, order_id: &OrderId) -> Result<Option<Order>> {
        self.inner.get(order_id).await
    }

    async fn get_all(&self) -> Result<Vec<Order>> {
        self.inner.get_all().await
    }
}

#[derive(Clone, Default)]
pub struct FailingIntentStore {
    pub inner: InMemoryPaymentIntentStore,
    pub failure: WriteFailure,
}

#[async_trait]
impl PaymentIntentStore for FailingIntentStore {
    async fn store(&self, intent: PaymentIntent) -> Result<()> {
        self.failure.check()?;
        self.inner.store(intent).await
    }

    async fn get(&self, reference: &str) -> Result<Option<PaymentIntent>> {
        self.inner.get(reference).await
    }

    async fn latest_pending(&self, order_id: &OrderId) -> Result<Option<PaymentIntent>> {
        self.inner.latest_pending(order_id).await
    }
}

#[derive(Clone, Default)]
pub struct FailingRemittanceStore {
    pub inner: InMemoryRemittanceStore,
    pub failure: WriteFailure,
}

#[async_trait]
impl RemittanceStore for FailingRemittanceStore {
    async fn insert_if_absent(
        &self,
        record: RemittanceRecord,
    ) -> Result<InsertOutcome<RemittanceRecord>> {
        self.failure.check()?;
        self.inner.insert_if_absent(record).await
    }

    async fn get(&self, order_id: &OrderId) -> Result<Option<RemittanceRecord>> {
        self.inner.get(order_id).await
    }
}

pub fn order_context(id: &str, price: Decimal, pct: Option<u8>) -> OrderContext {
    OrderContext {
        order_id: id.into(),
        product_id: "p-1".into(),
        organization_id: "org-1".into(),
        customer_id: "c-1".into(),
        product_price: Money::new(price).unwrap(),
        upfront_payment_percentage: pct.map(|p| Percentage::new(p).unwrap()),
    }
}
