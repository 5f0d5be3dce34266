use super::locks::{OrderGuard, OrderLocks};
use crate::config::EscrowConfig;
use crate::domain::events::NotificationEvent;
use crate::domain::ids::OrderId;
use crate::domain::order::Order;
use crate::domain::ports::{
    BankProfileStoreBox, DeliveryStoreBox, NotifierBox, OrderStoreBox, PaymentGatewayBox,
    PaymentIntentStoreBox, RemittanceStoreBox,
};
use crate::error::{EscrowError, Result};
use crate::infrastructure::in_memory::{
    InMemoryBankProfileStore, InMemoryDeliveryStore, InMemoryOrderStore,
    InMemoryPaymentIntentStore, InMemoryRemittanceStore,
};
use std::future::Future;
use tracing::{error, warn};

/// Every persistence port the services use.
pub struct Stores {
    pub orders: OrderStoreBox,
    pub intents: PaymentIntentStoreBox,
    pub deliveries: DeliveryStoreBox,
    pub remittances: RemittanceStoreBox,
    pub bank_profiles: BankProfileStoreBox,
}

impl Stores {
    pub fn in_memory() -> Self {
        Self {
            orders: Box::new(InMemoryOrderStore::new()),
            intents: Box::new(InMemoryPaymentIntentStore::new()),
            deliveries: Box::new(InMemoryDeliveryStore::new()),
            remittances: Box::new(InMemoryRemittanceStore::new()),
            bank_profiles: Box::new(InMemoryBankProfileStore::new()),
        }
    }

    /// All ports backed by one RocksDB instance.
    #[cfg(feature = "storage-rocksdb")]
    pub fn rocksdb(store: crate::infrastructure::rocksdb::RocksDBStore) -> Self {
        Self {
            orders: Box::new(store.clone()),
            intents: Box::new(store.clone()),
            deliveries: Box::new(store.clone()),
            remittances: Box::new(store.clone()),
            bank_profiles: Box::new(store),
        }
    }
}

/// State shared by the services: stores, external collaborators and locks.
pub struct EscrowContext {
    pub(crate) stores: Stores,
    pub(crate) gateway: PaymentGatewayBox,
    pub(crate) notifier: NotifierBox,
    pub(crate) locks: OrderLocks,
    pub(crate) config: EscrowConfig,
}

impl EscrowContext {
    pub fn new(
        stores: Stores,
        gateway: PaymentGatewayBox,
        notifier: NotifierBox,
        config: EscrowConfig,
    ) -> Self {
        Self {
            stores,
            gateway,
            notifier,
            locks: OrderLocks::new(config.lock_timeout()),
            config,
        }
    }

    /// Runs an external call, turning an elapsed deadline into `UpstreamUnavailable`.
    pub(crate) async fn bounded<T, F>(&self, what: &str, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::time::timeout(self.config.upstream_timeout(), call)
            .await
            .map_err(|_| EscrowError::UpstreamUnavailable(format!("{} timed out", what)))?
    }

    /// Fire-and-forget publish; failures are logged and swallowed.
    pub(crate) async fn notify(&self, event: NotificationEvent) {
        let name = event.name();
        let order_id = event.order_id().clone();
        if let Err(e) = self.bounded("notification", self.notifier.publish(event)).await {
            warn!(event = name, %order_id, error = %e, "notification dropped");
        }
    }

    pub(crate) async fn load_order(&self, order_id: &OrderId) -> Result<Order> {
        self.stores
            .orders
            .get(order_id)
            .await?
            .ok_or_else(|| EscrowError::NotFound(format!("order {}", order_id)))
    }

    /// Writes back the order as it was before a failed multi-store update.
    pub(crate) async fn restore_order(&self, order: Order) {
        let order_id = order.id.clone();
        if let Err(e) = self.stores.orders.store(order).await {
            error!(%order_id, error = %e, "failed to restore order after a partial write");
        }
    }

    pub(crate) async fn lock_order(&self, order_id: &OrderId) -> Result<OrderGuard> {
        self.locks.acquire(order_id).await
    }
}
