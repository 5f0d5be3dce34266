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
use crate::error::{EscrowError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;

pub const CF_ORDERS: &str = "orders";
pub const CF_PAYMENT_INTENTS: &str = "payment_intents";
pub const CF_DELIVERIES: &str = "deliveries";
pub const CF_REMITTANCES: &str = "remittances";
pub const CF_BANK_PROFILES: &str = "bank_profiles";

const COLUMN_FAMILIES: [&str; 5] = [
    CF_ORDERS,
    CF_PAYMENT_INTENTS,
    CF_DELIVERIES,
    CF_REMITTANCES,
    CF_BANK_PROFILES,
];

/// A persistent store implementation using RocksDB.
///
/// Every entity lives in its own column family, serialized as JSON. The
/// struct is cheap to clone and shares the underlying `Arc<DB>`, so one
/// instance can back every store port.
///
/// `insert_if_absent` is a read-then-write; callers hold the per-order lock
/// around it.
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at `path` with every column family.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors = COLUMN_FAMILIES
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(*name, Options::default()))
            .collect::<Vec<_>>();
        let db = DB::open_cf_descriptors(&opts, path, descriptors)?;

        Ok(Self { db: Arc::new(db) })
    }

    fn put_json<T: Serialize>(&self, cf_name: &str, key: &[u8], value: &T) -> Result<()> {
        let cf = self.cf(cf_name)?;
        let bytes = serde_json::to_vec(value)?;
        self.db.put_cf(cf, key, bytes)?;
        Ok(())
    }

    fn get_json<T: DeserializeOwned>(&self, cf_name: &str, key: &[u8]) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        match self.db.get_pinned_cf(cf, key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn scan_json<T: DeserializeOwned>(&self, cf_name: &str) -> Result<Vec<T>> {
        let cf = self.cf(cf_name)?;
        let mut values = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            values.push(serde_json::from_slice(&value)?);
        }
        Ok(values)
    }

    fn insert_json_if_absent<T: Serialize + DeserializeOwned>(
        &self,
        cf_name: &str,
        key: &[u8],
        value: T,
    ) -> Result<InsertOutcome<T>> {
        if let Some(existing) = self.get_json(cf_name, key)? {
            return Ok(InsertOutcome::Existing(existing));
        }
        self.put_json(cf_name, key, &value)?;
        Ok(InsertOutcome::Inserted)
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            EscrowError::UpstreamUnavailable(format!("column family {} not found", name))
        })
    }
}

#[async_trait]
impl OrderStore for RocksDBStore {
    async fn store(&self, order: Order) -> Result<()> {
        self.put_json(CF_ORDERS, order.id.as_str().as_bytes(), &order)
    }

    async fn get(&self, order_id: &OrderId) -> Result<Option<Order>> {
        self.get_json(CF_ORDERS, order_id.as_str().as_bytes())
    }

    async fn get_all(&self) -> Result<Vec<Order>> {
        self.scan_json(CF_ORDERS)
    }
}

#[async_trait]
impl PaymentIntentStore for RocksDBStore {
    async fn store(&self, intent: PaymentIntent) -> Result<()> {
        self.put_json(CF_PAYMENT_INTENTS, intent.reference.as_bytes(), &intent)
    }

    async fn get(&self, reference: &str) -> Result<Option<PaymentIntent>> {
        self.get_json(CF_PAYMENT_INTENTS, reference.as_bytes())
    }

    async fn latest_pending(&self, order_id: &OrderId) -> Result<Option<PaymentIntent>> {
        let intents: Vec<PaymentIntent> = self.scan_json(CF_PAYMENT_INTENTS)?;
        Ok(intents
            .into_iter()
            .filter(|i| &i.order_id == order_id && i.is_pending())
            .max_by_key(|i| i.created_at))
    }
}

#[async_trait]
impl DeliveryStore for RocksDBStore {
    async fn insert_if_absent(
        &self,
        confirmation: DeliveryConfirmation,
    ) -> Result<InsertOutcome<DeliveryConfirmation>> {
        let key = confirmation.order_id.as_str().as_bytes().to_vec();
        self.insert_json_if_absent(CF_DELIVERIES, &key, confirmation)
    }

    async fn get(&self, order_id: &OrderId) -> Result<Option<DeliveryConfirmation>> {
        self.get_json(CF_DELIVERIES, order_id.as_str().as_bytes())
    }
}

#[async_trait]
impl RemittanceStore for RocksDBStore {
    async fn insert_if_absent(
        &self,
        record: RemittanceRecord,
    ) -> Result<InsertOutcome<RemittanceRecord>> {
        let key = record.order_id.as_str().as_bytes().to_vec();
        self.insert_json_if_absent(CF_REMITTANCES, &key, record)
    }

    async fn get(&self, order_id: &OrderId) -> Result<Option<RemittanceRecord>> {
        self.get_json(CF_REMITTANCES, order_id.as_str().as_bytes())
    }
}

#[async_trait]
impl BankProfileStore for RocksDBStore {
    async fn store(&self, profile: OrganizationBankProfile) -> Result<()> {
        self.put_json(
            CF_BANK_PROFILES,
            profile.organization_id.as_str().as_bytes(),
            &profile,
        )
    }

    async fn get(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Option<OrganizationBankProfile>> {
        self.get_json(CF_BANK_PROFILES, organization_id.as_str().as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bank_profile::BankDetails;
    use crate::domain::calculator::PaymentType;
    use crate::domain::money::Money;
    use crate::domain::order::OrderContext;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_rocksdb_open_cf() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).expect("Failed to open RocksDB");
        for name in COLUMN_FAMILIES {
            assert!(store.db.cf_handle(name).is_some());
        }
    }

    #[tokio::test]
    async fn test_rocksdb_order_store() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();

        let ctx = OrderContext {
            order_id: "o-1".into(),
            product_id: "p-1".into(),
            organization_id: "org-1".into(),
            customer_id: "c-1".into(),
            product_price: Money::new(dec!(100)).unwrap(),
            upfront_payment_percentage: None,
        };
        let order = Order::new(ctx, PaymentType::Upfront, vec![], Utc::now()).unwrap();

        OrderStore::store(&store, order.clone()).await.unwrap();
        let retrieved = OrderStore::get(&store, &"o-1".into()).await.unwrap().unwrap();
        assert_eq!(retrieved, order);
        assert_eq!(OrderStore::get_all(&store).await.unwrap().len(), 1);
        assert!(OrderStore::get(&store, &"o-2".into()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rocksdb_bank_profile_store() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();
        let profile = OrganizationBankProfile::new(
            "org-1".into(),
            BankDetails::new("First Bank", "0123456789", "Acme").unwrap(),
            Utc::now(),
        );
        BankProfileStore::store(&store, profile.clone()).await.unwrap();
        assert_eq!(
            BankProfileStore::get(&store, &"org-1".into()).await.unwrap(),
            Some(profile)
        );
    }
}
