use crate::domain::catalog::{Customer, CustomerId, Product, ProductId};
use crate::domain::order::{Order, OrderId};
use crate::domain::payment::{Payment, PaymentId};
use crate::domain::ports::{CatalogStore, OrderStore, PaymentStore};
use crate::error::{OrderError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, Direction, IteratorMode, Options};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::{Arc, Mutex};

pub const CF_PRODUCTS: &str = "products";
pub const CF_CUSTOMERS: &str = "customers";
pub const CF_ORDERS: &str = "orders";
/// Payments keyed by `order id ++ payment id` so one order's rows are contiguous.
pub const CF_PAYMENTS: &str = "payments";
/// Id sequences.
pub const CF_META: &str = "meta";

const ORDER_SEQUENCE: &[u8] = b"order_seq";
const PAYMENT_SEQUENCE: &[u8] = b"payment_seq";

/// A persistent store implementation using RocksDB.
///
/// Implements all three storage ports over one database, one column family
/// per entity. `Clone` shares the underlying `Arc<DB>`.
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    sequence_lock: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at `path`, creating missing column families.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors = [CF_PRODUCTS, CF_CUSTOMERS, CF_ORDERS, CF_PAYMENTS, CF_META]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, descriptors)?;

        Ok(Self {
            db: Arc::new(db),
            sequence_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| OrderError::internal(format!("{name} column family not found")))
    }

    fn put<T: Serialize>(&self, cf: &str, key: &[u8], value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value)
            .map_err(|e| OrderError::internal(format!("Serialization error: {e}")))?;
        self.db.put_cf(self.cf(cf)?, key, bytes)?;
        Ok(())
    }

    fn fetch<T: DeserializeOwned>(&self, cf: &str, key: &[u8]) -> Result<Option<T>> {
        match self.db.get_cf(self.cf(cf)?, key)? {
            Some(bytes) => decode(&bytes).map(Some),
            None => Ok(None),
        }
    }

    fn scan<T: DeserializeOwned>(&self, cf: &str, prefix: &[u8]) -> Result<Vec<T>> {
        let iter = self
            .db
            .iterator_cf(self.cf(cf)?, IteratorMode::From(prefix, Direction::Forward));

        let mut items = Vec::new();
        for item in iter {
            let (key, value) = item?;
            if !key.starts_with(prefix) {
                break;
            }
            items.push(decode(&value)?);
        }
        Ok(items)
    }

    fn next_in_sequence(&self, key: &[u8]) -> Result<u64> {
        let _guard = self
            .sequence_lock
            .lock()
            .map_err(|_| OrderError::internal("sequence lock poisoned"))?;
        let current: u64 = self.fetch(CF_META, key)?.unwrap_or(0);
        let next = current + 1;
        self.put(CF_META, key, &next)?;
        Ok(next)
    }
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes)
        .map_err(|e| OrderError::internal(format!("Deserialization error: {e}")))
}

fn payment_key(order_id: OrderId, payment_id: PaymentId) -> [u8; 16] {
    let mut key = [0u8; 16];
    key[..8].copy_from_slice(&order_id.to_be_bytes());
    key[8..].copy_from_slice(&payment_id.to_be_bytes());
    key
}

#[async_trait]
impl CatalogStore for RocksDBStore {
    async fn store_product(&self, product: Product) -> Result<()> {
        self.put(CF_PRODUCTS, &product.id.to_be_bytes(), &product)
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        self.fetch(CF_PRODUCTS, &id.to_be_bytes())
    }

    async fn products(&self) -> Result<Vec<Product>> {
        self.scan(CF_PRODUCTS, &[])
    }

    async fn store_customer(&self, customer: Customer) -> Result<()> {
        self.put(CF_CUSTOMERS, &customer.id.to_be_bytes(), &customer)
    }

    async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>> {
        self.fetch(CF_CUSTOMERS, &id.to_be_bytes())
    }
}

#[async_trait]
impl OrderStore for RocksDBStore {
    async fn next_id(&self) -> Result<OrderId> {
        self.next_in_sequence(ORDER_SEQUENCE)
    }

    async fn store(&self, order: Order) -> Result<()> {
        self.put(CF_ORDERS, &order.id.to_be_bytes(), &order)
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>> {
        self.fetch(CF_ORDERS, &id.to_be_bytes())
    }

    async fn get_all(&self) -> Result<Vec<Order>> {
        self.scan(CF_ORDERS, &[])
    }
}

#[async_trait]
impl PaymentStore for RocksDBStore {
    async fn next_id(&self) -> Result<PaymentId> {
        self.next_in_sequence(PAYMENT_SEQUENCE)
    }

    async fn append(&self, payment: Payment) -> Result<()> {
        let key = payment_key(payment.order_id, payment.id);
        // Just check if the key exists without retrieving the value
        if self.db.get_pinned_cf(self.cf(CF_PAYMENTS)?, key)?.is_some() {
            return Err(OrderError::internal(format!(
                "payment {} already recorded",
                payment.id
            )));
        }
        self.put(CF_PAYMENTS, &key, &payment)
    }

    async fn for_order(&self, order_id: OrderId) -> Result<Vec<Payment>> {
        self.scan(CF_PAYMENTS, &order_id.to_be_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::Money;
    use crate::domain::order::OrderLine;
    use crate::domain::payment::{PaymentKind, PaymentState};
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_rocksdb_open_cf() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).expect("Failed to open RocksDB");

        for name in [CF_PRODUCTS, CF_CUSTOMERS, CF_ORDERS, CF_PAYMENTS, CF_META] {
            assert!(store.db.cf_handle(name).is_some());
        }
    }

    #[tokio::test]
    async fn test_rocksdb_catalog_store() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();

        let product = Product::new(1, "SSD", Money::new(dec!(150)), 10);
        store.store_product(product.clone()).await.unwrap();
        assert_eq!(store.get_product(1).await.unwrap(), Some(product.clone()));
        assert_eq!(store.products().await.unwrap(), vec![product]);
        assert!(store.get_product(2).await.unwrap().is_none());

        store.store_customer(Customer::new(4, "Jason")).await.unwrap();
        assert_eq!(store.get_customer(4).await.unwrap().unwrap().name, "Jason");
    }

    #[tokio::test]
    async fn test_rocksdb_order_and_payment_store() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();

        let product = Product::new(1, "RAM", Money::new(dec!(60)), 15);
        let id = OrderStore::next_id(&store).await.unwrap();
        assert_eq!(id, 1);
        let order = Order::pending(id, 2, vec![OrderLine::snapshot(&product, 2)]).unwrap();
        OrderStore::store(&store, order.clone()).await.unwrap();
        assert_eq!(OrderStore::get(&store, 1).await.unwrap(), Some(order));

        let other = Order::pending(OrderStore::next_id(&store).await.unwrap(), 2, vec![]).unwrap();
        OrderStore::store(&store, other).await.unwrap();

        for (order_id, amount) in [(1, dec!(20)), (2, dec!(5)), (1, dec!(100))] {
            let payment = Payment::record(
                PaymentStore::next_id(&store).await.unwrap(),
                order_id,
                PaymentKind::CardPayment,
                PaymentState::Partial,
                Money::new(amount),
            );
            store.append(payment).await.unwrap();
        }

        let first = store.for_order(1).await.unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].amount, Money::new(dec!(20)));
        assert_eq!(first[1].amount, Money::new(dec!(100)));
        assert_eq!(store.for_order(2).await.unwrap().len(), 1);
        assert_eq!(OrderStore::get_all(&store).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_rocksdb_sequences_survive_reopen() {
        let dir = tempdir().unwrap();
        {
            let store = RocksDBStore::open(dir.path()).unwrap();
            assert_eq!(OrderStore::next_id(&store).await.unwrap(), 1);
            assert_eq!(OrderStore::next_id(&store).await.unwrap(), 2);
        }
        let store = RocksDBStore::open(dir.path()).unwrap();
        assert_eq!(OrderStore::next_id(&store).await.unwrap(), 3);
        assert_eq!(PaymentStore::next_id(&store).await.unwrap(), 1);
    }
}
