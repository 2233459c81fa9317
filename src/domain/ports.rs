use super::catalog::{Customer, CustomerId, Product, ProductId};
use super::order::{Order, OrderId, OrderStatus};
use super::payment::{Payment, PaymentId};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Products and customers.
///
/// Reads are plain lookups; the inventory ledger serializes the
/// read-modify-write of a product's stock on top of this port.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn store_product(&self, product: Product) -> Result<()>;
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>>;
    async fn products(&self) -> Result<Vec<Product>>;
    async fn store_customer(&self, customer: Customer) -> Result<()>;
    async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Allocates the identity for a new order.
    async fn next_id(&self) -> Result<OrderId>;
    async fn store(&self, order: Order) -> Result<()>;
    async fn get(&self, id: OrderId) -> Result<Option<Order>>;
    /// All orders, ascending by id.
    async fn get_all(&self) -> Result<Vec<Order>>;

    async fn by_status(&self, status: OrderStatus) -> Result<Vec<Order>> {
        let orders = self.get_all().await?;
        Ok(orders.into_iter().filter(|o| o.status == status).collect())
    }
}

/// Append-only payment ledger.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn next_id(&self) -> Result<PaymentId>;
    /// Appends a payment. Fails if a payment with the same id already exists.
    async fn append(&self, payment: Payment) -> Result<()>;
    /// Payments for one order, in the order they were appended.
    async fn for_order(&self, order_id: OrderId) -> Result<Vec<Payment>>;
}

pub type CatalogStoreRef = Arc<dyn CatalogStore>;
pub type OrderStoreRef = Arc<dyn OrderStore>;
pub type PaymentStoreRef = Arc<dyn PaymentStore>;
