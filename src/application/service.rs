use super::inventory::InventoryLedger;
use super::lifecycle::OrderLifecycle;
use super::payments::{PaymentReconciler, SettlementDecision};
use super::scheduler::{ReconciliationScheduler, ReconciliationSweep, SweepReport};
use super::workflow::OrderCreationWorkflow;
use crate::domain::catalog::{Customer, CustomerId, Product, ProductId, default_catalog};
use crate::domain::money::{Amount, Money};
use crate::domain::order::{LineRequest, Order, OrderId, OrderStatus};
use crate::domain::payment::{Payment, PaymentKind};
use crate::domain::ports::{CatalogStoreRef, OrderStoreRef, PaymentStoreRef};
use crate::error::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// A request against the order API.
#[derive(Debug, PartialEq, Clone)]
pub enum Request {
    CreateOrder {
        customer_id: CustomerId,
        lines: Vec<LineRequest>,
    },
    SubmitPayment {
        order_id: OrderId,
        amount: Amount,
        kind: PaymentKind,
    },
    CancelOrder {
        order_id: OrderId,
    },
    UpdateStatus {
        order_id: OrderId,
        status: OrderStatus,
    },
    Sweep,
}

/// The operations exposed to request handlers.
///
/// Wires the ledger, lifecycle, reconciler and creation workflow over shared
/// stores. Cloning is cheap; clones share the same components and locks.
#[derive(Clone)]
pub struct OrderService {
    catalog: CatalogStoreRef,
    inventory: Arc<InventoryLedger>,
    lifecycle: Arc<OrderLifecycle>,
    reconciler: Arc<PaymentReconciler>,
    workflow: Arc<OrderCreationWorkflow>,
    sweep: Arc<ReconciliationSweep>,
}

impl OrderService {
    pub fn new(catalog: CatalogStoreRef, orders: OrderStoreRef, payments: PaymentStoreRef) -> Self {
        let inventory = Arc::new(InventoryLedger::new(Arc::clone(&catalog)));
        let lifecycle = Arc::new(OrderLifecycle::new(orders));
        let reconciler = Arc::new(PaymentReconciler::new(Arc::clone(&lifecycle), payments));
        let sweep = Arc::new(ReconciliationSweep::new(
            Arc::clone(&lifecycle),
            Arc::clone(&reconciler),
        ));
        let workflow = Arc::new(OrderCreationWorkflow::new(
            Arc::clone(&catalog),
            Arc::clone(&inventory),
            Arc::clone(&lifecycle),
        ));

        Self {
            catalog,
            inventory,
            lifecycle,
            reconciler,
            workflow,
            sweep,
        }
    }

    /// Stores the given customers and products, overwriting existing entries.
    ///
    /// Product stock is written directly rather than through the inventory
    /// ledger, so this must only run before requests are processed and before
    /// the scheduler is started.
    pub async fn seed_catalog(&self, customers: Vec<Customer>, products: Vec<Product>) -> Result<()> {
        let (customer_count, product_count) = (customers.len(), products.len());
        for customer in customers {
            self.catalog.store_customer(customer).await?;
        }
        for product in products {
            self.catalog.store_product(product).await?;
        }
        info!(customers = customer_count, products = product_count, "catalog seeded");
        Ok(())
    }

    /// Seeds the built-in catalog if no products exist yet.
    ///
    /// Same restriction as [`Self::seed_catalog`].
    ///
    /// Returns whether anything was written.
    pub async fn seed_default_catalog(&self) -> Result<bool> {
        if !self.catalog.products().await?.is_empty() {
            return Ok(false);
        }
        let (customers, products) = default_catalog();
        self.seed_catalog(customers, products).await?;
        Ok(true)
    }

    /// Builds the background scheduler over this service's components.
    pub fn scheduler(&self, period: Duration, shutdown: CancellationToken) -> ReconciliationScheduler {
        ReconciliationScheduler::new(Arc::clone(&self.sweep), period, shutdown)
    }

    /// Runs one reconciliation pass outside the periodic schedule.
    pub async fn sweep(&self) -> SweepReport {
        self.sweep.run(&CancellationToken::new()).await
    }

    pub async fn create_order(&self, customer_id: CustomerId, lines: &[LineRequest]) -> Result<Order> {
        self.workflow.create(customer_id, lines).await
    }

    pub async fn get_order(&self, order_id: OrderId) -> Result<Order> {
        self.lifecycle.get(order_id).await
    }

    pub async fn list_orders(&self, status: Option<OrderStatus>) -> Result<Vec<Order>> {
        self.lifecycle.list(status).await
    }

    pub async fn update_status(&self, order_id: OrderId, status: OrderStatus) -> Result<Order> {
        self.lifecycle.transition(order_id, status).await
    }

    /// Cancels a pending order and returns its reserved stock.
    pub async fn cancel_order(&self, order_id: OrderId) -> Result<Order> {
        let order = self.lifecycle.cancel(order_id).await?;
        let mut first_failure = None;
        for line in &order.lines {
            if let Err(e) = self.inventory.release(line.product_id, line.quantity).await {
                error!(
                    order_id,
                    product_id = line.product_id,
                    quantity = line.quantity,
                    error = %e,
                    "cancelled order could not release stock"
                );
                first_failure.get_or_insert(e);
            }
        }
        match first_failure {
            Some(e) => Err(e),
            None => Ok(order),
        }
    }

    pub async fn submit_payment(
        &self,
        order_id: OrderId,
        amount: Amount,
        kind: PaymentKind,
    ) -> Result<SettlementDecision> {
        self.reconciler.apply(order_id, amount, kind).await
    }

    pub async fn payments(&self, order_id: OrderId) -> Result<Vec<Payment>> {
        self.reconciler.payments(order_id).await
    }

    pub async fn paid_total(&self, order_id: OrderId) -> Result<Money> {
        self.reconciler.paid_total(order_id).await
    }

    pub async fn available_stock(&self, product_id: ProductId) -> Result<u32> {
        self.inventory.available(product_id).await
    }

    /// Processes one request end to end.
    pub async fn process_request(&self, request: Request) -> Result<()> {
        match request {
            Request::CreateOrder { customer_id, lines } => {
                let order = self.create_order(customer_id, &lines).await?;
                info!(order_id = order.id, billing_amount = %order.billing_amount, "order accepted");
            }
            Request::SubmitPayment {
                order_id,
                amount,
                kind,
            } => {
                let decision = self.submit_payment(order_id, amount, kind).await?;
                info!(order_id, settled = decision.is_settled(), "payment processed");
            }
            Request::CancelOrder { order_id } => {
                self.cancel_order(order_id).await?;
            }
            Request::UpdateStatus { order_id, status } => {
                self.update_status(order_id, status).await?;
            }
            Request::Sweep => {
                self.sweep().await;
            }
        }
        Ok(())
    }
}
