use super::locks::KeyedLocks;
use crate::domain::catalog::CustomerId;
use crate::domain::order::{Order, OrderId, OrderLine, OrderStatus};
use crate::domain::ports::OrderStoreRef;
use crate::error::{OrderError, Result};
use tracing::info;

/// Owns order status and enforces the transition table.
///
/// Every status change reads the current status and writes the new one under
/// a per-order lock, so concurrent transitions on one order are linearized.
pub struct OrderLifecycle {
    orders: OrderStoreRef,
    locks: KeyedLocks<OrderId>,
}

impl OrderLifecycle {
    pub fn new(orders: OrderStoreRef) -> Self {
        Self {
            orders,
            locks: KeyedLocks::new(),
        }
    }

    /// Persists a new order in `Pending`.
    ///
    /// Callers must have reserved stock for every line beforehand.
    pub async fn create_initial(
        &self,
        customer_id: CustomerId,
        lines: Vec<OrderLine>,
    ) -> Result<Order> {
        let id = self.orders.next_id().await?;
        let order = Order::pending(id, customer_id, lines)?;
        self.orders.store(order.clone()).await?;
        info!(
            order_id = id,
            customer_id,
            billing_amount = %order.billing_amount,
            "order created"
        );
        Ok(order)
    }

    /// Moves an order to `target` if the transition table allows it.
    ///
    /// Does not look at stock or payments.
    pub async fn transition(&self, order_id: OrderId, target: OrderStatus) -> Result<Order> {
        let _guard = self.locks.lock(&order_id).await;
        let mut order = self.get(order_id).await?;

        if !order.status.can_transition_to(target) {
            return Err(OrderError::InvalidOrderStatus {
                order_id,
                from: order.status,
                to: target,
            });
        }

        let from = order.status;
        order.status = target;
        self.orders.store(order.clone()).await?;
        info!(order_id, %from, to = %target, "order status changed");
        Ok(order)
    }

    /// Cancels a `Pending` order. Stock is not released here.
    pub async fn cancel(&self, order_id: OrderId) -> Result<Order> {
        self.transition(order_id, OrderStatus::Cancelled).await
    }

    pub async fn get(&self, order_id: OrderId) -> Result<Order> {
        self.orders
            .get(order_id)
            .await?
            .ok_or_else(|| OrderError::not_found("Order", order_id))
    }

    pub async fn list(&self, status: Option<OrderStatus>) -> Result<Vec<Order>> {
        match status {
            Some(status) => self.orders.by_status(status).await,
            None => self.orders.get_all().await,
        }
    }
}
