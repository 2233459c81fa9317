use super::inventory::InventoryLedger;
use super::lifecycle::OrderLifecycle;
use crate::domain::catalog::CustomerId;
use crate::domain::order::{LineRequest, Order, OrderLine};
use crate::domain::ports::CatalogStoreRef;
use crate::error::{OrderError, Result};
use std::sync::Arc;
use tracing::{error, warn};

/// Creates orders all-or-nothing.
///
/// Either every line is reserved and the order is persisted as `Pending`, or
/// every reservation made for the attempt is released and nothing is persisted.
pub struct OrderCreationWorkflow {
    catalog: CatalogStoreRef,
    inventory: Arc<InventoryLedger>,
    lifecycle: Arc<OrderLifecycle>,
}

impl OrderCreationWorkflow {
    pub fn new(
        catalog: CatalogStoreRef,
        inventory: Arc<InventoryLedger>,
        lifecycle: Arc<OrderLifecycle>,
    ) -> Self {
        Self {
            catalog,
            inventory,
            lifecycle,
        }
    }

    pub async fn create(&self, customer_id: CustomerId, requests: &[LineRequest]) -> Result<Order> {
        if requests.is_empty() {
            return Err(OrderError::ValidationError(
                "Order must have at least one item".to_string(),
            ));
        }

        self.catalog
            .get_customer(customer_id)
            .await?
            .ok_or_else(|| OrderError::not_found("Customer", customer_id))?;

        let mut lines = Vec::with_capacity(requests.len());
        for request in requests {
            match self
                .inventory
                .reserve(request.product_id, request.quantity)
                .await
            {
                Ok(product) => lines.push(OrderLine::snapshot(&product, request.quantity)),
                Err(e) => {
                    warn!(customer_id, product_id = request.product_id, error = %e, "order creation aborted");
                    self.roll_back(&lines).await;
                    return Err(e);
                }
            }
        }

        match self.lifecycle.create_initial(customer_id, lines.clone()).await {
            Ok(order) => Ok(order),
            Err(e) => {
                self.roll_back(&lines).await;
                Err(e)
            }
        }
    }

    async fn roll_back(&self, reserved: &[OrderLine]) {
        for line in reserved {
            if let Err(e) = self.inventory.release(line.product_id, line.quantity).await {
                error!(
                    product_id = line.product_id,
                    quantity = line.quantity,
                    error = %e,
                    "failed to release reservation during rollback"
                );
            }
        }
    }
}
