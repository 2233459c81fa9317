use super::catalog::{CustomerId, Product, ProductId};
use super::money::Money;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub type OrderId = u64;

/// Lifecycle status of an order.
///
/// The legal edges are listed in [`OrderStatus::can_transition_to`]; everything
/// else is rejected with `InvalidOrderStatus`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    /// The transition table.
    pub const fn can_transition_to(self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Processing)
                | (OrderStatus::Pending, OrderStatus::Cancelled)
                | (OrderStatus::Processing, OrderStatus::Shipped)
                | (OrderStatus::Shipped, OrderStatus::Delivered)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// One reserved line of an order.
///
/// The unit price is copied from the product when the line is reserved, so
/// later catalog price changes do not alter existing orders.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Money,
}

impl OrderLine {
    pub fn snapshot(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id,
            product_name: product.name.clone(),
            quantity,
            unit_price: product.price,
        }
    }

    pub fn net_price(&self) -> Result<Money> {
        self.unit_price.times(self.quantity)
    }
}

/// Requested product and quantity for a new order.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct LineRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl LineRequest {
    pub fn new(product_id: ProductId, quantity: u32) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    /// Sum of line net prices, fixed when the order is created.
    pub billing_amount: Money,
    pub lines: Vec<OrderLine>,
}

impl Order {
    /// Builds a new `Pending` order billed at the sum of its line net prices.
    ///
    /// Fails when the billing amount does not fit the decimal range.
    pub fn pending(id: OrderId, customer_id: CustomerId, lines: Vec<OrderLine>) -> Result<Self> {
        let billing_amount = lines
            .iter()
            .try_fold(Money::ZERO, |total, line| total.checked_add(line.net_price()?))?;
        Ok(Self {
            id,
            customer_id,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
            billing_amount,
            lines,
        })
    }
}
