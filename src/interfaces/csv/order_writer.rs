use crate::domain::catalog::CustomerId;
use crate::domain::money::Money;
use crate::domain::order::{Order, OrderId, OrderStatus};
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

/// One output row: an order's final state and what has been paid against it.
#[derive(Debug, Serialize)]
struct OrderRow {
    order: OrderId,
    customer: CustomerId,
    status: OrderStatus,
    billing: String,
    paid: String,
    created_at: String,
}

impl OrderRow {
    fn new(order: &Order, paid: Money) -> Self {
        Self {
            order: order.id,
            customer: order.customer_id,
            status: order.status,
            billing: order.billing_amount.to_string(),
            paid: paid.to_string(),
            created_at: order.created_at.to_rfc3339(),
        }
    }
}

pub struct OrderWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> OrderWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    /// Writes `order,customer,status,billing,paid,created_at` rows and flushes.
    pub fn write_orders<I>(&mut self, orders: I) -> Result<()>
    where
        I: IntoIterator<Item = (Order, Money)>,
    {
        for (order, paid) in orders {
            self.writer.serialize(OrderRow::new(&order, paid))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::Product;
    use crate::domain::order::OrderLine;
    use rust_decimal_macros::dec;

    fn render(orders: Vec<(Order, Money)>) -> String {
        let mut buffer = Vec::new();
        OrderWriter::new(&mut buffer).write_orders(orders).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_write_orders() {
        let product = Product::new(3, "Monitor", Money::new(dec!(25.50)), 4);
        let mut order = Order::pending(7, 2, vec![OrderLine::snapshot(&product, 2)]).unwrap();
        order.status = OrderStatus::Processing;
        let created_at = order.created_at.to_rfc3339();

        let output = render(vec![(order, Money::new(dec!(51.000)))]);
        let mut lines = output.lines();

        assert_eq!(
            lines.next(),
            Some("order,customer,status,billing,paid,created_at")
        );
        assert_eq!(
            lines.next().map(str::to_string),
            Some(format!("7,2,processing,51,51,{created_at}"))
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_write_no_orders() {
        assert_eq!(render(Vec::new()), "");
    }
}
