#![allow(dead_code)]

use orderflow::application::service::OrderService;
use orderflow::domain::catalog::{Customer, Product};
use orderflow::domain::money::{Amount, Money};
use orderflow::domain::ports::CatalogStore;
use orderflow::infrastructure::in_memory::{
    InMemoryCatalogStore, InMemoryOrderStore, InMemoryPaymentStore,
};
use rust_decimal::Decimal;
use std::fs::File;
use std::io::Error;
use std::path::Path;
use std::sync::Arc;

pub const REQUEST_HEADER: [&str; 7] = [
    "type", "customer", "order", "items", "amount", "payment", "status",
];

/// An in-memory service with customer 1 and the given `(name, price, quantity)`
/// products, numbered from 1.
pub async fn service_with(products: &[(&str, Decimal, u32)]) -> OrderService {
    let catalog = InMemoryCatalogStore::new();
    catalog.store_customer(Customer::new(1, "Alice")).await.unwrap();
    for (id, (name, price, quantity)) in (1..).zip(products) {
        catalog
            .store_product(Product::new(id, *name, Money::new(*price), *quantity))
            .await
            .unwrap();
    }

    OrderService::new(
        Arc::new(catalog),
        Arc::new(InMemoryOrderStore::new()),
        Arc::new(InMemoryPaymentStore::new()),
    )
}

pub fn amount(value: Decimal) -> Amount {
    Amount::new(value).unwrap()
}

/// Writes a request script creating `orders` single-item orders of product 1
/// for customer 1, each paid in full by card at `price`.
pub fn generate_requests(path: &Path, orders: usize, price: &str) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(REQUEST_HEADER)?;

    for i in 1..=orders {
        wtr.write_record(["create", "1", "", "1x1", "", "", ""])?;
        wtr.write_record(["pay", "", &i.to_string(), "", price, "card", ""])?;
    }

    wtr.flush()?;
    Ok(())
}
