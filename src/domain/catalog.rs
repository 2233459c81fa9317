use super::money::Money;
use serde::{Deserialize, Serialize};

pub type ProductId = u32;
pub type CustomerId = u32;

/// A sellable product and the stock still available for new orders.
///
/// `available_quantity` is unsigned and only ever changed through the
/// inventory ledger, so it cannot be driven below zero.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
    #[serde(rename = "quantity")]
    pub available_quantity: u32,
}

impl Product {
    pub fn new(id: ProductId, name: impl Into<String>, price: Money, available_quantity: u32) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            available_quantity,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
}

impl Customer {
    pub fn new(id: CustomerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Catalog used when no seed files are given.
pub fn default_catalog() -> (Vec<Customer>, Vec<Product>) {
    let customers = ["Alice", "Bob", "Mike", "Jason", "Katy"]
        .into_iter()
        .zip(1..)
        .map(|(name, id)| Customer::new(id, name))
        .collect();

    let products = [
        ("Phone", 800, 50),
        ("Tablet", 400, 50),
        ("Monitor", 300, 50),
        ("Keyboard", 50, 50),
        ("Mouse", 30, 50),
        ("Printer", 200, 50),
        ("Camera", 500, 50),
        ("Speaker", 100, 50),
        ("Router", 80, 10),
        ("SSD", 150, 10),
        ("HDD", 100, 10),
        ("RAM", 60, 15),
        ("Power Bank", 40, 18),
        ("Webcam", 70, 11),
    ]
    .into_iter()
    .zip(1..)
    .map(|((name, price, quantity), id)| {
        Product::new(id, name, Money::new(price.into()), quantity)
    })
    .collect();

    (customers, products)
}
