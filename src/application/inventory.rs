use super::locks::KeyedLocks;
use crate::domain::catalog::{Product, ProductId};
use crate::domain::ports::CatalogStoreRef;
use crate::error::{OrderError, Result};
use tracing::{debug, info};

/// Owns the available quantity of every product.
///
/// Reserve and release run the read, the check and the write under a
/// per-product lock, so two reservations on the same product can never both
/// observe the same stock level.
pub struct InventoryLedger {
    catalog: CatalogStoreRef,
    locks: KeyedLocks<ProductId>,
}

impl InventoryLedger {
    pub fn new(catalog: CatalogStoreRef) -> Self {
        Self {
            catalog,
            locks: KeyedLocks::new(),
        }
    }

    /// Takes `quantity` units of a product out of stock.
    ///
    /// Returns the product as it was read under the lock, which is the price
    /// snapshot the order line is built from. Fails with `InsufficientStock`
    /// without touching the stock when not enough is available.
    pub async fn reserve(&self, product_id: ProductId, quantity: u32) -> Result<Product> {
        if quantity == 0 {
            return Err(OrderError::ValidationError(
                "Quantity must be at least 1".to_string(),
            ));
        }

        let _guard = self.locks.lock(&product_id).await;
        let mut product = self.load(product_id).await?;

        let Some(remaining) = product.available_quantity.checked_sub(quantity) else {
            debug!(
                product_id,
                requested = quantity,
                available = product.available_quantity,
                "reservation rejected"
            );
            return Err(OrderError::InsufficientStock {
                product_id,
                product: product.name,
                requested: quantity,
                available: product.available_quantity,
            });
        };

        product.available_quantity = remaining;
        self.catalog.store_product(product.clone()).await?;
        debug!(product_id, quantity, remaining, "stock reserved");
        Ok(product)
    }

    /// Puts `quantity` units back into stock.
    pub async fn release(&self, product_id: ProductId, quantity: u32) -> Result<()> {
        let _guard = self.locks.lock(&product_id).await;
        let mut product = self.load(product_id).await?;

        product.available_quantity = product
            .available_quantity
            .checked_add(quantity)
            .ok_or_else(|| OrderError::internal(format!("stock overflow on product {product_id}")))?;
        let restored = product.available_quantity;
        self.catalog.store_product(product).await?;
        info!(product_id, quantity, available = restored, "stock released");
        Ok(())
    }

    pub async fn available(&self, product_id: ProductId) -> Result<u32> {
        Ok(self.load(product_id).await?.available_quantity)
    }

    async fn load(&self, product_id: ProductId) -> Result<Product> {
        self.catalog
            .get_product(product_id)
            .await?
            .ok_or_else(|| OrderError::not_found("Product", product_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::Money;
    use crate::domain::ports::CatalogStore;
    use crate::infrastructure::in_memory::InMemoryCatalogStore;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    async fn ledger_with_stock(quantity: u32) -> InventoryLedger {
        let catalog = InMemoryCatalogStore::new();
        catalog
            .store_product(Product::new(1, "Router", Money::new(dec!(80)), quantity))
            .await
            .unwrap();
        InventoryLedger::new(Arc::new(catalog))
    }

    #[tokio::test]
    async fn test_reserve_decrements_stock() {
        let ledger = ledger_with_stock(10).await;
        let product = ledger.reserve(1, 4).await.unwrap();
        assert_eq!(product.available_quantity, 6);
        assert_eq!(product.price, Money::new(dec!(80)));
        assert_eq!(ledger.available(1).await.unwrap(), 6);
    }

    #[tokio::test]
    async fn test_reserve_exact_stock_reaches_zero() {
        let ledger = ledger_with_stock(3).await;
        ledger.reserve(1, 3).await.unwrap();
        assert_eq!(ledger.available(1).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_reserve_insufficient_leaves_stock_unchanged() {
        let ledger = ledger_with_stock(2).await;
        let err = ledger.reserve(1, 3).await.unwrap_err();
        assert!(matches!(
            err,
            OrderError::InsufficientStock {
                product_id: 1,
                requested: 3,
                available: 2,
                ..
            }
        ));
        assert_eq!(ledger.available(1).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_reserve_rejects_zero_and_unknown_product() {
        let ledger = ledger_with_stock(2).await;
        assert!(matches!(
            ledger.reserve(1, 0).await,
            Err(OrderError::ValidationError(_))
        ));
        assert!(matches!(
            ledger.reserve(99, 1).await,
            Err(OrderError::ResourceNotFound { entity: "Product", id: 99 })
        ));
    }

    #[tokio::test]
    async fn test_release_restores_stock() {
        let ledger = ledger_with_stock(5).await;
        ledger.reserve(1, 5).await.unwrap();
        ledger.release(1, 5).await.unwrap();
        assert_eq!(ledger.available(1).await.unwrap(), 5);
    }
}
