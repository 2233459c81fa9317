use crate::domain::order::OrderStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrderError {
    #[error("{entity} not found with ID: {id}")]
    ResourceNotFound { entity: &'static str, id: u64 },
    #[error(
        "Insufficient stock for product: {product} (requested {requested}, available {available})"
    )]
    InsufficientStock {
        product_id: u32,
        product: String,
        requested: u32,
        available: u32,
    },
    #[error("Order {order_id} cannot move from {from} to {to}")]
    InvalidOrderStatus {
        order_id: u64,
        from: OrderStatus,
        to: OrderStatus,
    },
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
    #[cfg(feature = "storage-rocksdb")]
    #[error("Storage error: {0}")]
    StorageError(#[from] rocksdb::Error),
}

impl OrderError {
    pub fn not_found(entity: &'static str, id: impl Into<u64>) -> Self {
        Self::ResourceNotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(Box::new(std::io::Error::other(message.into())))
    }

    /// True for the failures a caller can act on (missing entity, stock, status, bad input).
    pub fn is_domain(&self) -> bool {
        matches!(
            self,
            Self::ResourceNotFound { .. }
                | Self::InsufficientStock { .. }
                | Self::InvalidOrderStatus { .. }
                | Self::ValidationError(_)
        )
    }
}

pub type Result<T, E = OrderError> = std::result::Result<T, E>;
