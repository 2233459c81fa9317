//! Domain layer: entities, value objects and the storage ports they are
//! persisted through.

pub mod catalog;
pub mod money;
pub mod order;
pub mod payment;
pub mod ports;
