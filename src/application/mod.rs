//! Application layer: the components that own inventory, order status and
//! payments, and the workflows and background process built on them.
//!
//! Every component serializes its writes per entity with [`locks::KeyedLocks`];
//! the stores underneath only need single-row atomicity.

pub mod inventory;
pub mod lifecycle;
pub mod locks;
pub mod payments;
pub mod scheduler;
pub mod service;
pub mod workflow;
