//! CSV adapters for the command-line driver.

pub mod catalog_reader;
pub mod order_writer;
pub mod request_reader;
