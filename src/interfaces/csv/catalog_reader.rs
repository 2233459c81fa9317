use crate::error::{OrderError, Result};
use serde::de::DeserializeOwned;
use std::io::Read;

/// Reads catalog seed rows (products or customers) from a CSV source.
///
/// Products use the columns `id, name, price, quantity`; customers use
/// `id, name`.
pub struct CatalogReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CatalogReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(source);
        Self { reader }
    }

    pub fn records<T: DeserializeOwned>(self) -> impl Iterator<Item = Result<T>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(OrderError::from))
    }
}
