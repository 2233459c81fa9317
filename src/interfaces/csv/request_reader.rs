use crate::application::service::Request;
use crate::domain::catalog::CustomerId;
use crate::domain::money::Amount;
use crate::domain::order::{LineRequest, OrderId, OrderStatus};
use crate::domain::payment::PaymentKind;
use crate::error::{OrderError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum RequestType {
    Create,
    Pay,
    Cancel,
    Status,
    Sweep,
}

/// One raw row of a request script.
///
/// Columns: `type, customer, order, items, amount, payment, status`. Which
/// columns are required depends on `type`.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct RequestRecord {
    pub r#type: RequestType,
    pub customer: Option<CustomerId>,
    pub order: Option<OrderId>,
    /// `<product>x<quantity>` pairs separated by `;`, e.g. `3x2;5x1`.
    pub items: Option<String>,
    pub amount: Option<Decimal>,
    pub payment: Option<PaymentKind>,
    pub status: Option<OrderStatus>,
}

impl TryFrom<RequestRecord> for Request {
    type Error = OrderError;

    fn try_from(record: RequestRecord) -> Result<Self> {
        let request = match record.r#type {
            RequestType::Create => Request::CreateOrder {
                customer_id: required(record.customer, "customer")?,
                lines: parse_items(&required(record.items, "items")?)?,
            },
            RequestType::Pay => Request::SubmitPayment {
                order_id: required(record.order, "order")?,
                amount: Amount::new(required(record.amount, "amount")?)?,
                kind: required(record.payment, "payment")?,
            },
            RequestType::Cancel => Request::CancelOrder {
                order_id: required(record.order, "order")?,
            },
            RequestType::Status => Request::UpdateStatus {
                order_id: required(record.order, "order")?,
                status: required(record.status, "status")?,
            },
            RequestType::Sweep => Request::Sweep,
        };
        Ok(request)
    }
}

fn required<T>(value: Option<T>, column: &str) -> Result<T> {
    value.ok_or_else(|| OrderError::ValidationError(format!("Missing {column}")))
}

/// Parses `3x2;5x1` into line requests.
pub fn parse_items(items: &str) -> Result<Vec<LineRequest>> {
    items
        .split(';')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            let invalid = || OrderError::ValidationError(format!("Invalid item: {item}"));
            let (product, quantity) = item.split_once('x').ok_or_else(invalid)?;
            let product_id = product.trim().parse().map_err(|_| invalid())?;
            let quantity = quantity.trim().parse().map_err(|_| invalid())?;
            Ok(LineRequest::new(product_id, quantity))
        })
        .collect()
}

/// Reads requests from a CSV source.
///
/// Rows are deserialized lazily, so arbitrarily long scripts are processed
/// without loading them into memory.
pub struct RequestReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> RequestReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn requests(self) -> impl Iterator<Item = Result<Request>> {
        self.reader
            .into_deserialize::<RequestRecord>()
            .map(|result| result.map_err(OrderError::from).and_then(Request::try_from))
    }
}
