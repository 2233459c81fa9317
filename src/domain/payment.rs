use super::money::Money;
use super::order::{Order, OrderId};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type PaymentId = u64;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
pub enum PaymentKind {
    #[serde(rename = "cod", alias = "COD")]
    CashOnDelivery,
    #[serde(rename = "card", alias = "CARD_PAYMENT")]
    CardPayment,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum PaymentState {
    Partial,
    Success,
}

/// An immutable payment record.
///
/// Rows are appended and never updated; the running total for an order is
/// always recomputed from its rows.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Payment {
    pub id: PaymentId,
    pub order_id: OrderId,
    pub kind: PaymentKind,
    pub state: PaymentState,
    pub amount: Money,
    pub reference: Uuid,
}

impl Payment {
    /// Builds a payment with a freshly minted reference token.
    pub fn record(
        id: PaymentId,
        order_id: OrderId,
        kind: PaymentKind,
        state: PaymentState,
        amount: Money,
    ) -> Self {
        Self {
            id,
            order_id,
            kind,
            state,
            amount,
            reference: Uuid::new_v4(),
        }
    }

    pub fn counts_toward_settlement(&self) -> bool {
        matches!(self.state, PaymentState::Partial | PaymentState::Success)
    }
}

/// Sum of the amounts that count toward settling an order.
pub fn settled_total(payments: &[Payment]) -> Result<Money> {
    Money::total(
        payments
            .iter()
            .filter(|p| p.counts_toward_settlement())
            .map(|p| p.amount),
    )
}

/// Whether the payments on file settle the order.
///
/// A cash-on-delivery record settles on its own; card payments settle once
/// their total reaches the billing amount.
pub fn is_settled(order: &Order, payments: &[Payment]) -> Result<bool> {
    let cod_on_file = payments
        .iter()
        .any(|p| p.kind == PaymentKind::CashOnDelivery && p.state == PaymentState::Success);
    Ok(cod_on_file || settled_total(payments)? >= order.billing_amount)
}
