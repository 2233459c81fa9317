use super::lifecycle::OrderLifecycle;
use super::locks::KeyedLocks;
use crate::domain::money::{Amount, Money};
use crate::domain::order::{Order, OrderId, OrderStatus};
use crate::domain::payment::{self, Payment, PaymentKind, PaymentState};
use crate::domain::ports::PaymentStoreRef;
use crate::error::{OrderError, Result};
use std::sync::Arc;
use tracing::{info, warn};

/// Outcome of applying a payment to an order.
#[derive(Debug, PartialEq, Clone)]
pub enum SettlementDecision {
    /// The order reached settlement with this payment and moved to `Processing`.
    Settled { payment: Payment },
    /// The payment was recorded but the order is not yet fully paid.
    Partial {
        payment: Payment,
        outstanding: Money,
    },
    /// Nothing changed on the order. `payment` is set when a row was still recorded.
    Unchanged { payment: Option<Payment> },
}

impl SettlementDecision {
    pub fn is_settled(&self) -> bool {
        matches!(self, SettlementDecision::Settled { .. })
    }

    pub fn payment(&self) -> Option<&Payment> {
        match self {
            SettlementDecision::Settled { payment } | SettlementDecision::Partial { payment, .. } => {
                Some(payment)
            }
            SettlementDecision::Unchanged { payment } => payment.as_ref(),
        }
    }
}

/// Accumulates payments per order and decides settlement.
///
/// Applications on the same order run one at a time under a per-order lock,
/// so the running total read for a decision is always the latest one. The
/// lock is taken before the lifecycle's own lock and never the other way
/// round.
pub struct PaymentReconciler {
    lifecycle: Arc<OrderLifecycle>,
    payments: PaymentStoreRef,
    locks: KeyedLocks<OrderId>,
}

impl PaymentReconciler {
    pub fn new(lifecycle: Arc<OrderLifecycle>, payments: PaymentStoreRef) -> Self {
        Self {
            lifecycle,
            payments,
            locks: KeyedLocks::new(),
        }
    }

    /// Applies a submitted payment.
    ///
    /// Cash on delivery settles a `Pending` order on its own and is a no-op on
    /// any other status. Card payments are recorded as `Partial` or `Success`
    /// depending on whether the running total reaches the billing amount.
    pub async fn apply(
        &self,
        order_id: OrderId,
        amount: Amount,
        kind: PaymentKind,
    ) -> Result<SettlementDecision> {
        let _guard = self.locks.lock(&order_id).await;
        let order = self.lifecycle.get(order_id).await?;

        match kind {
            PaymentKind::CashOnDelivery => self.apply_cash_on_delivery(order).await,
            PaymentKind::CardPayment => self.apply_card(order, amount.into()).await,
        }
    }

    /// Re-derives settlement from the payments already on file and promotes a
    /// `Pending` order that turns out to be settled. Records nothing.
    ///
    /// Returns whether the order was promoted.
    pub async fn reconcile(&self, order_id: OrderId) -> Result<bool> {
        let _guard = self.locks.lock(&order_id).await;
        let order = self.lifecycle.get(order_id).await?;
        if order.status != OrderStatus::Pending {
            return Ok(false);
        }

        let payments = self.payments.for_order(order_id).await?;
        if payments.is_empty() || !payment::is_settled(&order, &payments)? {
            return Ok(false);
        }

        info!(order_id, "settled order found pending, promoting");
        self.promote(order_id).await
    }

    pub async fn payments(&self, order_id: OrderId) -> Result<Vec<Payment>> {
        self.payments.for_order(order_id).await
    }

    pub async fn paid_total(&self, order_id: OrderId) -> Result<Money> {
        let payments = self.payments.for_order(order_id).await?;
        payment::settled_total(&payments)
    }

    async fn apply_cash_on_delivery(&self, order: Order) -> Result<SettlementDecision> {
        if order.status != OrderStatus::Pending {
            info!(order_id = order.id, status = %order.status, "cash on delivery ignored");
            return Ok(SettlementDecision::Unchanged { payment: None });
        }

        // Cash is collected in full on delivery.
        let payment = self
            .record(
                order.id,
                PaymentKind::CashOnDelivery,
                PaymentState::Success,
                order.billing_amount,
            )
            .await?;

        if self.promote(order.id).await? {
            Ok(SettlementDecision::Settled { payment })
        } else {
            Ok(SettlementDecision::Unchanged {
                payment: Some(payment),
            })
        }
    }

    async fn apply_card(&self, order: Order, amount: Money) -> Result<SettlementDecision> {
        if order.status == OrderStatus::Cancelled {
            return Err(OrderError::InvalidOrderStatus {
                order_id: order.id,
                from: order.status,
                to: OrderStatus::Processing,
            });
        }

        let previous = self.paid_total(order.id).await?;
        let new_total = previous.checked_add(amount)?;
        let state = if new_total >= order.billing_amount {
            PaymentState::Success
        } else {
            PaymentState::Partial
        };

        let payment = self
            .record(order.id, PaymentKind::CardPayment, state, amount)
            .await?;

        if state == PaymentState::Partial {
            return Ok(SettlementDecision::Partial {
                payment,
                outstanding: order.billing_amount.saturating_sub(new_total),
            });
        }

        if order.status == OrderStatus::Pending && self.promote(order.id).await? {
            Ok(SettlementDecision::Settled { payment })
        } else {
            Ok(SettlementDecision::Unchanged {
                payment: Some(payment),
            })
        }
    }

    async fn record(
        &self,
        order_id: OrderId,
        kind: PaymentKind,
        state: PaymentState,
        amount: Money,
    ) -> Result<Payment> {
        let id = self.payments.next_id().await?;
        let payment = Payment::record(id, order_id, kind, state, amount);
        self.payments.append(payment.clone()).await?;
        info!(
            order_id,
            payment_id = id,
            reference = %payment.reference,
            kind = ?kind,
            state = ?state,
            amount = %amount,
            "payment recorded"
        );
        Ok(payment)
    }

    /// Moves the order to `Processing`. A concurrent cancellation wins; that
    /// case is reported as `false` rather than an error.
    async fn promote(&self, order_id: OrderId) -> Result<bool> {
        match self
            .lifecycle
            .transition(order_id, OrderStatus::Processing)
            .await
        {
            Ok(_) => Ok(true),
            Err(OrderError::InvalidOrderStatus { from, .. }) => {
                warn!(order_id, %from, "settled order could not be promoted");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}
