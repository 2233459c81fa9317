use super::lifecycle::OrderLifecycle;
use super::payments::PaymentReconciler;
use crate::domain::order::OrderStatus;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Counters for one sweep.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct SweepReport {
    pub examined: usize,
    pub promoted: usize,
    pub failed: usize,
    /// Set when shutdown interrupted the sweep before every order was examined.
    pub interrupted: bool,
}

/// One reconciliation pass over the orders currently `Pending`.
///
/// A pending order is promoted only when the payments already on file settle
/// it; the pass goes through [`PaymentReconciler::reconcile`], the same path
/// request handlers use.
pub struct ReconciliationSweep {
    lifecycle: Arc<OrderLifecycle>,
    reconciler: Arc<PaymentReconciler>,
}

impl ReconciliationSweep {
    pub fn new(lifecycle: Arc<OrderLifecycle>, reconciler: Arc<PaymentReconciler>) -> Self {
        Self {
            lifecycle,
            reconciler,
        }
    }

    /// Failures on a single order are logged and counted; the pass moves on
    /// to the next order. Cancelling `shutdown` stops it between orders.
    pub async fn run(&self, shutdown: &CancellationToken) -> SweepReport {
        let mut report = SweepReport::default();

        let pending = match self.lifecycle.list(Some(OrderStatus::Pending)).await {
            Ok(orders) => orders,
            Err(e) => {
                error!(error = %e, "sweep could not list pending orders");
                return report;
            }
        };

        if pending.is_empty() {
            debug!("no pending orders, skipping sweep");
            return report;
        }

        for order in pending {
            if shutdown.is_cancelled() {
                info!("sweep interrupted by shutdown");
                report.interrupted = true;
                break;
            }

            report.examined += 1;
            match self.reconciler.reconcile(order.id).await {
                Ok(true) => report.promoted += 1,
                Ok(false) => {}
                Err(e) => {
                    report.failed += 1;
                    warn!(order_id = order.id, error = %e, "sweep failed for order");
                }
            }
        }

        info!(
            examined = report.examined,
            promoted = report.promoted,
            failed = report.failed,
            "sweep finished"
        );
        report
    }
}

/// Runs a [`ReconciliationSweep`] on a fixed period until shut down.
pub struct ReconciliationScheduler {
    sweep: Arc<ReconciliationSweep>,
    period: Duration,
    shutdown: CancellationToken,
}

impl ReconciliationScheduler {
    pub fn new(sweep: Arc<ReconciliationSweep>, period: Duration, shutdown: CancellationToken) -> Self {
        Self {
            sweep,
            period,
            shutdown,
        }
    }

    /// Runs sweeps every `period` until the shutdown token is cancelled.
    ///
    /// The first sweep happens one period after start. A sweep that is in
    /// progress when shutdown arrives stops between orders. A zero period, or
    /// one too large to schedule, is logged and the scheduler exits at once.
    pub async fn run(self) {
        let start = match Instant::now().checked_add(self.period) {
            Some(start) if !self.period.is_zero() => start,
            _ => {
                error!(period_secs = self.period.as_secs(), "invalid sweep period, scheduler not started");
                return;
            }
        };

        info!(period_secs = self.period.as_secs(), "reconciliation scheduler started");

        let mut ticker = tokio::time::interval_at(start, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    self.sweep().await;
                }
            }
        }

        info!("reconciliation scheduler stopped");
    }

    /// One sweep, interruptible by this scheduler's shutdown token.
    pub async fn sweep(&self) -> SweepReport {
        self.sweep.run(&self.shutdown).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::Product;
    use crate::domain::money::{Amount, Money};
    use crate::domain::order::OrderLine;
    use crate::domain::payment::{Payment, PaymentKind, PaymentState};
    use crate::domain::ports::PaymentStore;
    use crate::infrastructure::in_memory::{InMemoryOrderStore, InMemoryPaymentStore};
    use rust_decimal_macros::dec;

    struct Fixture {
        lifecycle: Arc<OrderLifecycle>,
        reconciler: Arc<PaymentReconciler>,
        payments: Arc<InMemoryPaymentStore>,
    }

    fn fixture() -> Fixture {
        let lifecycle = Arc::new(OrderLifecycle::new(Arc::new(InMemoryOrderStore::new())));
        let payments = Arc::new(InMemoryPaymentStore::new());
        let reconciler = Arc::new(PaymentReconciler::new(
            Arc::clone(&lifecycle),
            payments.clone(),
        ));
        Fixture {
            lifecycle,
            reconciler,
            payments,
        }
    }

    impl Fixture {
        fn scheduler(&self, period: Duration, shutdown: CancellationToken) -> ReconciliationScheduler {
            let sweep = ReconciliationSweep::new(Arc::clone(&self.lifecycle), Arc::clone(&self.reconciler));
            ReconciliationScheduler::new(Arc::new(sweep), period, shutdown)
        }

        async fn order(&self, billing: rust_decimal::Decimal) -> u64 {
            let product = Product::new(1, "HDD", Money::new(billing), 10);
            self.lifecycle
                .create_initial(1, vec![OrderLine::snapshot(&product, 1)])
                .await
                .unwrap()
                .id
        }

        async fn status(&self, id: u64) -> OrderStatus {
            self.lifecycle.get(id).await.unwrap().status
        }

        async fn write_unpromoted(&self, order_id: u64, kind: PaymentKind, amount: rust_decimal::Decimal) {
            let id = self.payments.next_id().await.unwrap();
            self.payments
                .append(Payment::record(
                    id,
                    order_id,
                    kind,
                    PaymentState::Success,
                    Money::new(amount),
                ))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_sweep_promotes_only_settled_orders() {
        let f = fixture();
        let unpaid = f.order(dec!(100)).await;
        let card = f.order(dec!(100)).await;
        let cod = f.order(dec!(100)).await;
        let partial = f.order(dec!(100)).await;

        f.write_unpromoted(card, PaymentKind::CardPayment, dec!(100)).await;
        f.write_unpromoted(cod, PaymentKind::CashOnDelivery, dec!(100)).await;
        f.reconciler
            .apply(partial, Amount::new(dec!(30)).unwrap(), PaymentKind::CardPayment)
            .await
            .unwrap();

        let report = f.scheduler(Duration::from_secs(300), CancellationToken::new()).sweep().await;
        assert_eq!(
            report,
            SweepReport {
                examined: 4,
                promoted: 2,
                failed: 0,
                interrupted: false,
            }
        );

        assert_eq!(f.status(unpaid).await, OrderStatus::Pending);
        assert_eq!(f.status(card).await, OrderStatus::Processing);
        assert_eq!(f.status(cod).await, OrderStatus::Processing);
        assert_eq!(f.status(partial).await, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_sweep_with_no_pending_orders() {
        let f = fixture();
        let id = f.order(dec!(10)).await;
        f.lifecycle.cancel(id).await.unwrap();

        let report = f.scheduler(Duration::from_secs(300), CancellationToken::new()).sweep().await;
        assert_eq!(report, SweepReport::default());
    }

    #[tokio::test]
    async fn test_sweep_stops_when_cancelled() {
        let f = fixture();
        f.order(dec!(10)).await;
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        let report = f.scheduler(Duration::from_secs(300), shutdown).sweep().await;
        assert!(report.interrupted);
        assert_eq!(report.examined, 0);
    }

    #[tokio::test]
    async fn test_run_ticks_until_shutdown() {
        let f = fixture();
        let id = f.order(dec!(50)).await;
        f.write_unpromoted(id, PaymentKind::CardPayment, dec!(50)).await;

        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(f.scheduler(Duration::from_millis(10), shutdown.clone()).run());

        let promoted = tokio::time::timeout(Duration::from_secs(5), async {
            while f.status(id).await != OrderStatus::Processing {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await;
        assert!(promoted.is_ok());

        shutdown.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_unschedulable_period_exits_without_panicking() {
        let f = fixture();
        let shutdown = CancellationToken::new();

        for period in [Duration::from_secs(u64::MAX), Duration::ZERO] {
            let handle = tokio::spawn(f.scheduler(period, shutdown.clone()).run());
            let finished = tokio::time::timeout(Duration::from_secs(5), handle).await;
            assert!(matches!(finished, Ok(Ok(()))));
        }
        assert!(!shutdown.is_cancelled());
    }
}
