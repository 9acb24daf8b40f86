//! The reservation engine: every public operation is one store transaction.

use crate::health::HealthCheck;
use crate::metrics;
use crate::retry::{RetryPolicy, retry_with_predicate};
use berthline_core::catalog::{TOTAL_BERTHS, standard_catalog};
use berthline_core::environment::{Clock, SystemClock};
use berthline_core::store::{BerthStore, LedgerTransaction, LockMode};
use berthline_core::{Berth, BookingError, StoreError, Ticket, TicketId, TicketStatus};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

/// Serves booking, cancellation and read operations against a [`BerthStore`].
///
/// The engine is stateless apart from its collaborators, so it is shared
/// behind an `Arc` by every request handler.
pub struct ReservationEngine {
    pub(crate) store: Arc<dyn BerthStore>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) retry: RetryPolicy,
}

impl ReservationEngine {
    /// Create an engine over `store` using wall-clock time and the default
    /// retry policy.
    #[must_use]
    pub fn new(store: Arc<dyn BerthStore>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            retry: RetryPolicy::default(),
        }
    }

    /// Replace the clock used to stamp `created_at`.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the policy used to retry conflicting transactions.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Seed the standard catalog if the inventory is empty.
    ///
    /// Returns the number of berths inserted: the catalog size on first run,
    /// zero afterwards. Safe to call on every start.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store fails.
    pub async fn initialize(&self) -> Result<usize, StoreError> {
        retry_with_predicate(
            self.retry.clone(),
            "initialize",
            move || async move {
                let mut tx = self.store.begin().await?;
                if tx.berth_count().await? > 0 {
                    return Ok(0);
                }
                let catalog = standard_catalog();
                let inserted = catalog.len();
                tx.insert_berths(catalog).await?;
                tx.commit().await?;
                Ok(inserted)
            },
            |err: &StoreError| err.is_retryable(),
        )
        .await
        .inspect(|&inserted| {
            if inserted > 0 {
                tracing::info!(berths = inserted, "Seeded berth catalog");
            } else {
                tracing::debug!("Berth catalog already present");
            }
        })
    }

    /// Every ticket whose status is `confirmed` or `RAC`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Store`] if the store fails.
    pub async fn list_booked(&self) -> Result<Vec<Ticket>, BookingError> {
        self.read("list_booked", |mut tx| async move {
            Ok(tx.list_by_statuses(&TicketStatus::BOOKED).await?)
        })
        .await
    }

    /// Every unoccupied berth in berth-number order.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Store`] if the store fails.
    pub async fn list_available_berths(&self) -> Result<Vec<Berth>, BookingError> {
        let berths = self
            .read("list_available_berths", |mut tx| async move {
                Ok(tx.unoccupied_berths(LockMode::Shared).await?)
            })
            .await?;
        metrics::set_berths_available(berths.len());
        Ok(berths)
    }

    /// The whole inventory in berth-number order.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Store`] if the store fails.
    pub async fn berths(&self) -> Result<Vec<Berth>, BookingError> {
        self.read("berths", |mut tx| async move { Ok(tx.berths().await?) })
            .await
    }

    /// A single ticket with its manifest.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::TicketNotFound`] for an unknown identifier.
    pub async fn ticket(&self, id: TicketId) -> Result<Ticket, BookingError> {
        self.read("ticket", |mut tx| async move {
            tx.find_by_id(id, LockMode::Shared)
                .await?
                .ok_or(BookingError::TicketNotFound(id))
        })
        .await
    }

    /// Probe the store: it must answer and hold the full catalog.
    pub async fn health_check(&self) -> HealthCheck {
        let probe = async {
            let mut tx = self.store.begin().await?;
            tx.berth_count().await
        };
        match probe.await {
            Ok(count) if count == u64::from(TOTAL_BERTHS) => {
                HealthCheck::healthy("store").with_metadata("berths", count.to_string())
            }
            Ok(count) => HealthCheck::degraded(
                "store",
                format!("expected {TOTAL_BERTHS} berths, found {count}"),
            )
            .with_metadata("berths", count.to_string()),
            Err(err) => HealthCheck::unhealthy("store", err.to_string()),
        }
    }

    /// Run a read-only transaction. It is dropped, not committed.
    async fn read<T, F, Fut>(&self, operation: &'static str, body: F) -> Result<T, BookingError>
    where
        F: Fn(Box<dyn LedgerTransaction>) -> Fut,
        Fut: Future<Output = Result<T, BookingError>>,
    {
        let body = &body;
        self.run(operation, move || async move {
            let tx = self.store.begin().await?;
            body(tx).await
        })
        .await
    }

    /// Run `attempt` under the retry policy, recording conflicts and latency.
    pub(crate) async fn run<T, F, Fut>(
        &self,
        operation: &'static str,
        attempt: F,
    ) -> Result<T, BookingError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, BookingError>>,
    {
        let started = Instant::now();
        let result = retry_with_predicate(self.retry.clone(), operation, attempt, |err: &BookingError| {
            let retryable = err.is_retryable();
            if retryable {
                metrics::record_conflict(operation);
            }
            retryable
        })
        .await;
        metrics::record_duration(operation, started.elapsed());
        result
    }
}

impl std::fmt::Debug for ReservationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReservationEngine")
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}
