//! Prometheus metrics for the reservation engine.
//!
//! Metric families:
//!
//! - `berthline_bookings_total{status}` - tickets issued, by ticket status
//! - `berthline_booking_rejections_total{reason}` - bookings refused, by error code
//! - `berthline_cancellations_total{status}` - tickets cancelled, by prior status
//! - `berthline_promotions_total` - RAC tickets promoted to confirmed
//! - `berthline_berths_available` - free berths after the last observation
//! - `berthline_store_conflicts_total{operation}` - transactions retried on conflict
//! - `berthline_operation_duration_seconds{operation}` - end-to-end engine latency
//!
//! Recording is a no-op until a recorder is installed, so the engine and its
//! tests can call the helpers below without a running exporter.
//!
//! # Example
//!
//! ```rust,no_run
//! use berthline_runtime::metrics::MetricsServer;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut server = MetricsServer::new("0.0.0.0:9090".parse()?);
//! server.start()?;
//!
//! // Scrape output, served by the binary at http://localhost:9090/metrics
//! let _text = server.render();
//! # Ok(())
//! # }
//! ```

use berthline_core::TicketStatus;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Prometheus recorder plus the address its scrape endpoint is served on.
pub struct MetricsServer {
    addr: SocketAddr,
    handle: Option<PrometheusHandle>,
}

impl MetricsServer {
    /// Create a new metrics server.
    ///
    /// # Arguments
    ///
    /// * `addr` - Socket address the scrape endpoint binds to (e.g., `0.0.0.0:9090`)
    #[must_use]
    pub const fn new(addr: SocketAddr) -> Self {
        Self { addr, handle: None }
    }

    /// Address the scrape endpoint should be bound to.
    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Describe all metrics and install the Prometheus recorder.
    ///
    /// # Errors
    ///
    /// Returns error if the exporter cannot be built or installed.
    ///
    /// # Note
    ///
    /// If a recorder is already installed (e.g., in tests), this logs a
    /// warning and leaves [`Self::handle`] empty.
    pub fn start(&mut self) -> Result<(), MetricsError> {
        register_metrics();

        let builder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                &[0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5],
            )
            .map_err(|e| MetricsError::Build(e.to_string()))?;

        match builder.install_recorder() {
            Ok(handle) => {
                self.handle = Some(handle);
                tracing::info!(addr = %self.addr, "Metrics recorder installed");
                Ok(())
            }
            Err(e) => {
                let err_msg = e.to_string();
                if err_msg.contains("already initialized") {
                    tracing::warn!("Metrics recorder already initialized, skipping re-initialization");
                    Ok(())
                } else {
                    Err(MetricsError::Install(err_msg))
                }
            }
        }
    }

    /// Get the metrics handle for rendering.
    #[must_use]
    pub const fn handle(&self) -> Option<&PrometheusHandle> {
        self.handle.as_ref()
    }

    /// Render current metrics in Prometheus text format.
    ///
    /// Returns `None` if the recorder hasn't been installed by this server.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        self.handle.as_ref().map(PrometheusHandle::render)
    }
}

fn register_metrics() {
    describe_counter!(
        "berthline_bookings_total",
        "Total number of tickets issued, labelled by ticket status"
    );
    describe_counter!(
        "berthline_booking_rejections_total",
        "Total number of bookings refused, labelled by reason"
    );
    describe_counter!(
        "berthline_cancellations_total",
        "Total number of tickets cancelled, labelled by status at cancellation"
    );
    describe_counter!(
        "berthline_promotions_total",
        "Total number of RAC tickets promoted to confirmed"
    );
    describe_gauge!(
        "berthline_berths_available",
        "Unoccupied berths at the last booking or availability query"
    );
    describe_counter!(
        "berthline_store_conflicts_total",
        "Total number of store transactions retried after a conflict"
    );
    describe_histogram!(
        "berthline_operation_duration_seconds",
        "End-to-end latency of engine operations"
    );
}

pub(crate) fn record_booking(status: TicketStatus) {
    counter!("berthline_bookings_total", "status" => status.as_str()).increment(1);
}

pub(crate) fn record_rejection(reason: &'static str) {
    counter!("berthline_booking_rejections_total", "reason" => reason).increment(1);
}

pub(crate) fn record_cancellation(status: TicketStatus) {
    counter!("berthline_cancellations_total", "status" => status.as_str()).increment(1);
}

pub(crate) fn record_promotion() {
    counter!("berthline_promotions_total").increment(1);
}

pub(crate) fn record_conflict(operation: &'static str) {
    counter!("berthline_store_conflicts_total", "operation" => operation).increment(1);
}

#[allow(clippy::cast_precision_loss)]
pub(crate) fn set_berths_available(count: usize) {
    gauge!("berthline_berths_available").set(count as f64);
}

pub(crate) fn record_duration(operation: &'static str, elapsed: Duration) {
    histogram!("berthline_operation_duration_seconds", "operation" => operation)
        .record(elapsed.as_secs_f64());
}
