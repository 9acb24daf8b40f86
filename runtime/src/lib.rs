//! # Berthline Runtime
//!
//! The reservation engine and the stores it runs against.
//!
//! ## Core Components
//!
//! - **[`ReservationEngine`]**: booking, cancellation with RAC promotion, and
//!   read queries, each executed as one store transaction
//! - **[`InMemoryBerthStore`]**: single-writer store kept in process memory
//! - **Retry**: bounded exponential backoff for conflicting transactions
//! - **Metrics**: Prometheus counters for bookings, rejections and promotions
//!
//! ## Example
//!
//! ```rust
//! use berthline_core::{Gender, Passenger, TicketStatus};
//! use berthline_runtime::{InMemoryBerthStore, ReservationEngine};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = ReservationEngine::new(Arc::new(InMemoryBerthStore::new()));
//! engine.initialize().await?;
//!
//! let ticket = engine
//!     .book(vec![Passenger::new("Meera", 34, Gender::Female)])
//!     .await?;
//! assert_eq!(ticket.status, TicketStatus::Confirmed);
//!
//! let cancellation = engine.cancel(ticket.id).await?;
//! assert_eq!(cancellation.freed_berth, ticket.berth_number);
//! # Ok(())
//! # }
//! ```

mod booking;
mod engine;
mod memory;
mod promotion;

/// Health check results for readiness probes
pub mod health;

/// Prometheus metrics for observability
pub mod metrics;

/// Retry logic with exponential backoff
pub mod retry;

pub use engine::ReservationEngine;
pub use health::{HealthCheck, HealthStatus};
pub use memory::InMemoryBerthStore;
pub use promotion::{Cancellation, Promotion};
pub use retry::RetryPolicy;
