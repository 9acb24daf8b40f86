//! Axum HTTP gateway for the Berthline reservation engine.
//!
//! The gateway is a thin shell: handlers parse and validate JSON, call one
//! [`ReservationEngine`](berthline_runtime::ReservationEngine) operation and
//! map the outcome to a response. Domain rejections become 4xx responses
//! with a `{code, message}` body through [`AppError`]; store failures become
//! 500 with the cause logged but not returned.
//!
//! # Example
//!
//! ```no_run
//! use berthline_runtime::{InMemoryBerthStore, ReservationEngine};
//! use berthline_web::{AppState, build_router};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = ReservationEngine::new(Arc::new(InMemoryBerthStore::new()));
//! engine.initialize().await?;
//!
//! let app = build_router(AppState::new(engine));
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use error::AppError;
pub use middleware::{CORRELATION_ID_HEADER, CorrelationIdExt, correlation_id_layer};
pub use router::build_router;
pub use state::AppState;
