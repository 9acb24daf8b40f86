//! Application state shared across handlers.

use berthline_runtime::ReservationEngine;
use std::sync::Arc;

/// State handed to every handler through axum's `State` extractor.
///
/// Cloning is cheap; all clones share one engine.
#[derive(Clone, Debug)]
pub struct AppState {
    /// The reservation engine backing every ticket endpoint
    pub engine: Arc<ReservationEngine>,
}

impl AppState {
    /// Wrap an engine.
    #[must_use]
    pub fn new(engine: ReservationEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}
