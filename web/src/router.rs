//! Router configuration.

use crate::handlers::{health, tickets};
use crate::middleware::correlation_id_layer;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

/// Build the complete router.
///
/// Health probes live at the root; ticket endpoints are nested under
/// `/api/v1/tickets`. Every route runs inside the correlation ID span and
/// the HTTP trace layer.
pub fn build_router(state: AppState) -> Router {
    let ticket_routes = Router::new()
        .route("/book", post(tickets::book_ticket))
        .route("/cancel/:ticket_id", post(tickets::cancel_ticket))
        .route("/booked", get(tickets::list_booked))
        .route("/available", get(tickets::list_available))
        .route("/:ticket_id", get(tickets::get_ticket));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .nest("/api/v1/tickets", ticket_routes)
        .layer(TraceLayer::new_for_http())
        .layer(correlation_id_layer())
        .with_state(state)
}
