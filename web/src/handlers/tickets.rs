//! Ticket booking, cancellation and inventory endpoints.
//!
//! - `POST /api/v1/tickets/book` - book a berth for a passenger manifest
//! - `POST /api/v1/tickets/cancel/:ticket_id` - cancel a ticket
//! - `GET /api/v1/tickets/booked` - list confirmed and RAC tickets
//! - `GET /api/v1/tickets/available` - list unoccupied berths
//! - `GET /api/v1/tickets/:ticket_id` - fetch one ticket

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use berthline_core::{Berth, BerthNumber, BerthType, Passenger, Ticket, TicketId, TicketStatus};
use serde::{Deserialize, Serialize};

// ============================================================================
// Request / Response Types
// ============================================================================

/// Body of a booking request.
#[derive(Debug, Deserialize)]
pub struct BookRequest {
    /// Passengers travelling on the ticket, in manifest order
    pub passengers: Vec<Passenger>,
}

impl BookRequest {
    fn validate(&self) -> Result<(), AppError> {
        if self.passengers.is_empty() {
            return Err(AppError::validation("At least one passenger is required"));
        }
        if let Some(index) = self.passengers.iter().position(|p| p.name.trim().is_empty()) {
            return Err(AppError::validation(format!(
                "Passenger {} has an empty name",
                index + 1
            )));
        }
        Ok(())
    }
}

/// A ticket as returned by the API.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TicketResponse {
    /// Ledger-assigned identifier
    pub ticket_id: TicketId,
    /// `confirmed`, `RAC` or `waiting`
    pub status: TicketStatus,
    /// Held berth; `null` for waiting tickets
    pub berth_number: Option<BerthNumber>,
    /// Passenger manifest
    pub passengers: Vec<Passenger>,
}

impl From<Ticket> for TicketResponse {
    fn from(ticket: Ticket) -> Self {
        Self {
            ticket_id: ticket.id,
            status: ticket.status,
            berth_number: ticket.berth_number,
            passengers: ticket.passengers,
        }
    }
}

/// Result of a cancellation.
#[derive(Debug, Serialize, Deserialize)]
pub struct CancelResponse {
    /// Human-readable confirmation
    pub message: String,
    /// The cancelled ticket
    pub ticket_id: TicketId,
    /// Berth released by the cancellation, if the ticket held one
    pub freed_berth: Option<BerthNumber>,
    /// RAC ticket promoted to confirmed, if any
    pub promoted_ticket_id: Option<TicketId>,
}

/// An unoccupied berth.
#[derive(Debug, Serialize, Deserialize)]
pub struct AvailableBerth {
    /// Berth number
    pub berth_number: BerthNumber,
    /// Berth category
    #[serde(rename = "type")]
    pub berth_type: BerthType,
}

impl From<Berth> for AvailableBerth {
    fn from(berth: Berth) -> Self {
        Self {
            berth_number: berth.berth_number,
            berth_type: berth.berth_type,
        }
    }
}

/// Body of the availability listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct AvailableBerthsResponse {
    /// Unoccupied berths in berth-number order
    pub available_berths: Vec<AvailableBerth>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Book a berth for a passenger manifest.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8080/api/v1/tickets/book \
///   -H 'Content-Type: application/json' \
///   -d '{"passengers":[{"name":"Asha","age":67,"gender":"female"}]}'
/// # {"ticket_id":1,"status":"confirmed","berth_number":1,"passengers":[...]}
/// ```
///
/// # Errors
///
/// 422 for an empty manifest or a blank name, 400 when no berth is free or
/// the waiting list is full.
pub async fn book_ticket(
    State(state): State<AppState>,
    Json(request): Json<BookRequest>,
) -> Result<(StatusCode, Json<TicketResponse>), AppError> {
    request.validate()?;

    let ticket = state.engine.book(request.passengers).await?;

    Ok((StatusCode::CREATED, Json(ticket.into())))
}

/// Cancel a ticket, promoting the oldest RAC ticket when a confirmed berth
/// frees up.
///
/// # Errors
///
/// 404 if the ticket does not exist.
pub async fn cancel_ticket(
    Path(ticket_id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<CancelResponse>, AppError> {
    let cancellation = state.engine.cancel(TicketId::new(ticket_id)).await?;

    Ok(Json(CancelResponse {
        message: "Ticket canceled successfully".to_string(),
        ticket_id: cancellation.ticket_id,
        freed_berth: cancellation.freed_berth,
        promoted_ticket_id: cancellation.promoted.map(|p| p.ticket_id),
    }))
}

/// List confirmed and RAC tickets in ticket-id order.
///
/// # Errors
///
/// 500 if the store fails.
pub async fn list_booked(
    State(state): State<AppState>,
) -> Result<Json<Vec<TicketResponse>>, AppError> {
    let tickets = state.engine.list_booked().await?;
    Ok(Json(tickets.into_iter().map(TicketResponse::from).collect()))
}

/// List unoccupied berths.
///
/// # Errors
///
/// 500 if the store fails.
pub async fn list_available(
    State(state): State<AppState>,
) -> Result<Json<AvailableBerthsResponse>, AppError> {
    let berths = state.engine.list_available_berths().await?;
    Ok(Json(AvailableBerthsResponse {
        available_berths: berths.into_iter().map(AvailableBerth::from).collect(),
    }))
}

/// Fetch a single ticket.
///
/// # Errors
///
/// 404 if the ticket does not exist.
pub async fn get_ticket(
    Path(ticket_id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<TicketResponse>, AppError> {
    let ticket = state.engine.ticket(TicketId::new(ticket_id)).await?;
    Ok(Json(ticket.into()))
}
