//! Cancellation and the RAC promotion cascade.
//!
//! Cancelling a ticket frees its berth. When the cancelled ticket was
//! `confirmed`, the oldest `RAC` ticket is promoted to `confirmed` in the same
//! transaction. The promoted ticket keeps its side-lower berth. Cancelling an
//! `RAC` or `waiting` ticket promotes nobody.

use crate::engine::ReservationEngine;
use crate::metrics;
use berthline_core::store::{LedgerTransaction, LockMode};
use berthline_core::{BerthNumber, BookingError, StoreError, TicketId, TicketStatus};

/// Outcome of a successful cancellation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cancellation {
    /// The cancelled ticket
    pub ticket_id: TicketId,
    /// Status the ticket held when it was cancelled
    pub status: TicketStatus,
    /// Berth released by the cancellation, if the ticket held one
    pub freed_berth: Option<BerthNumber>,
    /// RAC ticket promoted to confirmed as a consequence
    pub promoted: Option<Promotion>,
}

/// An `RAC` ticket moved to `confirmed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Promotion {
    /// The promoted ticket
    pub ticket_id: TicketId,
    /// The berth it keeps, re-asserted as occupied
    pub berth_number: Option<BerthNumber>,
}

impl ReservationEngine {
    /// Cancel a ticket, free its berth and promote the oldest `RAC` ticket if
    /// the cancelled one was `confirmed`.
    ///
    /// # Errors
    ///
    /// - [`BookingError::TicketNotFound`] for an unknown identifier; nothing changes
    /// - [`BookingError::Store`] when the store fails or conflicts persist
    pub async fn cancel(&self, ticket_id: TicketId) -> Result<Cancellation, BookingError> {
        let result = self
            .run("cancel", move || async move {
                let mut tx = self.store.begin().await?;
                let cancellation = cancel_in(tx.as_mut(), ticket_id).await?;
                tx.commit().await?;
                Ok(cancellation)
            })
            .await;

        match &result {
            Ok(cancellation) => {
                tracing::info!(
                    ticket_id = %cancellation.ticket_id,
                    status = %cancellation.status,
                    freed_berth = ?cancellation.freed_berth.map(BerthNumber::get),
                    "Ticket cancelled"
                );
                metrics::record_cancellation(cancellation.status);
                if let Some(promotion) = cancellation.promoted {
                    tracing::info!(
                        ticket_id = %promotion.ticket_id,
                        berth = ?promotion.berth_number.map(BerthNumber::get),
                        "RAC ticket promoted to confirmed"
                    );
                    metrics::record_promotion();
                }
            }
            Err(BookingError::TicketNotFound(id)) => {
                tracing::warn!(ticket_id = %id, "Cancellation of unknown ticket");
            }
            Err(err) => {
                tracing::error!(ticket_id = %ticket_id, error = %err, "Cancellation failed");
            }
        }

        result
    }
}

async fn cancel_in(
    tx: &mut dyn LedgerTransaction,
    ticket_id: TicketId,
) -> Result<Cancellation, BookingError> {
    let ticket = tx
        .find_by_id(ticket_id, LockMode::ForUpdate)
        .await?
        .ok_or(BookingError::TicketNotFound(ticket_id))?;

    let mut freed_berth = None;
    if let Some(berth) = ticket.berth_number {
        if tx.set_occupied(berth, false).await? {
            freed_berth = Some(berth);
        } else {
            tracing::warn!(ticket_id = %ticket_id, berth = %berth, "Ticket references unknown berth");
        }
    }

    let promoted = if ticket.status == TicketStatus::Confirmed {
        promote_oldest_rac(tx).await?
    } else {
        None
    };

    tx.delete_ticket(ticket_id).await?;

    Ok(Cancellation {
        ticket_id,
        status: ticket.status,
        freed_berth,
        promoted,
    })
}

async fn promote_oldest_rac(
    tx: &mut dyn LedgerTransaction,
) -> Result<Option<Promotion>, StoreError> {
    let Some(candidate) = tx.find_by_status(TicketStatus::Rac).await? else {
        return Ok(None);
    };

    tx.update_status(candidate.id, TicketStatus::Confirmed)
        .await?;
    if let Some(berth) = candidate.berth_number {
        tx.set_occupied(berth, true).await?;
    }

    Ok(Some(Promotion {
        ticket_id: candidate.id,
        berth_number: candidate.berth_number,
    }))
}
