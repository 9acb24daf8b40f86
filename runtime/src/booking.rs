//! Booking: waiting-list gate, eligibility, allocation and ticket creation
//! in one transaction.

use crate::engine::ReservationEngine;
use crate::metrics;
use berthline_core::allocation::allocate;
use berthline_core::eligibility::is_priority;
use berthline_core::store::{LedgerTransaction, LockMode};
use berthline_core::{
    BookingError, DateTime, NewTicket, Passenger, Ticket, TicketStatus, Utc,
    WAITING_LIST_CAPACITY,
};

/// A ticket issued by [`ReservationEngine::book`] plus the inventory left behind.
struct Issued {
    ticket: Ticket,
    berths_left: usize,
}

impl ReservationEngine {
    /// Book a berth for a passenger manifest.
    ///
    /// Priority manifests (a senior, or a female travelling with an infant)
    /// receive the lowest free lower berth when one exists; everyone else the
    /// lowest free berth of any type. A side-lower berth yields an `RAC`
    /// ticket, any other berth a `confirmed` one.
    ///
    /// # Errors
    ///
    /// - [`BookingError::WaitingListFull`] when the waiting list is at capacity
    /// - [`BookingError::NoBerthAvailable`] when every berth is occupied
    /// - [`BookingError::Store`] when the store fails or conflicts persist
    ///
    /// On error nothing is persisted.
    pub async fn book(&self, passengers: Vec<Passenger>) -> Result<Ticket, BookingError> {
        let passengers = passengers.as_slice();
        let result = self
            .run("book", move || self.book_once(passengers))
            .await;

        match result {
            Ok(Issued {
                ticket,
                berths_left,
            }) => {
                tracing::info!(
                    ticket_id = %ticket.id,
                    status = %ticket.status,
                    berth = ?ticket.berth_number.map(|b| b.get()),
                    passengers = ticket.passengers.len(),
                    "Ticket booked"
                );
                metrics::record_booking(ticket.status);
                metrics::set_berths_available(berths_left);
                Ok(ticket)
            }
            Err(err) => {
                match &err {
                    BookingError::Store(store_err) => {
                        tracing::error!(error = %store_err, "Booking failed");
                    }
                    rejection => {
                        tracing::warn!(reason = rejection.code(), "Booking rejected");
                    }
                }
                metrics::record_rejection(err.code());
                Err(err)
            }
        }
    }

    async fn book_once(&self, passengers: &[Passenger]) -> Result<Issued, BookingError> {
        let mut tx = self.store.begin().await?;
        let issued = book_in(tx.as_mut(), passengers, self.clock.now()).await?;
        tx.commit().await?;
        Ok(issued)
    }
}

async fn book_in(
    tx: &mut dyn LedgerTransaction,
    passengers: &[Passenger],
    now: DateTime<Utc>,
) -> Result<Issued, BookingError> {
    let waiting = tx.count_by_status(TicketStatus::Waiting).await?;
    if waiting >= WAITING_LIST_CAPACITY {
        return Err(BookingError::WaitingListFull {
            capacity: WAITING_LIST_CAPACITY,
        });
    }

    let priority = is_priority(passengers);
    let free = tx.unoccupied_berths(LockMode::ForUpdate).await?;
    let allocation = allocate(&free, priority).ok_or(BookingError::NoBerthAvailable)?;

    tracing::debug!(
        priority,
        berth = %allocation.berth.berth_number,
        berth_type = %allocation.berth.berth_type,
        "Allocated berth"
    );

    let ticket = tx
        .create_ticket(NewTicket {
            status: allocation.status,
            berth_number: Some(allocation.berth.berth_number),
            created_at: now,
            passengers: passengers.to_vec(),
        })
        .await?;
    tx.set_occupied(allocation.berth.berth_number, true).await?;

    Ok(Issued {
        ticket,
        berths_left: free.len().saturating_sub(1),
    })
}
