//! Error types for stores and the reservation engine.

use crate::types::TicketId;
use thiserror::Error;

/// Errors raised by a [`BerthStore`](crate::store::BerthStore) or one of its
/// transactions.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Another transaction touched the same rows; the whole operation may be
    /// retried from the start.
    #[error("Transaction conflict: {0}")]
    Conflict(String),

    /// Connection, query or commit failure.
    #[error("Database error: {0}")]
    Database(String),

    /// A stored row could not be decoded into a domain value.
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl StoreError {
    /// Whether retrying the enclosing transaction can succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

/// Errors returned by booking, cancellation and lookup.
///
/// The first three variants are client-facing outcomes; none of them is
/// retried by the engine.
#[derive(Error, Debug)]
pub enum BookingError {
    /// The waiting list already holds `capacity` tickets.
    #[error("Waiting list is full ({capacity} tickets)")]
    WaitingListFull {
        /// The waiting-list cap that was hit
        capacity: u64,
    },

    /// No free berth matched the allocation policy.
    #[error("No berths available")]
    NoBerthAvailable,

    /// The referenced ticket does not exist.
    #[error("Ticket {0} not found")]
    TicketNotFound(TicketId),

    /// The underlying store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl BookingError {
    /// Whether retrying the whole operation can succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Store(err) => err.is_retryable(),
            _ => false,
        }
    }

    /// Stable, client-facing error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::WaitingListFull { .. } => "WAITING_LIST_FULL",
            Self::NoBerthAvailable => "NO_BERTHS_AVAILABLE",
            Self::TicketNotFound(_) => "TICKET_NOT_FOUND",
            Self::Store(_) => "STORE_ERROR",
        }
    }
}
