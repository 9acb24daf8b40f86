//! # Berthline Core
//!
//! Domain types and pure policy for allocating sleeping berths on a train.
//!
//! This crate owns everything that does not perform I/O:
//!
//! - **Types**: [`Berth`], [`Ticket`], [`Passenger`] and their identifiers
//! - **Catalog**: the fixed 27-berth layout seeded into an empty store
//! - **Eligibility**: whether a manifest qualifies for a lower berth
//! - **Allocation**: which free berth a booking receives and the status it implies
//! - **Store traits**: the transactional inventory + ledger contract that
//!   the in-memory and `PostgreSQL` stores implement
//!
//! ## Booking at a glance
//!
//! ```
//! use berthline_core::{allocation, catalog, eligibility};
//! use berthline_core::types::{BerthType, Gender, Passenger, TicketStatus};
//!
//! let berths = catalog::standard_catalog();
//! let manifest = vec![Passenger::new("Asha", 67, Gender::Female)];
//!
//! let priority = eligibility::is_priority(&manifest);
//! let allocation = allocation::allocate(&berths, priority).unwrap();
//!
//! assert_eq!(allocation.berth.berth_type, BerthType::Lower);
//! assert_eq!(allocation.status, TicketStatus::Confirmed);
//! ```

pub mod allocation;
pub mod catalog;
pub mod eligibility;
pub mod environment;
pub mod error;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use error::{BookingError, StoreError};
pub use store::{BerthStore, LedgerTransaction, LockMode};
pub use types::{
    Berth, BerthNumber, BerthType, Gender, NewTicket, Passenger, Ticket, TicketId, TicketStatus,
};

/// Maximum number of live tickets allowed in `waiting` status.
///
/// Booking is rejected once the waiting list holds this many tickets.
pub const WAITING_LIST_CAPACITY: u64 = 10;
