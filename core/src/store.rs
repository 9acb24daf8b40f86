//! Transactional store abstraction for berth inventory and the ticket ledger.
//!
//! The engine never touches storage outside a transaction. Every public
//! operation opens one [`LedgerTransaction`] through [`BerthStore::begin`],
//! performs its reads and writes against it, and commits once. A transaction
//! that is dropped without [`LedgerTransaction::commit`] leaves no trace.
//!
//! # Isolation
//!
//! Implementations must serialize transactions with respect to the rows
//! they read for mutation:
//!
//! - Two transactions must never both observe the same berth as free and
//!   both mark it occupied.
//! - Two transactions must never both observe the same `RAC` ticket as the
//!   promotion candidate.
//!
//! A store may do this by holding a single writer lock for the life of the
//! transaction, or by row locking plus serializable isolation. When it
//! detects a conflict instead of blocking, it reports
//! [`StoreError::Conflict`] and the engine retries the whole operation.
//!
//! # Implementations
//!
//! - `InMemoryBerthStore` (in `berthline-runtime`): single-writer, copy-on-commit
//! - `PostgresBerthStore` (in `berthline-postgres`): `SERIALIZABLE` + `FOR UPDATE`
//!
//! # Dyn Compatibility
//!
//! Both traits return boxed futures instead of using `async fn` so the
//! engine can hold an `Arc<dyn BerthStore>` chosen at process start.

use crate::error::StoreError;
use crate::types::{Berth, BerthNumber, NewTicket, Ticket, TicketId, TicketStatus};
use futures::future::BoxFuture;

/// Whether a read takes row locks.
///
/// Mutating operations read their candidates with [`LockMode::ForUpdate`];
/// plain listings use [`LockMode::Shared`] and never block writers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    /// Snapshot read without row locks
    Shared,
    /// Lock the returned rows until the transaction ends
    ForUpdate,
}

/// A store that can open ledger transactions.
pub trait BerthStore: Send + Sync {
    /// Open a transaction spanning inventory and ledger.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store is unreachable.
    fn begin(&self) -> BoxFuture<'_, Result<Box<dyn LedgerTransaction>, StoreError>>;
}

/// One atomic unit of work over inventory and ledger.
///
/// All methods observe the transaction's own uncommitted writes.
pub trait LedgerTransaction: Send {
    // ------------------------------------------------------------------
    // Inventory
    // ------------------------------------------------------------------

    /// Number of berths in the inventory.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on storage failure.
    fn berth_count(&mut self) -> BoxFuture<'_, Result<u64, StoreError>>;

    /// Insert catalog berths. Only called against an empty inventory.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on storage failure or duplicate berth numbers.
    fn insert_berths(&mut self, berths: Vec<Berth>) -> BoxFuture<'_, Result<(), StoreError>>;

    /// All berths in berth-number order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on storage failure.
    fn berths(&mut self) -> BoxFuture<'_, Result<Vec<Berth>, StoreError>>;

    /// Unoccupied berths in berth-number order.
    ///
    /// With [`LockMode::ForUpdate`] the rows are allocation candidates and
    /// must be locked against concurrent allocation until the transaction
    /// ends.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on storage failure or conflict.
    fn unoccupied_berths(&mut self, lock: LockMode)
    -> BoxFuture<'_, Result<Vec<Berth>, StoreError>>;

    /// Set a berth's occupancy flag.
    ///
    /// Returns `false` (and changes nothing) if no berth has that number.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on storage failure or conflict.
    fn set_occupied(
        &mut self,
        berth_number: BerthNumber,
        occupied: bool,
    ) -> BoxFuture<'_, Result<bool, StoreError>>;

    // ------------------------------------------------------------------
    // Ledger
    // ------------------------------------------------------------------

    /// Exact number of live tickets with `status`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on storage failure.
    fn count_by_status(&mut self, status: TicketStatus) -> BoxFuture<'_, Result<u64, StoreError>>;

    /// Persist a ticket with its manifest and assign a fresh identifier.
    ///
    /// Identifiers are unique and strictly increasing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on storage failure.
    fn create_ticket(&mut self, ticket: NewTicket) -> BoxFuture<'_, Result<Ticket, StoreError>>;

    /// Lowest-identifier ticket with `status`, locked for update.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on storage failure or conflict.
    fn find_by_status(
        &mut self,
        status: TicketStatus,
    ) -> BoxFuture<'_, Result<Option<Ticket>, StoreError>>;

    /// Ticket by identifier, locked for update when `lock` asks for it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on storage failure or conflict.
    fn find_by_id(
        &mut self,
        id: TicketId,
        lock: LockMode,
    ) -> BoxFuture<'_, Result<Option<Ticket>, StoreError>>;

    /// All tickets whose status is in `statuses`, ascending by identifier,
    /// each with its full manifest.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on storage failure.
    fn list_by_statuses<'a>(
        &'a mut self,
        statuses: &'a [TicketStatus],
    ) -> BoxFuture<'a, Result<Vec<Ticket>, StoreError>>;

    /// Change a ticket's status.
    ///
    /// Returns `false` (and changes nothing) if the ticket does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on storage failure or conflict.
    fn update_status(
        &mut self,
        id: TicketId,
        status: TicketStatus,
    ) -> BoxFuture<'_, Result<bool, StoreError>>;

    /// Remove a ticket and its manifest. No-op for an unknown identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on storage failure.
    fn delete_ticket(&mut self, id: TicketId) -> BoxFuture<'_, Result<(), StoreError>>;

    // ------------------------------------------------------------------
    // Completion
    // ------------------------------------------------------------------

    /// Make every write in this transaction visible atomically.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] if the store detected a conflicting
    /// transaction at commit time, or [`StoreError::Database`] otherwise.
    fn commit(self: Box<Self>) -> BoxFuture<'static, Result<(), StoreError>>;
}
