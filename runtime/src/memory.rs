//! In-memory [`BerthStore`] for development, tests and single-process deployments.
//!
//! A transaction takes the store's writer lock for its whole lifetime and
//! works on a private copy of the ledger. Commit swaps the copy in; dropping
//! the transaction discards it. Transactions therefore run one at a time in
//! lock-acquisition order and never conflict.

use berthline_core::store::{BerthStore, LedgerTransaction, LockMode};
use berthline_core::{
    Berth, BerthNumber, NewTicket, StoreError, Ticket, TicketId, TicketStatus,
};
use futures::future::{self, BoxFuture, FutureExt};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Clone, Default)]
struct LedgerState {
    berths: BTreeMap<BerthNumber, Berth>,
    tickets: BTreeMap<TicketId, Ticket>,
    last_ticket_id: i64,
}

/// Berth inventory and ticket ledger held in process memory.
///
/// Cloning yields another handle to the same ledger.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBerthStore {
    state: Arc<Mutex<LedgerState>>,
}

impl InMemoryBerthStore {
    /// Create an empty store. Call `ReservationEngine::initialize` to seed it.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl BerthStore for InMemoryBerthStore {
    fn begin(&self) -> BoxFuture<'_, Result<Box<dyn LedgerTransaction>, StoreError>> {
        async move {
            let guard = Arc::clone(&self.state).lock_owned().await;
            let working = (*guard).clone();
            Ok(Box::new(InMemoryTransaction { guard, working }) as Box<dyn LedgerTransaction>)
        }
        .boxed()
    }
}

struct InMemoryTransaction {
    guard: OwnedMutexGuard<LedgerState>,
    working: LedgerState,
}

fn ready<'a, T: Send + 'a>(value: T) -> BoxFuture<'a, Result<T, StoreError>> {
    future::ready(Ok(value)).boxed()
}

impl LedgerTransaction for InMemoryTransaction {
    fn berth_count(&mut self) -> BoxFuture<'_, Result<u64, StoreError>> {
        ready(self.working.berths.len() as u64)
    }

    fn insert_berths(&mut self, berths: Vec<Berth>) -> BoxFuture<'_, Result<(), StoreError>> {
        if let Some(dup) = berths
            .iter()
            .find(|b| self.working.berths.contains_key(&b.berth_number))
        {
            let err = StoreError::Database(format!("berth {} already exists", dup.berth_number));
            return future::ready(Err(err)).boxed();
        }
        for berth in berths {
            self.working.berths.insert(berth.berth_number, berth);
        }
        ready(())
    }

    fn berths(&mut self) -> BoxFuture<'_, Result<Vec<Berth>, StoreError>> {
        ready(self.working.berths.values().cloned().collect())
    }

    fn unoccupied_berths(&mut self, _: LockMode) -> BoxFuture<'_, Result<Vec<Berth>, StoreError>> {
        ready(
            self.working
                .berths
                .values()
                .filter(|b| !b.is_occupied)
                .cloned()
                .collect(),
        )
    }

    fn set_occupied(
        &mut self,
        berth_number: BerthNumber,
        occupied: bool,
    ) -> BoxFuture<'_, Result<bool, StoreError>> {
        let found = self
            .working
            .berths
            .get_mut(&berth_number)
            .map(|berth| berth.is_occupied = occupied)
            .is_some();
        ready(found)
    }

    fn count_by_status(&mut self, status: TicketStatus) -> BoxFuture<'_, Result<u64, StoreError>> {
        let count = self
            .working
            .tickets
            .values()
            .filter(|t| t.status == status)
            .count();
        ready(count as u64)
    }

    fn create_ticket(&mut self, ticket: NewTicket) -> BoxFuture<'_, Result<Ticket, StoreError>> {
        self.working.last_ticket_id += 1;
        let ticket = ticket.into_ticket(TicketId::new(self.working.last_ticket_id));
        self.working.tickets.insert(ticket.id, ticket.clone());
        ready(ticket)
    }

    fn find_by_status(
        &mut self,
        status: TicketStatus,
    ) -> BoxFuture<'_, Result<Option<Ticket>, StoreError>> {
        ready(
            self.working
                .tickets
                .values()
                .find(|t| t.status == status)
                .cloned(),
        )
    }

    fn find_by_id(
        &mut self,
        id: TicketId,
        _: LockMode,
    ) -> BoxFuture<'_, Result<Option<Ticket>, StoreError>> {
        ready(self.working.tickets.get(&id).cloned())
    }

    fn list_by_statuses<'a>(
        &'a mut self,
        statuses: &'a [TicketStatus],
    ) -> BoxFuture<'a, Result<Vec<Ticket>, StoreError>> {
        ready(
            self.working
                .tickets
                .values()
                .filter(|t| statuses.contains(&t.status))
                .cloned()
                .collect(),
        )
    }

    fn update_status(
        &mut self,
        id: TicketId,
        status: TicketStatus,
    ) -> BoxFuture<'_, Result<bool, StoreError>> {
        let found = self
            .working
            .tickets
            .get_mut(&id)
            .map(|ticket| ticket.status = status)
            .is_some();
        ready(found)
    }

    fn delete_ticket(&mut self, id: TicketId) -> BoxFuture<'_, Result<(), StoreError>> {
        self.working.tickets.remove(&id);
        ready(())
    }

    fn commit(self: Box<Self>) -> BoxFuture<'static, Result<(), StoreError>> {
        let Self { mut guard, working } = *self;
        *guard = working;
        ready(())
    }
}
