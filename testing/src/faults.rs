//! Fault injection for store-level tests.
//!
//! [`FaultyStore`] wraps any [`BerthStore`] and fails a chosen operation a
//! chosen number of times. Every other call is forwarded unchanged, so tests
//! can assert that a failure part-way through a transaction leaves the
//! wrapped store exactly as it was, or that conflicts are retried.
//!
//! ```
//! use berthline_testing::faults::{FailPoint, Fault, FaultyStore};
//!
//! let store = FaultyStore::new(std::sync::Arc::new(berthline_testing::faults::NullStore));
//! store.arm(FailPoint::Commit, Fault::Conflict, 2);
//! assert_eq!(store.hits(FailPoint::Commit), 0);
//! ```

use berthline_core::store::{BerthStore, LedgerTransaction, LockMode};
use berthline_core::{Berth, BerthNumber, NewTicket, StoreError, Ticket, TicketId, TicketStatus};
use futures::future::{self, BoxFuture, FutureExt};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Store operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    /// [`BerthStore::begin`]
    Begin,
    /// [`LedgerTransaction::count_by_status`]
    CountByStatus,
    /// [`LedgerTransaction::unoccupied_berths`]
    UnoccupiedBerths,
    /// [`LedgerTransaction::create_ticket`]
    CreateTicket,
    /// [`LedgerTransaction::set_occupied`]
    SetOccupied,
    /// [`LedgerTransaction::find_by_id`]
    FindById,
    /// [`LedgerTransaction::find_by_status`]
    FindByStatus,
    /// [`LedgerTransaction::update_status`]
    UpdateStatus,
    /// [`LedgerTransaction::delete_ticket`]
    DeleteTicket,
    /// [`LedgerTransaction::commit`]
    Commit,
}

/// The error an armed fail point produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// [`StoreError::Conflict`]: retried by the engine
    Conflict,
    /// [`StoreError::Database`]: surfaced to the caller
    Database,
}

impl Fault {
    fn to_error(self, point: FailPoint) -> StoreError {
        match self {
            Self::Conflict => StoreError::Conflict(format!("injected conflict at {point:?}")),
            Self::Database => StoreError::Database(format!("injected failure at {point:?}")),
        }
    }
}

#[derive(Debug, Default)]
struct FaultPlan {
    armed: HashMap<FailPoint, (Fault, usize)>,
    hits: HashMap<FailPoint, usize>,
}

/// A [`BerthStore`] decorator that fails armed operations.
#[derive(Clone)]
pub struct FaultyStore {
    inner: Arc<dyn BerthStore>,
    plan: Arc<Mutex<FaultPlan>>,
}

impl FaultyStore {
    /// Wrap `inner` with no fail points armed.
    #[must_use]
    pub fn new(inner: Arc<dyn BerthStore>) -> Self {
        Self {
            inner,
            plan: Arc::new(Mutex::new(FaultPlan::default())),
        }
    }

    /// Make the next `times` calls to `point` fail with `fault`.
    pub fn arm(&self, point: FailPoint, fault: Fault, times: usize) {
        self.lock().armed.insert(point, (fault, times));
    }

    /// Disarm every fail point.
    pub fn disarm(&self) {
        self.lock().armed.clear();
    }

    /// How many times `point` has been reached, failed or not.
    #[must_use]
    pub fn hits(&self, point: FailPoint) -> usize {
        self.lock().hits.get(&point).copied().unwrap_or(0)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FaultPlan> {
        self.plan.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn trip(plan: &Mutex<FaultPlan>, point: FailPoint) -> Option<StoreError> {
    let mut plan = plan.lock().unwrap_or_else(PoisonError::into_inner);
    *plan.hits.entry(point).or_insert(0) += 1;
    let (fault, remaining) = plan.armed.get_mut(&point)?;
    if *remaining == 0 {
        return None;
    }
    *remaining -= 1;
    Some(fault.to_error(point))
}

fn failed<'a, T: Send + 'a>(err: StoreError) -> BoxFuture<'a, Result<T, StoreError>> {
    future::ready(Err(err)).boxed()
}

impl BerthStore for FaultyStore {
    fn begin(&self) -> BoxFuture<'_, Result<Box<dyn LedgerTransaction>, StoreError>> {
        async move {
            if let Some(err) = trip(&self.plan, FailPoint::Begin) {
                return Err(err);
            }
            let inner = self.inner.begin().await?;
            Ok(Box::new(FaultyTransaction {
                inner,
                plan: Arc::clone(&self.plan),
            }) as Box<dyn LedgerTransaction>)
        }
        .boxed()
    }
}

struct FaultyTransaction {
    inner: Box<dyn LedgerTransaction>,
    plan: Arc<Mutex<FaultPlan>>,
}

impl LedgerTransaction for FaultyTransaction {
    fn berth_count(&mut self) -> BoxFuture<'_, Result<u64, StoreError>> {
        self.inner.berth_count()
    }

    fn insert_berths(&mut self, berths: Vec<Berth>) -> BoxFuture<'_, Result<(), StoreError>> {
        self.inner.insert_berths(berths)
    }

    fn berths(&mut self) -> BoxFuture<'_, Result<Vec<Berth>, StoreError>> {
        self.inner.berths()
    }

    fn unoccupied_berths(&mut self, lock: LockMode) -> BoxFuture<'_, Result<Vec<Berth>, StoreError>> {
        match trip(&self.plan, FailPoint::UnoccupiedBerths) {
            Some(err) => failed(err),
            None => self.inner.unoccupied_berths(lock),
        }
    }

    fn set_occupied(
        &mut self,
        berth_number: BerthNumber,
        occupied: bool,
    ) -> BoxFuture<'_, Result<bool, StoreError>> {
        match trip(&self.plan, FailPoint::SetOccupied) {
            Some(err) => failed(err),
            None => self.inner.set_occupied(berth_number, occupied),
        }
    }

    fn count_by_status(&mut self, status: TicketStatus) -> BoxFuture<'_, Result<u64, StoreError>> {
        match trip(&self.plan, FailPoint::CountByStatus) {
            Some(err) => failed(err),
            None => self.inner.count_by_status(status),
        }
    }

    fn create_ticket(&mut self, ticket: NewTicket) -> BoxFuture<'_, Result<Ticket, StoreError>> {
        match trip(&self.plan, FailPoint::CreateTicket) {
            Some(err) => failed(err),
            None => self.inner.create_ticket(ticket),
        }
    }

    fn find_by_status(
        &mut self,
        status: TicketStatus,
    ) -> BoxFuture<'_, Result<Option<Ticket>, StoreError>> {
        match trip(&self.plan, FailPoint::FindByStatus) {
            Some(err) => failed(err),
            None => self.inner.find_by_status(status),
        }
    }

    fn find_by_id(
        &mut self,
        id: TicketId,
        lock: LockMode,
    ) -> BoxFuture<'_, Result<Option<Ticket>, StoreError>> {
        match trip(&self.plan, FailPoint::FindById) {
            Some(err) => failed(err),
            None => self.inner.find_by_id(id, lock),
        }
    }

    fn list_by_statuses<'a>(
        &'a mut self,
        statuses: &'a [TicketStatus],
    ) -> BoxFuture<'a, Result<Vec<Ticket>, StoreError>> {
        self.inner.list_by_statuses(statuses)
    }

    fn update_status(
        &mut self,
        id: TicketId,
        status: TicketStatus,
    ) -> BoxFuture<'_, Result<bool, StoreError>> {
        match trip(&self.plan, FailPoint::UpdateStatus) {
            Some(err) => failed(err),
            None => self.inner.update_status(id, status),
        }
    }

    fn delete_ticket(&mut self, id: TicketId) -> BoxFuture<'_, Result<(), StoreError>> {
        match trip(&self.plan, FailPoint::DeleteTicket) {
            Some(err) => failed(err),
            None => self.inner.delete_ticket(id),
        }
    }

    fn commit(self: Box<Self>) -> BoxFuture<'static, Result<(), StoreError>> {
        let Self { inner, plan } = *self;
        match trip(&plan, FailPoint::Commit) {
            Some(err) => {
                drop(inner);
                failed(err)
            }
            None => inner.commit(),
        }
    }
}

/// A store whose transactions hold nothing; useful for exercising the
/// decorator itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStore;

impl BerthStore for NullStore {
    fn begin(&self) -> BoxFuture<'_, Result<Box<dyn LedgerTransaction>, StoreError>> {
        future::ready(Ok(Box::new(NullTransaction) as Box<dyn LedgerTransaction>)).boxed()
    }
}

struct NullTransaction;

fn ok<'a, T: Send + 'a>(value: T) -> BoxFuture<'a, Result<T, StoreError>> {
    future::ready(Ok(value)).boxed()
}

impl LedgerTransaction for NullTransaction {
    fn berth_count(&mut self) -> BoxFuture<'_, Result<u64, StoreError>> {
        ok(0)
    }

    fn insert_berths(&mut self, _berths: Vec<Berth>) -> BoxFuture<'_, Result<(), StoreError>> {
        ok(())
    }

    fn berths(&mut self) -> BoxFuture<'_, Result<Vec<Berth>, StoreError>> {
        ok(Vec::new())
    }

    fn unoccupied_berths(&mut self, _: LockMode) -> BoxFuture<'_, Result<Vec<Berth>, StoreError>> {
        ok(Vec::new())
    }

    fn set_occupied(&mut self, _: BerthNumber, _: bool) -> BoxFuture<'_, Result<bool, StoreError>> {
        ok(false)
    }

    fn count_by_status(&mut self, _: TicketStatus) -> BoxFuture<'_, Result<u64, StoreError>> {
        ok(0)
    }

    fn create_ticket(&mut self, ticket: NewTicket) -> BoxFuture<'_, Result<Ticket, StoreError>> {
        ok(ticket.into_ticket(TicketId::new(1)))
    }

    fn find_by_status(&mut self, _: TicketStatus) -> BoxFuture<'_, Result<Option<Ticket>, StoreError>> {
        ok(None)
    }

    fn find_by_id(
        &mut self,
        _: TicketId,
        _: LockMode,
    ) -> BoxFuture<'_, Result<Option<Ticket>, StoreError>> {
        ok(None)
    }

    fn list_by_statuses<'a>(
        &'a mut self,
        _: &'a [TicketStatus],
    ) -> BoxFuture<'a, Result<Vec<Ticket>, StoreError>> {
        ok(Vec::new())
    }

    fn update_status(&mut self, _: TicketId, _: TicketStatus) -> BoxFuture<'_, Result<bool, StoreError>> {
        ok(false)
    }

    fn delete_ticket(&mut self, _: TicketId) -> BoxFuture<'_, Result<(), StoreError>> {
        ok(())
    }

    fn commit(self: Box<Self>) -> BoxFuture<'static, Result<(), StoreError>> {
        ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_armed_point_fails_requested_times_then_recovers() {
        let store = FaultyStore::new(Arc::new(NullStore));
        store.arm(FailPoint::Commit, Fault::Conflict, 1);

        let tx = store.begin().await.unwrap();
        assert!(matches!(tx.commit().await, Err(StoreError::Conflict(_))));

        let tx = store.begin().await.unwrap();
        assert!(tx.commit().await.is_ok());
        assert_eq!(store.hits(FailPoint::Commit), 2);
    }

    #[tokio::test]
    async fn test_disarm_clears_faults() {
        let store = FaultyStore::new(Arc::new(NullStore));
        store.arm(FailPoint::Begin, Fault::Database, 5);
        assert!(matches!(store.begin().await, Err(StoreError::Database(_))));

        store.disarm();
        assert!(store.begin().await.is_ok());
        assert_eq!(store.hits(FailPoint::Begin), 2);
    }
}
