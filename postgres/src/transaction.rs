//! [`LedgerTransaction`] over one `SERIALIZABLE` sqlx transaction.

use crate::map_db_error;
use crate::rows::{
    BerthRow, PassengerRow, TicketRow, assemble_tickets, berth_from_row, berth_number_to_db,
};
use berthline_core::store::{LedgerTransaction, LockMode};
use berthline_core::{Berth, BerthNumber, NewTicket, StoreError, Ticket, TicketId, TicketStatus};
use futures::future::{BoxFuture, FutureExt};
use sqlx::{Postgres, Transaction};

const TICKET_COLUMNS: &str = "id, status, berth_number, created_at";

pub(crate) struct PgLedgerTransaction {
    tx: Transaction<'static, Postgres>,
}

impl PgLedgerTransaction {
    pub(crate) const fn new(tx: Transaction<'static, Postgres>) -> Self {
        Self { tx }
    }

    async fn load_manifests(&mut self, tickets: Vec<TicketRow>) -> Result<Vec<Ticket>, StoreError> {
        if tickets.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i64> = tickets.iter().map(|row| row.0).collect();
        let passengers: Vec<PassengerRow> = sqlx::query_as(
            "SELECT ticket_id, name, age, gender FROM passengers
             WHERE ticket_id = ANY($1)
             ORDER BY ticket_id, position",
        )
        .bind(&ids)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| map_db_error("load passengers", e))?;

        assemble_tickets(tickets, passengers)
    }

    async fn single(&mut self, row: Option<TicketRow>) -> Result<Option<Ticket>, StoreError> {
        match row {
            Some(row) => Ok(self.load_manifests(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }
}

const fn lock_clause(lock: LockMode) -> &'static str {
    match lock {
        LockMode::Shared => "",
        LockMode::ForUpdate => " FOR UPDATE",
    }
}

fn count_to_u64(count: i64) -> Result<u64, StoreError> {
    u64::try_from(count).map_err(|e| StoreError::Corrupt(format!("count: {e}")))
}

impl LedgerTransaction for PgLedgerTransaction {
    fn berth_count(&mut self) -> BoxFuture<'_, Result<u64, StoreError>> {
        async move {
            let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM berths")
                .fetch_one(&mut *self.tx)
                .await
                .map_err(|e| map_db_error("count berths", e))?;
            count_to_u64(count)
        }
        .boxed()
    }

    fn insert_berths(&mut self, berths: Vec<Berth>) -> BoxFuture<'_, Result<(), StoreError>> {
        async move {
            for berth in berths {
                sqlx::query(
                    "INSERT INTO berths (berth_number, berth_type, is_occupied) VALUES ($1, $2, $3)",
                )
                .bind(berth_number_to_db(berth.berth_number)?)
                .bind(berth.berth_type.as_str())
                .bind(berth.is_occupied)
                .execute(&mut *self.tx)
                .await
                .map_err(|e| map_db_error("insert berth", e))?;
            }
            Ok(())
        }
        .boxed()
    }

    fn berths(&mut self) -> BoxFuture<'_, Result<Vec<Berth>, StoreError>> {
        async move {
            let rows: Vec<BerthRow> = sqlx::query_as(
                "SELECT berth_number, berth_type, is_occupied FROM berths ORDER BY berth_number",
            )
            .fetch_all(&mut *self.tx)
            .await
            .map_err(|e| map_db_error("load berths", e))?;
            rows.into_iter().map(berth_from_row).collect()
        }
        .boxed()
    }

    fn unoccupied_berths(&mut self, lock: LockMode) -> BoxFuture<'_, Result<Vec<Berth>, StoreError>> {
        async move {
            let rows: Vec<BerthRow> = sqlx::query_as(&format!(
                "SELECT berth_number, berth_type, is_occupied FROM berths
                 WHERE NOT is_occupied
                 ORDER BY berth_number{}",
                lock_clause(lock)
            ))
            .fetch_all(&mut *self.tx)
            .await
            .map_err(|e| map_db_error("load free berths", e))?;
            rows.into_iter().map(berth_from_row).collect()
        }
        .boxed()
    }

    fn set_occupied(
        &mut self,
        berth_number: BerthNumber,
        occupied: bool,
    ) -> BoxFuture<'_, Result<bool, StoreError>> {
        async move {
            let result = sqlx::query("UPDATE berths SET is_occupied = $2 WHERE berth_number = $1")
                .bind(berth_number_to_db(berth_number)?)
                .bind(occupied)
                .execute(&mut *self.tx)
                .await
                .map_err(|e| map_db_error("update berth", e))?;
            Ok(result.rows_affected() > 0)
        }
        .boxed()
    }

    fn count_by_status(&mut self, status: TicketStatus) -> BoxFuture<'_, Result<u64, StoreError>> {
        async move {
            let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tickets WHERE status = $1")
                .bind(status.as_str())
                .fetch_one(&mut *self.tx)
                .await
                .map_err(|e| map_db_error("count tickets", e))?;
            count_to_u64(count)
        }
        .boxed()
    }

    fn create_ticket(&mut self, ticket: NewTicket) -> BoxFuture<'_, Result<Ticket, StoreError>> {
        async move {
            let berth_number = ticket.berth_number.map(berth_number_to_db).transpose()?;
            let (id,): (i64,) = sqlx::query_as(
                "INSERT INTO tickets (status, berth_number, created_at)
                 VALUES ($1, $2, $3)
                 RETURNING id",
            )
            .bind(ticket.status.as_str())
            .bind(berth_number)
            .bind(ticket.created_at)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|e| map_db_error("insert ticket", e))?;

            for (position, passenger) in ticket.passengers.iter().enumerate() {
                let position = i32::try_from(position)
                    .map_err(|e| StoreError::Database(format!("manifest too large: {e}")))?;
                let age = i32::try_from(passenger.age)
                    .map_err(|e| StoreError::Database(format!("age out of range: {e}")))?;
                sqlx::query(
                    "INSERT INTO passengers (ticket_id, position, name, age, gender)
                     VALUES ($1, $2, $3, $4, $5)",
                )
                .bind(id)
                .bind(position)
                .bind(&passenger.name)
                .bind(age)
                .bind(passenger.gender.as_str())
                .execute(&mut *self.tx)
                .await
                .map_err(|e| map_db_error("insert passenger", e))?;
            }

            tracing::debug!(ticket_id = id, status = %ticket.status, "Inserted ticket");
            Ok(ticket.into_ticket(TicketId::new(id)))
        }
        .boxed()
    }

    fn find_by_status(
        &mut self,
        status: TicketStatus,
    ) -> BoxFuture<'_, Result<Option<Ticket>, StoreError>> {
        async move {
            let row: Option<TicketRow> = sqlx::query_as(&format!(
                "SELECT {TICKET_COLUMNS} FROM tickets
                 WHERE status = $1
                 ORDER BY id
                 LIMIT 1
                 FOR UPDATE"
            ))
            .bind(status.as_str())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| map_db_error("find ticket by status", e))?;
            self.single(row).await
        }
        .boxed()
    }

    fn find_by_id(
        &mut self,
        id: TicketId,
        lock: LockMode,
    ) -> BoxFuture<'_, Result<Option<Ticket>, StoreError>> {
        async move {
            let row: Option<TicketRow> = sqlx::query_as(&format!(
                "SELECT {TICKET_COLUMNS} FROM tickets WHERE id = $1{}",
                lock_clause(lock)
            ))
            .bind(id.get())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| map_db_error("find ticket", e))?;
            self.single(row).await
        }
        .boxed()
    }

    fn list_by_statuses<'a>(
        &'a mut self,
        statuses: &'a [TicketStatus],
    ) -> BoxFuture<'a, Result<Vec<Ticket>, StoreError>> {
        async move {
            let names: Vec<&str> = statuses.iter().map(|s| s.as_str()).collect();
            let rows: Vec<TicketRow> = sqlx::query_as(&format!(
                "SELECT {TICKET_COLUMNS} FROM tickets WHERE status = ANY($1) ORDER BY id"
            ))
            .bind(&names)
            .fetch_all(&mut *self.tx)
            .await
            .map_err(|e| map_db_error("list tickets", e))?;
            self.load_manifests(rows).await
        }
        .boxed()
    }

    fn update_status(
        &mut self,
        id: TicketId,
        status: TicketStatus,
    ) -> BoxFuture<'_, Result<bool, StoreError>> {
        async move {
            let result = sqlx::query("UPDATE tickets SET status = $2 WHERE id = $1")
                .bind(id.get())
                .bind(status.as_str())
                .execute(&mut *self.tx)
                .await
                .map_err(|e| map_db_error("update ticket status", e))?;
            Ok(result.rows_affected() > 0)
        }
        .boxed()
    }

    fn delete_ticket(&mut self, id: TicketId) -> BoxFuture<'_, Result<(), StoreError>> {
        async move {
            sqlx::query("DELETE FROM tickets WHERE id = $1")
                .bind(id.get())
                .execute(&mut *self.tx)
                .await
                .map_err(|e| map_db_error("delete ticket", e))?;
            Ok(())
        }
        .boxed()
    }

    fn commit(self: Box<Self>) -> BoxFuture<'static, Result<(), StoreError>> {
        async move {
            self.tx
                .commit()
                .await
                .map_err(|e| map_db_error("commit", e))
        }
        .boxed()
    }
}
