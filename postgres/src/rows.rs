//! Row decoding between SQL columns and domain types.

use berthline_core::{
    Berth, BerthNumber, DateTime, Gender, Passenger, StoreError, Ticket, TicketId, TicketStatus,
    Utc,
};
use std::collections::BTreeMap;

/// `(berth_number, berth_type, is_occupied)`
pub(crate) type BerthRow = (i32, String, bool);

/// `(id, status, berth_number, created_at)`
pub(crate) type TicketRow = (i64, String, Option<i32>, DateTime<Utc>);

/// `(ticket_id, name, age, gender)`, ordered by `(ticket_id, position)`
pub(crate) type PassengerRow = (i64, String, i32, String);

fn corrupt(what: &str, err: impl std::fmt::Display) -> StoreError {
    StoreError::Corrupt(format!("{what}: {err}"))
}

pub(crate) fn berth_number_from_db(value: i32) -> Result<BerthNumber, StoreError> {
    u32::try_from(value)
        .map(BerthNumber::new)
        .map_err(|e| corrupt("berth_number", e))
}

pub(crate) fn berth_number_to_db(number: BerthNumber) -> Result<i32, StoreError> {
    i32::try_from(number.get()).map_err(|e| corrupt("berth_number", e))
}

pub(crate) fn berth_from_row((number, kind, is_occupied): BerthRow) -> Result<Berth, StoreError> {
    Ok(Berth {
        berth_number: berth_number_from_db(number)?,
        berth_type: kind.parse().map_err(|e| corrupt("berth_type", e))?,
        is_occupied,
    })
}

fn passenger_from_row((_, name, age, gender): PassengerRow) -> Result<Passenger, StoreError> {
    let age = u32::try_from(age).map_err(|e| corrupt("age", e))?;
    Ok(Passenger::new(name, age, Gender::from(gender.as_str())))
}

/// Join ticket rows with their manifests, preserving ticket order.
pub(crate) fn assemble_tickets(
    tickets: Vec<TicketRow>,
    passengers: Vec<PassengerRow>,
) -> Result<Vec<Ticket>, StoreError> {
    let mut manifests: BTreeMap<i64, Vec<Passenger>> = BTreeMap::new();
    for row in passengers {
        let ticket_id = row.0;
        manifests
            .entry(ticket_id)
            .or_default()
            .push(passenger_from_row(row)?);
    }

    tickets
        .into_iter()
        .map(|(id, status, berth_number, created_at)| {
            Ok(Ticket {
                id: TicketId::new(id),
                status: status
                    .parse::<TicketStatus>()
                    .map_err(|e| corrupt("status", e))?,
                berth_number: berth_number.map(berth_number_from_db).transpose()?,
                created_at,
                passengers: manifests.remove(&id).unwrap_or_default(),
            })
        })
        .collect()
}
