//! Berth allocation policy.
//!
//! Priority bookings take the lowest-numbered free lower berth when one
//! exists. Everything else, including priority bookings once lower berths
//! run out, takes the lowest-numbered free berth of any type.
//!
//! The resulting ticket status depends only on the berth type: side-lower
//! berths are shared between two passengers and always yield `RAC`.

use crate::types::{Berth, BerthType, TicketStatus};

/// A chosen berth and the ticket status it implies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Allocation {
    /// The berth to occupy
    pub berth: Berth,
    /// Status of the ticket that will hold it
    pub status: TicketStatus,
}

/// Ticket status implied by a berth type.
#[must_use]
pub const fn status_for(berth_type: BerthType) -> TicketStatus {
    match berth_type {
        BerthType::SideLower => TicketStatus::Rac,
        BerthType::Lower | BerthType::Upper => TicketStatus::Confirmed,
    }
}

/// Pick a berth from `berths`.
///
/// Occupied entries are ignored and input order does not matter; ties are
/// broken by berth number. Returns `None` when nothing is free.
#[must_use]
pub fn select_berth(berths: &[Berth], priority: bool) -> Option<&Berth> {
    let free = berths.iter().filter(|b| !b.is_occupied);

    if priority {
        let lower = free
            .clone()
            .filter(|b| b.berth_type == BerthType::Lower)
            .min_by_key(|b| b.berth_number);
        if lower.is_some() {
            return lower;
        }
    }

    free.min_by_key(|b| b.berth_number)
}

/// Pick a berth and derive the ticket status.
///
/// The returned berth is a copy of the inventory entry, still marked
/// unoccupied; the caller marks it occupied in the same transaction.
#[must_use]
pub fn allocate(berths: &[Berth], priority: bool) -> Option<Allocation> {
    select_berth(berths, priority).map(|berth| Allocation {
        berth: berth.clone(),
        status: status_for(berth.berth_type),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::standard_catalog;
    use crate::types::BerthNumber;

    fn occupy(berths: &mut [Berth], numbers: impl IntoIterator<Item = u32>) {
        for n in numbers {
            if let Some(b) = berths.iter_mut().find(|b| b.berth_number.get() == n) {
                b.is_occupied = true;
            }
        }
    }

    #[test]
    fn test_non_priority_takes_lowest_number() {
        let berths = standard_catalog();
        let allocation = allocate(&berths, false).unwrap();
        assert_eq!(allocation.berth.berth_number, BerthNumber::new(1));
        assert_eq!(allocation.status, TicketStatus::Confirmed);
    }

    #[test]
    fn test_non_priority_spills_into_side_lower_as_rac() {
        let mut berths = standard_catalog();
        occupy(&mut berths, 1..=9);
        let allocation = allocate(&berths, false).unwrap();
        assert_eq!(allocation.berth.berth_number, BerthNumber::new(10));
        assert_eq!(allocation.berth.berth_type, BerthType::SideLower);
        assert_eq!(allocation.status, TicketStatus::Rac);
    }

    #[test]
    fn test_priority_prefers_free_lower_over_lower_numbered_berth() {
        let mut berths = standard_catalog();
        // Free: 9 (lower) and everything from 10 up.
        occupy(&mut berths, 1..=8);
        let allocation = allocate(&berths, true).unwrap();
        assert_eq!(allocation.berth.berth_number, BerthNumber::new(9));

        // With berth 3 freed ahead of 9, priority still takes the lowest lower.
        berths[2].is_occupied = false;
        assert_eq!(
            select_berth(&berths, true).unwrap().berth_number,
            BerthNumber::new(3)
        );
    }

    #[test]
    fn test_priority_falls_back_when_lower_exhausted() {
        let mut berths = standard_catalog();
        occupy(&mut berths, 1..=9);
        let allocation = allocate(&berths, true).unwrap();
        assert_eq!(allocation.berth.berth_number, BerthNumber::new(10));
        assert_eq!(allocation.status, TicketStatus::Rac);
    }

    #[test]
    fn test_upper_berths_are_confirmed() {
        let mut berths = standard_catalog();
        occupy(&mut berths, 1..=18);
        let allocation = allocate(&berths, false).unwrap();
        assert_eq!(allocation.berth.berth_number, BerthNumber::new(19));
        assert_eq!(allocation.status, TicketStatus::Confirmed);
    }

    #[test]
    fn test_exhausted_inventory_yields_none() {
        let mut berths = standard_catalog();
        occupy(&mut berths, 1..=27);
        assert!(allocate(&berths, false).is_none());
        assert!(allocate(&berths, true).is_none());
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let mut berths = standard_catalog();
        berths.reverse();
        assert_eq!(
            select_berth(&berths, false).unwrap().berth_number,
            BerthNumber::new(1)
        );
    }

    #[test]
    fn test_status_for_each_type() {
        assert_eq!(status_for(BerthType::Lower), TicketStatus::Confirmed);
        assert_eq!(status_for(BerthType::SideLower), TicketStatus::Rac);
        assert_eq!(status_for(BerthType::Upper), TicketStatus::Confirmed);
    }
}
