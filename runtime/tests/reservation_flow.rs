//! End-to-end booking and cancellation flows against the in-memory store.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use berthline_core::store::BerthStore;
use berthline_core::{
    BerthNumber, BerthType, BookingError, NewTicket, Passenger, TicketId, TicketStatus,
};
use berthline_runtime::{HealthStatus, InMemoryBerthStore, ReservationEngine};
use berthline_testing::{fixtures, init_test_tracing, test_clock};
use std::sync::Arc;

async fn seeded() -> (ReservationEngine, InMemoryBerthStore) {
    init_test_tracing();
    let store = InMemoryBerthStore::new();
    let engine =
        ReservationEngine::new(Arc::new(store.clone())).with_clock(Arc::new(test_clock()));
    engine.initialize().await.expect("seeding should succeed");
    (engine, store)
}

async fn seed_waiting(store: &InMemoryBerthStore, count: usize) {
    let mut tx = store.begin().await.unwrap();
    for _ in 0..count {
        tx.create_ticket(NewTicket {
            status: TicketStatus::Waiting,
            berth_number: None,
            created_at: berthline_core::Utc::now(),
            passengers: fixtures::solo_adult(),
        })
        .await
        .unwrap();
    }
    tx.commit().await.unwrap();
}

fn thirty_year_old(i: usize) -> Vec<Passenger> {
    vec![fixtures::adult(&format!("Passenger {i}"))]
}

#[tokio::test]
async fn test_standard_scenario_promotes_first_rac_ticket() {
    let (engine, _) = seeded().await;

    for i in 1..=9 {
        let ticket = engine.book(thirty_year_old(i)).await.unwrap();
        assert_eq!(ticket.status, TicketStatus::Confirmed);
        assert_eq!(ticket.berth_number, Some(BerthNumber::new(u32::try_from(i).unwrap())));
    }

    let rac = engine.book(thirty_year_old(10)).await.unwrap();
    assert_eq!(rac.id, TicketId::new(10));
    assert_eq!(rac.status, TicketStatus::Rac);
    assert_eq!(rac.berth_number, Some(BerthNumber::new(10)));

    let cancellation = engine.cancel(TicketId::new(1)).await.unwrap();
    assert_eq!(cancellation.status, TicketStatus::Confirmed);
    assert_eq!(cancellation.freed_berth, Some(BerthNumber::new(1)));
    let promoted = cancellation.promoted.expect("RAC ticket should be promoted");
    assert_eq!(promoted.ticket_id, TicketId::new(10));
    assert_eq!(promoted.berth_number, Some(BerthNumber::new(10)));

    let ticket = engine.ticket(TicketId::new(10)).await.unwrap();
    assert_eq!(ticket.status, TicketStatus::Confirmed);
    assert_eq!(ticket.berth_number, Some(BerthNumber::new(10)));

    let berths = engine.berths().await.unwrap();
    assert!(!berths[0].is_occupied, "cancelled berth 1 is free again");
    assert!(berths[9].is_occupied, "promoted berth 10 stays occupied");

    assert!(matches!(
        engine.ticket(TicketId::new(1)).await,
        Err(BookingError::TicketNotFound(_))
    ));
}

#[tokio::test]
async fn test_priority_manifest_gets_lowest_free_lower_berth() {
    let (engine, _) = seeded().await;

    engine.book(thirty_year_old(1)).await.unwrap();
    engine.book(thirty_year_old(2)).await.unwrap();

    let ticket = engine.book(fixtures::mother_and_infant()).await.unwrap();
    assert_eq!(ticket.berth_number, Some(BerthNumber::new(3)));
    assert_eq!(ticket.status, TicketStatus::Confirmed);
    assert_eq!(ticket.passengers, fixtures::mother_and_infant());
}

#[tokio::test]
async fn test_priority_manifest_falls_back_when_lower_berths_are_gone() {
    let (engine, _) = seeded().await;

    for i in 1..=9 {
        engine.book(thirty_year_old(i)).await.unwrap();
    }

    let ticket = engine.book(fixtures::family_with_senior()).await.unwrap();
    assert_eq!(ticket.berth_number, Some(BerthNumber::new(10)));
    assert_eq!(ticket.status, TicketStatus::Rac);
}

#[tokio::test]
async fn test_upper_berths_are_confirmed() {
    let (engine, _) = seeded().await;

    for i in 1..=18 {
        engine.book(thirty_year_old(i)).await.unwrap();
    }

    let ticket = engine.book(thirty_year_old(19)).await.unwrap();
    assert_eq!(ticket.berth_number, Some(BerthNumber::new(19)));
    assert_eq!(ticket.status, TicketStatus::Confirmed);
}

#[tokio::test]
async fn test_full_train_rejects_booking() {
    let (engine, _) = seeded().await;

    for i in 1..=27 {
        engine.book(thirty_year_old(i)).await.unwrap();
    }

    let result = engine.book(thirty_year_old(28)).await;
    assert!(matches!(result, Err(BookingError::NoBerthAvailable)));
    assert!(engine.list_available_berths().await.unwrap().is_empty());
    assert_eq!(engine.list_booked().await.unwrap().len(), 27);
}

#[tokio::test]
async fn test_waiting_list_below_capacity_allows_booking() {
    let (engine, store) = seeded().await;
    seed_waiting(&store, 9).await;

    let ticket = engine.book(fixtures::solo_adult()).await.unwrap();
    assert_eq!(ticket.status, TicketStatus::Confirmed);
}

#[tokio::test]
async fn test_waiting_list_at_capacity_rejects_booking() {
    let (engine, store) = seeded().await;
    seed_waiting(&store, 10).await;

    let result = engine.book(fixtures::solo_adult()).await;
    assert!(matches!(
        result,
        Err(BookingError::WaitingListFull { capacity: 10 })
    ));
    assert_eq!(engine.list_available_berths().await.unwrap().len(), 27);
}

#[tokio::test]
async fn test_cancelling_rac_ticket_promotes_nobody() {
    let (engine, _) = seeded().await;

    for i in 1..=11 {
        engine.book(thirty_year_old(i)).await.unwrap();
    }

    let cancellation = engine.cancel(TicketId::new(10)).await.unwrap();
    assert_eq!(cancellation.status, TicketStatus::Rac);
    assert_eq!(cancellation.freed_berth, Some(BerthNumber::new(10)));
    assert!(cancellation.promoted.is_none());

    let still_rac = engine.ticket(TicketId::new(11)).await.unwrap();
    assert_eq!(still_rac.status, TicketStatus::Rac);
}

#[tokio::test]
async fn test_cancelling_confirmed_without_rac_only_frees_berth() {
    let (engine, _) = seeded().await;

    let ticket = engine.book(fixtures::solo_adult()).await.unwrap();
    let cancellation = engine.cancel(ticket.id).await.unwrap();

    assert!(cancellation.promoted.is_none());
    assert_eq!(engine.list_available_berths().await.unwrap().len(), 27);
    assert!(engine.list_booked().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_promotion_picks_lowest_rac_id() {
    let (engine, _) = seeded().await;

    for i in 1..=12 {
        engine.book(thirty_year_old(i)).await.unwrap();
    }

    let first = engine.cancel(TicketId::new(2)).await.unwrap();
    assert_eq!(first.promoted.map(|p| p.ticket_id), Some(TicketId::new(10)));

    let second = engine.cancel(TicketId::new(3)).await.unwrap();
    assert_eq!(second.promoted.map(|p| p.ticket_id), Some(TicketId::new(11)));
}

#[tokio::test]
async fn test_cancelling_unknown_ticket_changes_nothing() {
    let (engine, _) = seeded().await;
    engine.book(fixtures::solo_adult()).await.unwrap();

    let before_booked = engine.list_booked().await.unwrap();
    let before_berths = engine.berths().await.unwrap();

    let result = engine.cancel(TicketId::new(999)).await;
    assert!(matches!(
        result,
        Err(BookingError::TicketNotFound(id)) if id == TicketId::new(999)
    ));

    assert_eq!(engine.list_booked().await.unwrap(), before_booked);
    assert_eq!(engine.berths().await.unwrap(), before_berths);
}

#[tokio::test]
async fn test_cancelled_berth_is_reused() {
    let (engine, _) = seeded().await;

    let first = engine.book(thirty_year_old(1)).await.unwrap();
    engine.book(thirty_year_old(2)).await.unwrap();
    engine.cancel(first.id).await.unwrap();

    let again = engine.book(thirty_year_old(3)).await.unwrap();
    assert_eq!(again.berth_number, Some(BerthNumber::new(1)));
    assert!(again.id > first.id, "identifiers are never reused");
}

#[tokio::test]
async fn test_list_booked_is_ordered_and_excludes_waiting() {
    let (engine, store) = seeded().await;
    seed_waiting(&store, 2).await;

    for i in 1..=11 {
        engine.book(thirty_year_old(i)).await.unwrap();
    }

    let booked = engine.list_booked().await.unwrap();
    assert_eq!(booked.len(), 11);
    assert!(booked.windows(2).all(|w| w[0].id < w[1].id));
    assert!(booked.iter().all(|t| t.status != TicketStatus::Waiting));
    assert_eq!(booked, engine.list_booked().await.unwrap());
}

#[tokio::test]
async fn test_available_berths_report_number_and_type() {
    let (engine, _) = seeded().await;
    engine.book(fixtures::solo_adult()).await.unwrap();

    let available = engine.list_available_berths().await.unwrap();
    assert_eq!(available.len(), 26);
    assert_eq!(available[0].berth_number, BerthNumber::new(2));
    assert_eq!(available[0].berth_type, BerthType::Lower);
    assert!(available.iter().all(|b| !b.is_occupied));
}

#[tokio::test]
async fn test_created_at_comes_from_engine_clock() {
    let (engine, _) = seeded().await;
    let ticket = engine.book(fixtures::solo_adult()).await.unwrap();
    assert_eq!(ticket.created_at.to_rfc3339(), "2025-01-01T00:00:00+00:00");
}

#[tokio::test]
async fn test_initialize_is_idempotent() {
    let (engine, _) = seeded().await;
    engine.book(fixtures::solo_adult()).await.unwrap();

    assert_eq!(engine.initialize().await.unwrap(), 0);

    let berths = engine.berths().await.unwrap();
    assert_eq!(berths.len(), 27);
    assert!(berths[0].is_occupied, "occupancy survives re-initialization");
}

#[tokio::test]
async fn test_health_check_reports_seeding_state() {
    let engine = ReservationEngine::new(Arc::new(InMemoryBerthStore::new()));
    assert_eq!(engine.health_check().await.status, HealthStatus::Degraded);

    assert_eq!(engine.initialize().await.unwrap(), 27);
    assert_eq!(engine.health_check().await.status, HealthStatus::Healthy);
}
