//! End-to-end tests of the HTTP surface against an in-memory store.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use berthline_core::store::BerthStore;
use berthline_core::{NewTicket, TicketStatus, Utc};
use berthline_runtime::{InMemoryBerthStore, ReservationEngine};
use berthline_testing::{FailPoint, Fault, FaultyStore, fixtures, test_clock};
use berthline_web::{AppState, CORRELATION_ID_HEADER, build_router};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

async fn seeded_app() -> Router {
    let engine = ReservationEngine::new(Arc::new(InMemoryBerthStore::new()))
        .with_clock(Arc::new(test_clock()));
    engine.initialize().await.unwrap();
    build_router(AppState::new(engine))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value, Response<()>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let (parts, body) = response.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (parts.status, json, Response::from_parts(parts, ()))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn book_body(name: &str, age: u32, gender: &str) -> Value {
    json!({ "passengers": [{ "name": name, "age": age, "gender": gender }] })
}

#[tokio::test]
async fn test_book_returns_created_ticket() {
    let app = seeded_app().await;

    let (status, body, _) = send(
        &app,
        post_json("/api/v1/tickets/book", &book_body("Asha", 67, "female")),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["ticket_id"], 1);
    assert_eq!(body["status"], "confirmed");
    assert_eq!(body["berth_number"], 1);
    assert_eq!(body["passengers"][0]["name"], "Asha");
    assert_eq!(body["passengers"][0]["gender"], "female");
}

#[tokio::test]
async fn test_tenth_booking_is_rac_and_cancel_promotes_it() {
    let app = seeded_app().await;

    for i in 0..9 {
        let (status, body, _) = send(
            &app,
            post_json("/api/v1/tickets/book", &book_body(&format!("P{i}"), 30, "male")),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "confirmed");
    }

    let (_, tenth, _) = send(
        &app,
        post_json("/api/v1/tickets/book", &book_body("P9", 30, "male")),
    )
    .await;
    assert_eq!(tenth["status"], "RAC");
    assert_eq!(tenth["berth_number"], 10);

    let (status, body, _) = send(&app, post("/api/v1/tickets/cancel/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Ticket canceled successfully");
    assert_eq!(body["ticket_id"], 1);
    assert_eq!(body["freed_berth"], 1);
    assert_eq!(body["promoted_ticket_id"], 10);

    let (status, promoted, _) = send(&app, get("/api/v1/tickets/10")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(promoted["status"], "confirmed");
    assert_eq!(promoted["berth_number"], 10);
}

#[tokio::test]
async fn test_cancel_unknown_ticket_is_not_found() {
    let app = seeded_app().await;

    let (status, body, _) = send(&app, post("/api/v1/tickets/cancel/999")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "TICKET_NOT_FOUND");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_get_unknown_ticket_is_not_found() {
    let app = seeded_app().await;

    let (status, body, _) = send(&app, get("/api/v1/tickets/42")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "TICKET_NOT_FOUND");
}

#[tokio::test]
async fn test_full_train_rejects_with_bad_request() {
    let app = seeded_app().await;

    for i in 0..27 {
        let (status, _, _) = send(
            &app,
            post_json("/api/v1/tickets/book", &book_body(&format!("P{i}"), 40, "male")),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body, _) = send(
        &app,
        post_json("/api/v1/tickets/book", &book_body("Late", 40, "male")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "NO_BERTHS_AVAILABLE");

    let (_, available, _) = send(&app, get("/api/v1/tickets/available")).await;
    assert_eq!(available["available_berths"], json!([]));
}

#[tokio::test]
async fn test_full_waiting_list_rejects_with_bad_request() {
    let store = Arc::new(InMemoryBerthStore::new());
    let engine = ReservationEngine::new(store.clone()).with_clock(Arc::new(test_clock()));
    engine.initialize().await.unwrap();
    let app = build_router(AppState::new(engine));

    let mut tx = store.begin().await.unwrap();
    for _ in 0..10 {
        tx.create_ticket(NewTicket {
            status: TicketStatus::Waiting,
            berth_number: None,
            created_at: Utc::now(),
            passengers: fixtures::solo_adult(),
        })
        .await
        .unwrap();
    }
    tx.commit().await.unwrap();

    let (status, body, _) = send(
        &app,
        post_json("/api/v1/tickets/book", &book_body("Asha", 67, "female")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "WAITING_LIST_FULL");
    assert_eq!(body["message"], "No tickets available");

    let (_, available, _) = send(&app, get("/api/v1/tickets/available")).await;
    assert_eq!(available["available_berths"].as_array().unwrap().len(), 27);
}

#[tokio::test]
async fn test_empty_manifest_is_unprocessable() {
    let app = seeded_app().await;

    let (status, body, _) = send(
        &app,
        post_json("/api/v1/tickets/book", &json!({ "passengers": [] })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_blank_passenger_name_is_unprocessable() {
    let app = seeded_app().await;

    let (status, body, _) = send(
        &app,
        post_json("/api/v1/tickets/book", &book_body("  ", 30, "male")),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (_, booked, _) = send(&app, get("/api/v1/tickets/booked")).await;
    assert_eq!(booked, json!([]));
}

#[tokio::test]
async fn test_malformed_json_is_rejected() {
    let app = seeded_app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/tickets/book")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"passengers\": [{\"name\": \"Asha\"}"))
        .unwrap();
    let (status, _, _) = send(&app, request).await;

    assert!(status.is_client_error());
}

#[tokio::test]
async fn test_booked_lists_confirmed_and_rac_in_id_order() {
    let app = seeded_app().await;

    for i in 0..10 {
        send(
            &app,
            post_json("/api/v1/tickets/book", &book_body(&format!("P{i}"), 30, "male")),
        )
        .await;
    }

    let (status, booked, _) = send(&app, get("/api/v1/tickets/booked")).await;

    assert_eq!(status, StatusCode::OK);
    let booked = booked.as_array().unwrap();
    assert_eq!(booked.len(), 10);
    let ids: Vec<i64> = booked
        .iter()
        .map(|t| t["ticket_id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, (1..=10).collect::<Vec<_>>());
    assert_eq!(booked[9]["status"], "RAC");
}

#[tokio::test]
async fn test_available_lists_free_berths_with_type() {
    let app = seeded_app().await;
    send(
        &app,
        post_json("/api/v1/tickets/book", &book_body("Asha", 30, "male")),
    )
    .await;

    let (status, body, _) = send(&app, get("/api/v1/tickets/available")).await;

    assert_eq!(status, StatusCode::OK);
    let berths = body["available_berths"].as_array().unwrap();
    assert_eq!(berths.len(), 26);
    assert_eq!(berths[0], json!({ "berth_number": 2, "type": "lower" }));
    assert!(berths.iter().any(|b| b["type"] == "side-lower"));
    assert!(berths.iter().any(|b| b["type"] == "upper"));
}

#[tokio::test]
async fn test_store_failure_is_internal_error_without_detail() {
    let faulty = FaultyStore::new(Arc::new(InMemoryBerthStore::new()));
    let engine = ReservationEngine::new(Arc::new(faulty.clone()));
    engine.initialize().await.unwrap();
    let app = build_router(AppState::new(engine));

    faulty.arm(FailPoint::CreateTicket, Fault::Database, 1);
    let (status, body, _) = send(
        &app,
        post_json("/api/v1/tickets/book", &book_body("Asha", 30, "male")),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "INTERNAL_SERVER_ERROR");
    assert_eq!(body["message"], "An internal error occurred");
}

#[tokio::test]
async fn test_health_and_readiness() {
    let app = seeded_app().await;

    let (status, body, _) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body, _) = send(&app, get("/ready")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ready"], true);
    assert_eq!(body["store"], "healthy");
}

#[tokio::test]
async fn test_unseeded_store_is_not_ready() {
    let engine = ReservationEngine::new(Arc::new(InMemoryBerthStore::new()));
    let app = build_router(AppState::new(engine));

    let (status, body, _) = send(&app, get("/ready")).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["ready"], false);
    assert_eq!(body["store"], "degraded");
}

#[tokio::test]
async fn test_unreachable_store_is_not_ready() {
    let faulty = FaultyStore::new(Arc::new(InMemoryBerthStore::new()));
    faulty.arm(FailPoint::Begin, Fault::Database, usize::MAX);
    let app = build_router(AppState::new(ReservationEngine::new(Arc::new(faulty))));

    let (status, body, _) = send(&app, get("/ready")).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["store"], "unhealthy");
}

#[tokio::test]
async fn test_every_response_carries_correlation_id() {
    let app = seeded_app().await;

    let (_, _, ok) = send(&app, get("/health")).await;
    assert!(ok.headers().contains_key(CORRELATION_ID_HEADER));

    let supplied = "7f2c1a9e-3b4d-4c5e-8f6a-1b2c3d4e5f60";
    let request = Request::builder()
        .uri("/api/v1/tickets/404")
        .header(CORRELATION_ID_HEADER, supplied)
        .body(Body::empty())
        .unwrap();
    let (status, _, not_found) = send(&app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        not_found.headers().get(CORRELATION_ID_HEADER).unwrap(),
        supplied
    );
}
