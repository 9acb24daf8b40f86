//! HTTP request handlers.

pub mod health;
pub mod tickets;

pub use health::{health_check, readiness_check};
