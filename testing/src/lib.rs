//! # Berthline Testing
//!
//! Testing utilities shared by the Berthline crates.
//!
//! This crate provides:
//! - A fixed [`Clock`] so `created_at` stamps are reproducible
//! - Passenger fixtures for the manifests the allocation policy cares about
//! - [`FaultyStore`], a store wrapper that fails chosen operations on demand
//! - proptest strategies for passengers and manifests
//!
//! ## Example
//!
//! ```
//! use berthline_core::eligibility::is_priority;
//! use berthline_testing::fixtures;
//!
//! assert!(is_priority(&fixtures::mother_and_infant()));
//! assert!(!is_priority(&[fixtures::adult("Kiran")]));
//! ```

use berthline_core::environment::Clock;
use chrono::{DateTime, Utc};

pub mod faults;
pub mod fixtures;
pub mod properties;

/// Mock implementations for testing.
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use berthline_testing::mocks::FixedClock;
    /// use berthline_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// Install a test-friendly tracing subscriber once per process.
///
/// Honours `RUST_LOG`; output goes through the test harness's capture.
pub fn init_test_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

// Re-export commonly used items
pub use faults::{FailPoint, Fault, FaultyStore};
pub use mocks::{FixedClock, test_clock};
