//! The fixed berth catalog.
//!
//! A coach has 27 berths: 1–9 lower, 10–18 side-lower, 19–27 upper. Stores
//! seed this catalog once when they hold no berths and never touch it again.

use crate::types::{Berth, BerthNumber, BerthType};

/// Number of berths of each type.
pub const BERTHS_PER_TYPE: u32 = 9;

/// Total number of berths in the catalog.
pub const TOTAL_BERTHS: u32 = BERTHS_PER_TYPE * 3;

/// Berth types in catalog order.
const LAYOUT: [BerthType; 3] = [BerthType::Lower, BerthType::SideLower, BerthType::Upper];

/// Build the standard catalog, all berths unoccupied, in berth-number order.
#[must_use]
pub fn standard_catalog() -> Vec<Berth> {
    LAYOUT
        .iter()
        .zip(0u32..)
        .flat_map(|(&berth_type, block)| {
            let first = block * BERTHS_PER_TYPE + 1;
            (first..first + BERTHS_PER_TYPE)
                .map(move |number| Berth::new(BerthNumber::new(number), berth_type))
        })
        .collect()
}
