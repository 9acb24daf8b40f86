//! Priority eligibility for lower-berth allocation.
//!
//! A manifest is priority when it has a senior citizen, or when it has a
//! female passenger travelling with an infant. The infant may be anyone on
//! the manifest, including the female passenger herself.

use crate::types::Passenger;

/// Passengers this age or older make the manifest priority.
pub const SENIOR_AGE: u32 = 60;

/// Passengers younger than this count as infants.
pub const INFANT_AGE_LIMIT: u32 = 5;

/// Decide whether a manifest qualifies for priority berth assignment.
///
/// Pure function of the manifest. An empty manifest is never priority.
///
/// # Examples
///
/// ```
/// use berthline_core::eligibility::is_priority;
/// use berthline_core::types::{Gender, Passenger};
///
/// let family = vec![
///     Passenger::new("Lata", 31, Gender::Female),
///     Passenger::new("Kiran", 2, Gender::Male),
/// ];
/// assert!(is_priority(&family));
///
/// let friends = vec![
///     Passenger::new("Arjun", 28, Gender::Male),
///     Passenger::new("Dev", 29, Gender::Male),
/// ];
/// assert!(!is_priority(&friends));
/// ```
#[must_use]
pub fn is_priority(manifest: &[Passenger]) -> bool {
    let has_senior = manifest.iter().any(|p| p.age >= SENIOR_AGE);
    let has_female = manifest.iter().any(Passenger::is_female);
    let has_infant = manifest.iter().any(|p| p.age < INFANT_AGE_LIMIT);

    has_senior || (has_female && has_infant)
}
