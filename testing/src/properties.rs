//! proptest strategies for passengers and manifests.

use berthline_core::eligibility::{INFANT_AGE_LIMIT, SENIOR_AGE};
use berthline_core::{Gender, Passenger};
use proptest::prelude::*;

/// Any gender, including free-form values.
pub fn arb_gender() -> impl Strategy<Value = Gender> {
    prop_oneof![
        Just(Gender::Male),
        Just(Gender::Female),
        "[a-z]{3,8}".prop_map(Gender::from),
    ]
}

/// A passenger of any age and gender.
pub fn arb_passenger() -> impl Strategy<Value = Passenger> {
    ("[A-Z][a-z]{1,10}", 0u32..100, arb_gender())
        .prop_map(|(name, age, gender)| Passenger::new(name, age, gender))
}

/// One to five passengers of any kind.
pub fn arb_manifest() -> impl Strategy<Value = Vec<Passenger>> {
    prop::collection::vec(arb_passenger(), 1..6)
}

/// Manifests that never qualify for priority: no senior, no infant.
pub fn arb_regular_manifest() -> impl Strategy<Value = Vec<Passenger>> {
    let adult = ("[A-Z][a-z]{1,10}", INFANT_AGE_LIMIT..SENIOR_AGE, arb_gender())
        .prop_map(|(name, age, gender)| Passenger::new(name, age, gender));
    prop::collection::vec(adult, 1..6)
}

/// Manifests that always qualify: a senior is inserted into an arbitrary one.
pub fn arb_priority_manifest() -> impl Strategy<Value = Vec<Passenger>> {
    (
        prop::collection::vec(arb_passenger(), 0..5),
        SENIOR_AGE..110,
        any::<prop::sample::Index>(),
    )
        .prop_map(|(mut manifest, age, position)| {
            let at = position.index(manifest.len() + 1);
            manifest.insert(at, Passenger::new("Elder", age, Gender::Female));
            manifest
        })
}

/// A sequence of booking manifests mixing priority and regular travellers.
pub fn arb_booking_sequence(max_len: usize) -> impl Strategy<Value = Vec<Vec<Passenger>>> {
    prop::collection::vec(
        prop_oneof![arb_regular_manifest(), arb_priority_manifest()],
        0..=max_len,
    )
}
