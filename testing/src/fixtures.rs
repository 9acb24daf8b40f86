//! Passenger and manifest fixtures.

use berthline_core::{Gender, Passenger};

/// A 30-year-old male: never priority on his own.
#[must_use]
pub fn adult(name: &str) -> Passenger {
    Passenger::new(name, 30, Gender::Male)
}

/// A 28-year-old female: priority only alongside an infant.
#[must_use]
pub fn woman(name: &str) -> Passenger {
    Passenger::new(name, 28, Gender::Female)
}

/// A 65-year-old: priority regardless of gender.
#[must_use]
pub fn senior(name: &str) -> Passenger {
    Passenger::new(name, 65, Gender::Male)
}

/// A 2-year-old.
#[must_use]
pub fn infant(name: &str) -> Passenger {
    Passenger::new(name, 2, Gender::Female)
}

/// A single non-priority traveller.
#[must_use]
pub fn solo_adult() -> Vec<Passenger> {
    vec![adult("Arjun")]
}

/// A female travelling with an infant.
#[must_use]
pub fn mother_and_infant() -> Vec<Passenger> {
    vec![woman("Lakshmi"), infant("Anu")]
}

/// A manifest whose only priority member is a senior.
#[must_use]
pub fn family_with_senior() -> Vec<Passenger> {
    vec![adult("Vikram"), senior("Gopal")]
}
