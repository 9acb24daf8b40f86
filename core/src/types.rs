//! Domain types for berth inventory and the ticket ledger.
//!
//! Wire and storage spellings are fixed here: ticket status serializes as
//! `confirmed` / `RAC` / `waiting`, berth type as `lower` / `side-lower` /
//! `upper`, gender as lowercase text.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Parsing
// ============================================================================

/// A stored or submitted string did not name a known variant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown {kind}: {value}")]
pub struct UnknownVariant {
    /// Which enumeration was being parsed
    pub kind: &'static str,
    /// The rejected input
    pub value: String,
}

// ============================================================================
// Identifiers
// ============================================================================

/// Number of a physical berth.
///
/// Assigned once from the catalog and never changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BerthNumber(u32);

impl BerthNumber {
    /// Wrap a raw berth number.
    #[must_use]
    pub const fn new(number: u32) -> Self {
        Self(number)
    }

    /// The raw berth number.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for BerthNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ledger-assigned ticket identifier.
///
/// Identifiers increase monotonically, so "lowest identifier" also means
/// "booked earliest".
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(i64);

impl TicketId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// The raw identifier.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Berths
// ============================================================================

/// Physical berth category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BerthType {
    /// Lower berth; preferred for priority passengers
    #[serde(rename = "lower")]
    Lower,
    /// Side-lower berth, shared by two RAC passengers
    #[serde(rename = "side-lower")]
    SideLower,
    /// Upper berth
    #[serde(rename = "upper")]
    Upper,
}

impl BerthType {
    /// Storage spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lower => "lower",
            Self::SideLower => "side-lower",
            Self::Upper => "upper",
        }
    }
}

impl FromStr for BerthType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lower" => Ok(Self::Lower),
            "side-lower" => Ok(Self::SideLower),
            "upper" => Ok(Self::Upper),
            _ => Err(UnknownVariant {
                kind: "berth type",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for BerthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A berth in the inventory.
///
/// Only `is_occupied` ever changes after the catalog is seeded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Berth {
    /// Unique berth number
    pub berth_number: BerthNumber,
    /// Berth category
    #[serde(rename = "type")]
    pub berth_type: BerthType,
    /// Whether a ticket currently holds this berth
    pub is_occupied: bool,
}

impl Berth {
    /// Create an unoccupied berth.
    #[must_use]
    pub const fn new(berth_number: BerthNumber, berth_type: BerthType) -> Self {
        Self {
            berth_number,
            berth_type,
            is_occupied: false,
        }
    }
}

// ============================================================================
// Tickets
// ============================================================================

/// Ticket lifecycle status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TicketStatus {
    /// Holds a full berth
    #[serde(rename = "confirmed")]
    Confirmed,
    /// Reservation Against Cancellation: holds a shared side-lower berth
    #[serde(rename = "RAC")]
    Rac,
    /// On the waiting list, no berth
    #[serde(rename = "waiting")]
    Waiting,
}

impl TicketStatus {
    /// Statuses whose tickets count as booked (they hold a berth).
    pub const BOOKED: [Self; 2] = [Self::Confirmed, Self::Rac];

    /// Storage spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Rac => "RAC",
            Self::Waiting => "waiting",
        }
    }
}

impl FromStr for TicketStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmed" => Ok(Self::Confirmed),
            "RAC" => Ok(Self::Rac),
            "waiting" => Ok(Self::Waiting),
            _ => Err(UnknownVariant {
                kind: "ticket status",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Passenger gender.
///
/// Only `male` and `female` carry policy meaning; anything else is kept
/// verbatim, including other spellings of `male` and `female`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Gender {
    /// `male`
    Male,
    /// `female`
    Female,
    /// Any other submitted value
    Other(String),
}

impl Gender {
    /// Storage spelling.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Other(value) => value,
        }
    }
}

impl From<String> for Gender {
    fn from(value: String) -> Self {
        match value.as_str() {
            "male" => Self::Male,
            "female" => Self::Female,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for Gender {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<Gender> for String {
    fn from(gender: Gender) -> Self {
        match gender {
            Gender::Other(value) => value,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A passenger on a ticket's manifest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passenger {
    /// Passenger name
    pub name: String,
    /// Age in whole years
    pub age: u32,
    /// Gender
    pub gender: Gender,
}

impl Passenger {
    /// Create a passenger.
    #[must_use]
    pub fn new(name: impl Into<String>, age: u32, gender: Gender) -> Self {
        Self {
            name: name.into(),
            age,
            gender,
        }
    }

    /// Whether this passenger is recorded as female.
    #[must_use]
    pub const fn is_female(&self) -> bool {
        matches!(self.gender, Gender::Female)
    }
}

/// A live ticket with its full passenger manifest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Ledger-assigned identifier
    pub id: TicketId,
    /// Current status
    pub status: TicketStatus,
    /// Berth held by this ticket; `None` for waiting tickets
    pub berth_number: Option<BerthNumber>,
    /// When the ticket was booked
    pub created_at: DateTime<Utc>,
    /// Passengers in manifest order
    pub passengers: Vec<Passenger>,
}

/// A ticket about to be written to the ledger.
///
/// The ledger assigns the identifier on insert.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewTicket {
    /// Initial status
    pub status: TicketStatus,
    /// Allocated berth, if any
    pub berth_number: Option<BerthNumber>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Passengers in manifest order
    pub passengers: Vec<Passenger>,
}

impl NewTicket {
    /// Attach a ledger identifier, producing the stored ticket.
    #[must_use]
    pub fn into_ticket(self, id: TicketId) -> Ticket {
        Ticket {
            id,
            status: self.status,
            berth_number: self.berth_number,
            created_at: self.created_at,
            passengers: self.passengers,
        }
    }
}
