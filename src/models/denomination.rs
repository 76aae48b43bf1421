//! Voucher denominations
//!
//! The scheme issues vouchers in a closed set of three tiers: $2, $5 and
//! $10. Modeling the set as an enum (rather than an open map keyed by
//! integers) makes exhaustive handling a compile-time property; the catalog
//! still carries per-tranche counts as data.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::money::Money;

/// A voucher face value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u32", try_from = "u32")]
pub enum Denomination {
    Two,
    Five,
    Ten,
}

impl Denomination {
    /// All tiers in descending order
    ///
    /// Audit rows group denominations largest-first, so descending is the
    /// canonical iteration order.
    pub const DESCENDING: [Denomination; 3] = [Self::Ten, Self::Five, Self::Two];

    /// Face value in whole dollars
    pub const fn dollars(&self) -> i64 {
        match self {
            Self::Two => 2,
            Self::Five => 5,
            Self::Ten => 10,
        }
    }

    /// Face value as a monetary amount
    pub const fn value(&self) -> Money {
        Money::from_dollars(self.dollars())
    }
}

impl fmt::Display for Denomination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

impl From<Denomination> for u32 {
    fn from(d: Denomination) -> Self {
        d.dollars() as u32
    }
}

impl TryFrom<u32> for Denomination {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(Self::Two),
            5 => Ok(Self::Five),
            10 => Ok(Self::Ten),
            other => Err(format!("unsupported denomination: {}", other)),
        }
    }
}

/// Voucher counts per denomination
///
/// Serializes with the tier value as the key ("2"/"5"/"10"), matching the
/// distribution layout used in catalog files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DenominationCounts {
    #[serde(rename = "2", default)]
    pub twos: u32,
    #[serde(rename = "5", default)]
    pub fives: u32,
    #[serde(rename = "10", default)]
    pub tens: u32,
}

impl DenominationCounts {
    pub fn new(twos: u32, fives: u32, tens: u32) -> Self {
        Self { twos, fives, tens }
    }

    pub fn get(&self, denomination: Denomination) -> u32 {
        match denomination {
            Denomination::Two => self.twos,
            Denomination::Five => self.fives,
            Denomination::Ten => self.tens,
        }
    }

    pub fn set(&mut self, denomination: Denomination, count: u32) {
        match denomination {
            Denomination::Two => self.twos = count,
            Denomination::Five => self.fives = count,
            Denomination::Ten => self.tens = count,
        }
    }

    pub fn add(&mut self, denomination: Denomination, count: u32) {
        let current = self.get(denomination);
        self.set(denomination, current + count);
    }

    /// Total number of vouchers across all tiers
    pub fn total_count(&self) -> u32 {
        self.twos + self.fives + self.tens
    }

    /// Total monetary value across all tiers
    pub fn total_value(&self) -> Money {
        Denomination::DESCENDING
            .iter()
            .map(|d| Money::from_dollars(d.dollars() * self.get(*d) as i64))
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_count() == 0
    }

    /// (denomination, count) pairs in descending tier order
    pub fn iter(&self) -> impl Iterator<Item = (Denomination, u32)> + '_ {
        Denomination::DESCENDING.iter().map(|d| (*d, self.get(*d)))
    }
}
