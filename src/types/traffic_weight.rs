// ABOUTME: Traffic weight percentage for revision traffic splitting.
// ABOUTME: An integer in 0..=100; weights outside the range are rejected.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrafficWeightError {
    #[error("traffic weight must be between 0 and 100, got {0}")]
    OutOfRange(u32),
}

/// Percentage of traffic routed to a revision.
///
/// Weight 0 is valid: a revision can stay active while receiving no traffic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TrafficWeight(u8);

impl TrafficWeight {
    pub const ZERO: TrafficWeight = TrafficWeight(0);
    pub const FULL: TrafficWeight = TrafficWeight(100);

    pub fn new(value: u32) -> Result<Self, TrafficWeightError> {
        if value > 100 {
            return Err(TrafficWeightError::OutOfRange(value));
        }
        Ok(Self(value as u8))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// The weight left over after this one is taken from 100%.
    pub fn remainder(self) -> u8 {
        100 - self.0
    }
}

impl fmt::Display for TrafficWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for TrafficWeight {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = u32::deserialize(deserializer)?;
        TrafficWeight::new(value).map_err(serde::de::Error::custom)
    }
}
