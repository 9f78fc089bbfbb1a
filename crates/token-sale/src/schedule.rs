// token-sale/src/schedule.rs

use crate::{SaleError, SaleResult};
use ledger_types::Timestamp;
use serde::{Deserialize, Serialize};

/// The three sequential sale phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    One,
    Two,
    Three,
}

/// Time-based tier selector
///
/// Maps a timestamp to exactly one tier inside `[opening, closing)`; as
/// time advances the selected tier never moves backwards.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SaleSchedule {
    opening: Timestamp,
    tier_one_end: Timestamp,
    tier_two_end: Timestamp,
    closing: Timestamp,
}

impl SaleSchedule {
    pub fn new(
        opening: Timestamp,
        tier_one_end: Timestamp,
        tier_two_end: Timestamp,
        closing: Timestamp,
    ) -> SaleResult<Self> {
        if !(opening < tier_one_end && tier_one_end < tier_two_end && tier_two_end < closing) {
            return Err(SaleError::InvalidSchedule);
        }
        Ok(Self {
            opening,
            tier_one_end,
            tier_two_end,
            closing,
        })
    }

    pub fn opening(&self) -> Timestamp {
        self.opening
    }

    pub fn closing(&self) -> Timestamp {
        self.closing
    }

    pub fn is_open(&self, now: Timestamp) -> bool {
        self.opening <= now && now < self.closing
    }

    /// Active tier at `now`, or `None` outside the sale window
    pub fn tier_at(&self, now: Timestamp) -> Option<Tier> {
        if !self.is_open(now) {
            return None;
        }
        if now < self.tier_one_end {
            Some(Tier::One)
        } else if now < self.tier_two_end {
            Some(Tier::Two)
        } else {
            Some(Tier::Three)
        }
    }
}
