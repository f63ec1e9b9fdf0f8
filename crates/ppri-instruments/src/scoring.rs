use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

/// Closed integer range of valid scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScoreRange {
    pub min: u8,
    pub max: u8,
}

impl ScoreRange {
    pub fn contains(&self, value: u8) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// One question of an instrument.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Item {
    /// Form field name (e.g., `epds_10`).
    pub id: String,
    pub number: u8,
    pub prompt: String,
    pub range: ScoreRange,
}

/// An interpretation band over the instrument total.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Band {
    pub label: String,
    pub range: ScoreRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, Error)]
#[ts(export)]
#[error("{message}")]
pub struct ItemError {
    pub item_id: String,
    pub value: u8,
    pub expected_range: ScoreRange,
    pub message: String,
}
