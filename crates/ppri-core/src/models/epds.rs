use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;

/// Number of items on the Edinburgh Postnatal Depression Scale.
pub const EPDS_ITEM_COUNT: usize = 10;

/// Highest value a single EPDS item can take.
pub const EPDS_ITEM_MAX: u8 = 3;

/// Zero-based index of item 10, "The thought of harming myself has occurred to me".
pub const SELF_HARM_ITEM: usize = 9;

/// Form field name for a zero-based EPDS item index (`epds_1` … `epds_10`).
pub fn item_field(index: usize) -> String {
    format!("epds_{}", index + 1)
}

/// Zero-based item index for an `epds_N` field name, `None` for any other
/// field.
pub fn item_index(field: &str) -> Option<usize> {
    field
        .strip_prefix("epds_")
        .and_then(|n| n.parse::<usize>().ok())
        .filter(|n| (1..=EPDS_ITEM_COUNT).contains(n))
        .map(|n| n - 1)
}

/// The ten EPDS answers of a draft. `None` marks an item the clinician has
/// not answered yet; it is never a valid scoring input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EpdsAnswers([Option<u8>; EPDS_ITEM_COUNT]);

impl EpdsAnswers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a fully answered set. Fails on the first value above 3.
    pub fn from_values(values: [u8; EPDS_ITEM_COUNT]) -> Result<Self, CoreError> {
        let mut answers = Self::new();
        for (index, value) in values.into_iter().enumerate() {
            answers.set(index, value)?;
        }
        Ok(answers)
    }

    pub fn get(&self, index: usize) -> Option<u8> {
        self.0.get(index).copied().flatten()
    }

    pub fn set(&mut self, index: usize, value: u8) -> Result<(), CoreError> {
        if index >= EPDS_ITEM_COUNT {
            return Err(CoreError::EpdsItemIndex(index));
        }
        if value > EPDS_ITEM_MAX {
            return Err(CoreError::EpdsValueOutOfRange {
                item: index + 1,
                value,
            });
        }
        self.0[index] = Some(value);
        Ok(())
    }

    pub fn clear(&mut self, index: usize) -> Result<(), CoreError> {
        let slot = self
            .0
            .get_mut(index)
            .ok_or(CoreError::EpdsItemIndex(index))?;
        *slot = None;
        Ok(())
    }

    /// Zero-based indices of items still unset.
    pub fn unanswered(&self) -> Vec<usize> {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_none())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.0.iter().all(Option::is_some)
    }

    /// All ten values, or `None` while any item is unset.
    pub fn values(&self) -> Option<[u8; EPDS_ITEM_COUNT]> {
        let mut out = [0u8; EPDS_ITEM_COUNT];
        for (slot, value) in out.iter_mut().zip(self.0) {
            *slot = value?;
        }
        Some(out)
    }

}
