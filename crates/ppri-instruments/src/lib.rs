//! ppri-instruments
//!
//! Screening instrument definitions, the EPDS risk scoring engine and the
//! safety alert decision. Pure logic, no I/O.

pub mod engine;
pub mod error;
pub mod instruments;
pub mod safety;
pub mod scoring;

use error::InstrumentError;
use scoring::{Band, Item, ItemError, ScoreRange};

/// Trait implemented by each screening instrument.
pub trait Instrument: Send + Sync {
    /// Unique identifier for this instrument (e.g., "epds").
    fn id(&self) -> &str;

    /// Human-readable name (e.g., "EPDS").
    fn name(&self) -> &str;

    /// The items in administration order.
    fn items(&self) -> &[Item];

    /// Interpretation bands over the total, lowest first.
    fn bands(&self) -> &[Band];

    /// Valid range of the summed total.
    fn total_range(&self) -> ScoreRange {
        let (min, max) = self
            .items()
            .iter()
            .fold((0u8, 0u8), |(lo, hi), item| (lo + item.range.min, hi + item.range.max));
        ScoreRange { min, max }
    }

    /// Check the response count and every response against its item's range.
    /// Out-of-range values are rejected, never clamped.
    fn validate_responses(&self, responses: &[u8]) -> Result<(), InstrumentError> {
        let items = self.items();
        if responses.len() != items.len() {
            return Err(InstrumentError::WrongItemCount {
                instrument: self.name().to_string(),
                expected: items.len(),
                actual: responses.len(),
            });
        }

        for (item, &value) in items.iter().zip(responses) {
            if !item.range.contains(value) {
                return Err(ItemError {
                    item_id: item.id.clone(),
                    value,
                    expected_range: item.range,
                    message: format!(
                        "{}: item {} response {} is outside range [{}, {}]",
                        self.name(),
                        item.number,
                        value,
                        item.range.min,
                        item.range.max,
                    ),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Validated sum of the responses.
    fn total(&self, responses: &[u8]) -> Result<u8, InstrumentError> {
        self.validate_responses(responses)?;
        Ok(responses.iter().sum())
    }

    /// The band containing `total`, if any.
    fn band_for(&self, total: u8) -> Option<&Band> {
        self.bands().iter().find(|b| b.range.contains(total))
    }
}
