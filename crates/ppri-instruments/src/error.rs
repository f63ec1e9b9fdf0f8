use thiserror::Error;

use crate::scoring::ItemError;

#[derive(Debug, Error)]
pub enum InstrumentError {
    #[error("{instrument} expects {expected} item responses, got {actual}")]
    WrongItemCount {
        instrument: String,
        expected: usize,
        actual: usize,
    },

    #[error("invalid item response: {0}")]
    ItemOutOfRange(#[from] ItemError),
}
