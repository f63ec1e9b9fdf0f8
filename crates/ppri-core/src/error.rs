use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("EPDS item index {0} is out of bounds (expected 0..10)")]
    EpdsItemIndex(usize),

    #[error("EPDS item {item} has value {value}, expected 0-3")]
    EpdsValueOutOfRange { item: usize, value: u8 },

    #[error("EPDS item {item} needs a whole-number rating, got {value:?}")]
    EpdsValueInvalid { item: usize, value: String },
}
