use thiserror::Error;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("unknown risk filter: {0}")]
    UnknownRiskFilter(String),
}
