//! ppri-history
//!
//! Dashboard logic over saved assessments: search and risk filtering,
//! summary statistics and CSV export.

pub mod error;
pub mod export;
pub mod query;
pub mod stats;

use std::path::Path;

use ppri_core::models::record::SavedRecord;

use crate::error::HistoryError;

/// Read a history file: a JSON array of saved records.
pub fn load_records(path: &Path) -> Result<Vec<SavedRecord>, HistoryError> {
    let contents = std::fs::read_to_string(path)?;
    let records: Vec<SavedRecord> = serde_json::from_str(&contents)?;
    tracing::debug!(path = %path.display(), count = records.len(), "loaded history");
    Ok(records)
}

/// Replace a history file with `records`. Written to a temporary file
/// first, then renamed over the original.
pub fn save_records(path: &Path, records: &[SavedRecord]) -> Result<(), HistoryError> {
    let json = serde_json::to_string_pretty(records)?;
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, json.as_bytes())?;
    std::fs::rename(&tmp_path, path)?;
    tracing::debug!(path = %path.display(), count = records.len(), "saved history");
    Ok(())
}
