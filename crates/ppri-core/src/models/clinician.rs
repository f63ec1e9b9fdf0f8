use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// The signed-in clinician. Read-only context used to attribute saved records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Clinician {
    pub email: String,
    pub display_name: String,
}
