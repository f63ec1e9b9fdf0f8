//! ppri-core
//!
//! Pure domain types for perinatal depression screening: the in-progress
//! assessment draft, EPDS answers, scoring results and the finalized record
//! handed to persistence. No I/O here.

pub mod error;
pub mod models;
