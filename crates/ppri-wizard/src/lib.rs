//! ppri-wizard
//!
//! The screening questionnaire as an explicit state machine. Collects answers
//! step by step, gates transitions on validation, derives the risk result on
//! request and hands the finalized record to an injected store.

pub mod collaborator;
pub mod error;
pub mod memory;
pub mod predictor;
pub mod questionnaire;
pub mod state;
pub mod step;

pub use questionnaire::Questionnaire;
