use serde::Serialize;
use thiserror::Error;

use ppri_core::error::CoreError;
use ppri_instruments::error::InstrumentError;

use crate::collaborator::CollaboratorError;
use crate::state::Phase;
use crate::step::Step;

/// Required fields missing before a transition that needs them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("missing required fields: {}", missing.join(", "))]
pub struct ValidationError {
    /// Form field names, in form order.
    pub missing: Vec<String>,
}

impl ValidationError {
    pub fn names(&self, field: &str) -> bool {
        self.missing.iter().any(|m| m == field)
    }
}

#[derive(Debug, Error)]
pub enum WizardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("scoring rejected the answers: {0}")]
    InvalidInput(#[from] InstrumentError),

    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),

    #[error("the result step is only reachable by generating a result")]
    GenerateRequired,

    #[error("cannot {action} while {phase}")]
    NotAllowed { action: &'static str, phase: Phase },

    #[error("step '{0}' has not been reached yet")]
    StepNotReachable(Step),

    #[error("no step at index {0}")]
    UnknownStep(usize),

    #[error("'{0}' is not one of the offered care plans")]
    UnknownPlan(String),

    #[error("assessment has been saved and can no longer be edited")]
    Frozen,

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl WizardError {
    /// Whether the same action can be retried without re-entering data.
    pub fn is_retryable(&self) -> bool {
        match self {
            WizardError::Collaborator(e) => e.is_retryable(),
            _ => false,
        }
    }
}
