//! Contracts for the services the questionnaire depends on but does not own:
//! prediction, persistence and clinician identity.

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;
use uuid::Uuid;

use ppri_core::models::clinician::Clinician;
use ppri_core::models::record::{AssessmentRecord, SavedRecord};
use ppri_core::models::result::Prediction;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Answer set sent to a prediction service, keyed by form field name.
pub type PredictionRequest = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollaboratorError {
    #[error("prediction service error: {0}")]
    Prediction(String),

    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("{service} returned status {code}")]
    Status { service: String, code: u16 },

    #[error("record not found: {0}")]
    NotFound(Uuid),
}

impl CollaboratorError {
    /// Transient failures the user can retry as is.
    pub fn is_retryable(&self) -> bool {
        match self {
            CollaboratorError::Prediction(_) | CollaboratorError::Persistence(_) => true,
            CollaboratorError::Status { code, .. } => *code == 429 || *code >= 500,
            CollaboratorError::NotFound(_) => false,
        }
    }
}

/// An external model that classifies the full questionnaire.
/// Its tier is authoritative over the local EPDS classification.
pub trait Predictor: Send + Sync {
    fn predict(
        &self,
        request: PredictionRequest,
    ) -> BoxFuture<'_, Result<Prediction, CollaboratorError>>;
}

/// Persistence for finalized assessments.
pub trait AssessmentStore: Send + Sync {
    /// Persist a record and return it with its assigned identifier.
    fn save(&self, record: AssessmentRecord) -> BoxFuture<'_, Result<SavedRecord, CollaboratorError>>;

    fn list(&self) -> BoxFuture<'_, Result<Vec<SavedRecord>, CollaboratorError>>;

    fn delete(&self, id: Uuid) -> BoxFuture<'_, Result<SavedRecord, CollaboratorError>>;

    /// Remove every record. Returns how many were removed.
    fn clear(&self) -> BoxFuture<'_, Result<usize, CollaboratorError>>;
}

/// Supplies the signed-in clinician for attribution.
pub trait IdentityProvider: Send + Sync {
    fn current_clinician(&self) -> Option<Clinician>;
}

/// A fixed identity, e.g. loaded from configuration.
#[derive(Debug, Clone)]
pub struct StaticIdentity(pub Clinician);

impl IdentityProvider for StaticIdentity {
    fn current_clinician(&self) -> Option<Clinician> {
        Some(self.0.clone())
    }
}
