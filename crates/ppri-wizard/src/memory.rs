use tokio::sync::Mutex;
use uuid::Uuid;

use ppri_core::models::record::{AssessmentRecord, SavedRecord};

use crate::collaborator::{AssessmentStore, BoxFuture, CollaboratorError};

/// In-process store. Records live as long as the store does.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<SavedRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store, e.g. from an exported history file.
    pub fn with_records(records: Vec<SavedRecord>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }
}

impl AssessmentStore for MemoryStore {
    fn save(&self, record: AssessmentRecord) -> BoxFuture<'_, Result<SavedRecord, CollaboratorError>> {
        Box::pin(async move {
            let saved = SavedRecord {
                id: Uuid::new_v4(),
                record,
            };
            self.records.lock().await.push(saved.clone());
            tracing::debug!(id = %saved.id, "record stored in memory");
            Ok(saved)
        })
    }

    fn list(&self) -> BoxFuture<'_, Result<Vec<SavedRecord>, CollaboratorError>> {
        Box::pin(async move { Ok(self.records.lock().await.clone()) })
    }

    fn delete(&self, id: Uuid) -> BoxFuture<'_, Result<SavedRecord, CollaboratorError>> {
        Box::pin(async move {
            let mut records = self.records.lock().await;
            let position = records
                .iter()
                .position(|r| r.id == id)
                .ok_or(CollaboratorError::NotFound(id))?;
            Ok(records.remove(position))
        })
    }

    fn clear(&self) -> BoxFuture<'_, Result<usize, CollaboratorError>> {
        Box::pin(async move {
            let mut records = self.records.lock().await;
            let count = records.len();
            records.clear();
            Ok(count)
        })
    }
}
