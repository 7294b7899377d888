//! Persistence collaborators for the journey components.
//!
//! The components never talk to a backing store directly; they are handed
//! implementations of these traits:
//! - [`StepStore`]: workflow step definitions
//! - [`ProgressStore`]: per-patient progress records
//! - [`InquirySink`]: destination for completed intake inquiries
//!
//! [`MemoryStore`] backs tests and ephemeral servers, [`JsonFileStore`] keeps
//! state in the configured state directory.

mod json;
mod memory;
mod retry;

pub use json::JsonFileStore;
pub use memory::MemoryStore;
pub use retry::RetryingSink;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::intake::InquiryRecord;
use crate::progress::{PatientId, PatientProgress};
use crate::workflow::{StepId, WorkflowStep};

/// Errors raised by a persistence collaborator
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("write rejected: {0}")]
    Rejected(String),
}

/// Storage for workflow step definitions
#[async_trait]
pub trait StepStore: Send + Sync {
    /// All steps ordered by step number
    async fn load_steps(&self) -> Result<Vec<WorkflowStep>, StoreError>;

    /// Insert or replace a step by id
    async fn save_step(&self, step: &WorkflowStep) -> Result<(), StoreError>;

    /// Delete a step; deleting an absent id is not an error
    async fn delete_step(&self, id: StepId) -> Result<(), StoreError>;
}

/// Storage for patient progress records
#[async_trait]
pub trait ProgressStore: Send + Sync {
    async fn load_progress(
        &self,
        patient_id: &PatientId,
    ) -> Result<Option<PatientProgress>, StoreError>;

    async fn save_progress(&self, progress: &PatientProgress) -> Result<(), StoreError>;

    /// Every stored record, for the journey board
    async fn list_progress(&self) -> Result<Vec<PatientProgress>, StoreError>;
}

/// Destination for submitted intake inquiries
#[async_trait]
pub trait InquirySink: Send + Sync {
    /// Record an inquiry and return its id
    async fn record_inquiry(&self, inquiry: &InquiryRecord) -> Result<Uuid, StoreError>;
}

#[async_trait]
impl<T: InquirySink + ?Sized> InquirySink for std::sync::Arc<T> {
    async fn record_inquiry(&self, inquiry: &InquiryRecord) -> Result<Uuid, StoreError> {
        (**self).record_inquiry(inquiry).await
    }
}
