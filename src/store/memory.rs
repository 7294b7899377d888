//! In-memory collaborator implementations

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{InquirySink, ProgressStore, StepStore, StoreError};
use crate::intake::InquiryRecord;
use crate::progress::{PatientId, PatientProgress};
use crate::workflow::{StepId, WorkflowStep};

/// Volatile store implementing every collaborator trait.
///
/// Writes can be switched to fail with [`MemoryStore::set_fail_writes`] to
/// exercise persistence failure paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    steps: RwLock<Vec<WorkflowStep>>,
    progress: RwLock<HashMap<PatientId, PatientProgress>>,
    inquiries: RwLock<Vec<(Uuid, InquiryRecord)>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with steps, as if loaded from a backing store
    pub fn with_steps(steps: Vec<WorkflowStep>) -> Self {
        Self {
            steps: RwLock::new(steps),
            ..Self::default()
        }
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Inquiries recorded so far, in arrival order
    pub async fn inquiries(&self) -> Vec<(Uuid, InquiryRecord)> {
        self.inquiries.read().await.clone()
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(StoreError::Rejected("memory store is read-only".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl StepStore for MemoryStore {
    async fn load_steps(&self) -> Result<Vec<WorkflowStep>, StoreError> {
        let mut steps = self.steps.read().await.clone();
        steps.sort_by_key(|s| s.step_number);
        Ok(steps)
    }

    async fn save_step(&self, step: &WorkflowStep) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut steps = self.steps.write().await;
        match steps.iter_mut().find(|s| s.id == step.id) {
            Some(existing) => *existing = step.clone(),
            None => steps.push(step.clone()),
        }
        Ok(())
    }

    async fn delete_step(&self, id: StepId) -> Result<(), StoreError> {
        self.check_writable()?;
        self.steps.write().await.retain(|s| s.id != id);
        Ok(())
    }
}

#[async_trait]
impl ProgressStore for MemoryStore {
    async fn load_progress(
        &self,
        patient_id: &PatientId,
    ) -> Result<Option<PatientProgress>, StoreError> {
        Ok(self.progress.read().await.get(patient_id).cloned())
    }

    async fn save_progress(&self, progress: &PatientProgress) -> Result<(), StoreError> {
        self.check_writable()?;
        self.progress
            .write()
            .await
            .insert(progress.patient_id.clone(), progress.clone());
        Ok(())
    }

    async fn list_progress(&self) -> Result<Vec<PatientProgress>, StoreError> {
        Ok(self.progress.read().await.values().cloned().collect())
    }
}

#[async_trait]
impl InquirySink for MemoryStore {
    async fn record_inquiry(&self, inquiry: &InquiryRecord) -> Result<Uuid, StoreError> {
        self.check_writable()?;
        let id = Uuid::new_v4();
        self.inquiries.write().await.push((id, inquiry.clone()));
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::Phase;

    fn step(number: u32, title: &str) -> WorkflowStep {
        WorkflowStep {
            id: StepId::new(),
            step_number: number,
            title: title.to_string(),
            description: String::new(),
            phase: Phase::Initial,
            is_active: true,
        }
    }

    #[tokio::test]
    async fn test_load_steps_orders_by_step_number() {
        let store = MemoryStore::with_steps(vec![step(2, "b"), step(1, "a")]);
        let steps = store.load_steps().await.unwrap();
        assert_eq!(steps[0].title, "a");
        assert_eq!(steps[1].title, "b");
    }

    #[tokio::test]
    async fn test_save_step_replaces_by_id() {
        let store = MemoryStore::new();
        let mut s = step(1, "a");
        store.save_step(&s).await.unwrap();
        s.title = "renamed".to_string();
        store.save_step(&s).await.unwrap();

        let steps = store.load_steps().await.unwrap();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].title, "renamed");
    }

    #[tokio::test]
    async fn test_fail_writes_rejects_saves() {
        let store = MemoryStore::new();
        store.set_fail_writes(true);
        let result = store.save_step(&step(1, "a")).await;
        assert!(matches!(result, Err(StoreError::Rejected(_))));
        assert!(store.load_steps().await.unwrap().is_empty());
    }
}
