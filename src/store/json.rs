//! JSON file store kept under the configured state directory.
//!
//! Layout:
//! - `steps.json`: array of workflow steps
//! - `progress.json`: array of patient progress records
//! - `inquiries/<uuid>.json`: one file per submitted inquiry

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use super::{InquirySink, ProgressStore, StepStore, StoreError};
use crate::intake::InquiryRecord;
use crate::progress::{PatientId, PatientProgress};
use crate::workflow::{StepId, WorkflowStep};

const STEPS_FILE: &str = "steps.json";
const PROGRESS_FILE: &str = "progress.json";
const INQUIRIES_DIR: &str = "inquiries";

/// File-backed store implementing every collaborator trait
#[derive(Debug)]
pub struct JsonFileStore {
    root: PathBuf,
    /// Serialises read-modify-write cycles on the shared files
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn read_list<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>, StoreError> {
        let path = self.root.join(name);
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_json<T: Serialize + ?Sized>(
        &self,
        path: &Path,
        value: &T,
    ) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let contents = serde_json::to_string_pretty(value)?;
        // Write to a sibling file first so a crash never leaves a torn file
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, contents).await?;
        tokio::fs::rename(&tmp, path).await?;
        debug!(path = %path.display(), "wrote store file");
        Ok(())
    }
}

#[async_trait]
impl StepStore for JsonFileStore {
    async fn load_steps(&self) -> Result<Vec<WorkflowStep>, StoreError> {
        let mut steps: Vec<WorkflowStep> = self.read_list(STEPS_FILE).await?;
        steps.sort_by_key(|s| s.step_number);
        Ok(steps)
    }

    async fn save_step(&self, step: &WorkflowStep) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut steps: Vec<WorkflowStep> = self.read_list(STEPS_FILE).await?;
        match steps.iter_mut().find(|s| s.id == step.id) {
            Some(existing) => *existing = step.clone(),
            None => steps.push(step.clone()),
        }
        steps.sort_by_key(|s| s.step_number);
        self.write_json(&self.root.join(STEPS_FILE), &steps).await
    }

    async fn delete_step(&self, id: StepId) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut steps: Vec<WorkflowStep> = self.read_list(STEPS_FILE).await?;
        steps.retain(|s| s.id != id);
        self.write_json(&self.root.join(STEPS_FILE), &steps).await
    }
}

#[async_trait]
impl ProgressStore for JsonFileStore {
    async fn load_progress(
        &self,
        patient_id: &PatientId,
    ) -> Result<Option<PatientProgress>, StoreError> {
        let records: Vec<PatientProgress> = self.read_list(PROGRESS_FILE).await?;
        Ok(records.into_iter().find(|p| &p.patient_id == patient_id))
    }

    async fn save_progress(&self, progress: &PatientProgress) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut records: Vec<PatientProgress> = self.read_list(PROGRESS_FILE).await?;
        match records
            .iter_mut()
            .find(|p| p.patient_id == progress.patient_id)
        {
            Some(existing) => *existing = progress.clone(),
            None => records.push(progress.clone()),
        }
        self.write_json(&self.root.join(PROGRESS_FILE), &records)
            .await
    }

    async fn list_progress(&self) -> Result<Vec<PatientProgress>, StoreError> {
        self.read_list(PROGRESS_FILE).await
    }
}

#[async_trait]
impl InquirySink for JsonFileStore {
    async fn record_inquiry(&self, inquiry: &InquiryRecord) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        let path = self.root.join(INQUIRIES_DIR).join(format!("{id}.json"));
        self.write_json(&path, inquiry).await?;
        Ok(id)
    }
}
