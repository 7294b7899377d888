//! Per-patient position tracking.
//!
//! Advancing and retreating only consider active steps. A patient parked on a
//! step that was deactivated after they arrived stays there: their current
//! step is not migrated, and the next move steps off it normally.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use super::{PatientId, PatientProgress};
use crate::error::{JourneyError, Result};
use crate::store::ProgressStore;
use crate::workflow::{Phase, StepId, StepRegistry, WorkflowStep};

pub struct PatientProgressTracker {
    records: HashMap<PatientId, PatientProgress>,
    store: Arc<dyn ProgressStore>,
}

impl std::fmt::Debug for PatientProgressTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatientProgressTracker")
            .field("records", &self.records.len())
            .finish_non_exhaustive()
    }
}

impl PatientProgressTracker {
    /// Tracker with no cached records; records are pulled from `store` on first use
    pub fn new(store: Arc<dyn ProgressStore>) -> Self {
        Self {
            records: HashMap::new(),
            store,
        }
    }

    /// Tracker pre-populated with every record in `store`
    pub async fn load(store: Arc<dyn ProgressStore>) -> Result<Self> {
        let records: HashMap<PatientId, PatientProgress> = store
            .list_progress()
            .await?
            .into_iter()
            .map(|p| (p.patient_id.clone(), p))
            .collect();
        info!("Loaded progress for {} patients", records.len());
        Ok(Self { records, store })
    }

    /// Cached records, ordered by patient id
    pub fn list(&self) -> Vec<PatientProgress> {
        let mut records: Vec<PatientProgress> = self.records.values().cloned().collect();
        records.sort_by(|a, b| a.patient_id.cmp(&b.patient_id));
        records
    }

    /// Patients whose current step is `step_id`, among cached records
    pub fn patients_on(&self, step_id: StepId) -> Vec<PatientId> {
        let mut patients: Vec<PatientId> = self
            .records
            .values()
            .filter(|p| p.current_step_id == step_id)
            .map(|p| p.patient_id.clone())
            .collect();
        patients.sort();
        patients
    }

    /// Current progress record, consulting the store if not cached
    pub async fn progress(&mut self, patient_id: &PatientId) -> Result<PatientProgress> {
        if let Some(progress) = self.records.get(patient_id) {
            return Ok(progress.clone());
        }
        let progress = self
            .store
            .load_progress(patient_id)
            .await?
            .ok_or_else(|| JourneyError::PatientNotFound(patient_id.clone()))?;
        debug!(patient = %patient_id, "Loaded progress record from store");
        self.records.insert(patient_id.clone(), progress.clone());
        Ok(progress)
    }

    /// Place a patient on any existing step, active or not
    pub async fn assign(
        &mut self,
        registry: &StepRegistry,
        patient_id: PatientId,
        step_id: StepId,
    ) -> Result<PatientProgress> {
        if !registry.contains(step_id) {
            return Err(JourneyError::StepNotFound(step_id));
        }
        let progress = PatientProgress::new(patient_id, step_id);
        self.commit(progress).await
    }

    /// Start a new patient on the first active step
    pub async fn admit(
        &mut self,
        registry: &StepRegistry,
        patient_id: PatientId,
    ) -> Result<PatientProgress> {
        match self.progress(&patient_id).await {
            Ok(_) => {
                return Err(JourneyError::InvalidTransition(format!(
                    "patient '{}' is already in the journey",
                    patient_id
                )))
            }
            Err(JourneyError::PatientNotFound(_)) => {}
            Err(e) => return Err(e),
        }
        let first = registry.first_active().ok_or_else(|| {
            JourneyError::InvalidTransition("no active workflow steps to admit into".to_string())
        })?;
        let progress = PatientProgress::new(patient_id, first.id);
        self.commit(progress).await
    }

    /// Move to the next active step in step-number order
    pub async fn advance(
        &mut self,
        registry: &StepRegistry,
        patient_id: &PatientId,
    ) -> Result<PatientProgress> {
        let current = self.progress(patient_id).await?;
        let next = registry
            .next_active_after(current.current_step_id)?
            .ok_or(JourneyError::NoNextStep)?;
        self.commit(current.moved_to(next.id)).await
    }

    /// Move to the previous active step in step-number order
    pub async fn retreat(
        &mut self,
        registry: &StepRegistry,
        patient_id: &PatientId,
    ) -> Result<PatientProgress> {
        let current = self.progress(patient_id).await?;
        let previous = registry
            .previous_active_before(current.current_step_id)?
            .ok_or(JourneyError::NoPreviousStep)?;
        self.commit(current.moved_to(previous.id)).await
    }

    /// The step the patient currently sits on
    pub async fn current_step(
        &mut self,
        registry: &StepRegistry,
        patient_id: &PatientId,
    ) -> Result<WorkflowStep> {
        let current = self.progress(patient_id).await?;
        registry
            .get(current.current_step_id)
            .cloned()
            .ok_or(JourneyError::StepNotFound(current.current_step_id))
    }

    pub async fn current_phase(
        &mut self,
        registry: &StepRegistry,
        patient_id: &PatientId,
    ) -> Result<Phase> {
        Ok(self.current_step(registry, patient_id).await?.phase)
    }

    async fn commit(&mut self, progress: PatientProgress) -> Result<PatientProgress> {
        self.store.save_progress(&progress).await?;
        info!(
            patient = %progress.patient_id,
            step_id = %progress.current_step_id,
            "Patient moved"
        );
        self.records
            .insert(progress.patient_id.clone(), progress.clone());
        Ok(progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::store::MemoryStore;

    struct Fixture {
        store: Arc<MemoryStore>,
        registry: StepRegistry,
        tracker: PatientProgressTracker,
        steps: Vec<StepId>,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let mut registry = StepRegistry::new(store.clone());
        let mut steps = Vec::new();
        for (title, phase) in [
            ("A", Phase::Initial),
            ("B", Phase::Planning),
            ("C", Phase::Travel),
            ("D", Phase::Treatment),
        ] {
            steps.push(registry.append(title, "", phase).await.unwrap().id);
        }
        let tracker = PatientProgressTracker::new(store.clone());
        Fixture {
            store,
            registry,
            tracker,
            steps,
        }
    }

    fn patient() -> PatientId {
        PatientId::new("patient-1")
    }

    #[tokio::test]
    async fn test_assign_unknown_step_fails() {
        let mut f = fixture().await;
        let err = f
            .tracker
            .assign(&f.registry, patient(), StepId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, JourneyError::StepNotFound(_)));
    }

    #[tokio::test]
    async fn test_assign_to_inactive_step_is_allowed() {
        let mut f = fixture().await;
        f.registry.toggle_active(f.steps[2]).await.unwrap();
        let progress = f
            .tracker
            .assign(&f.registry, patient(), f.steps[2])
            .await
            .unwrap();
        assert_eq!(progress.current_step_id, f.steps[2]);
    }

    #[tokio::test]
    async fn test_advance_then_retreat_returns_to_start() {
        let mut f = fixture().await;
        f.tracker
            .assign(&f.registry, patient(), f.steps[1])
            .await
            .unwrap();

        let advanced = f.tracker.advance(&f.registry, &patient()).await.unwrap();
        assert_eq!(advanced.current_step_id, f.steps[2]);
        let back = f.tracker.retreat(&f.registry, &patient()).await.unwrap();
        assert_eq!(back.current_step_id, f.steps[1]);
    }

    #[tokio::test]
    async fn test_boundaries_are_invalid_transitions() {
        let mut f = fixture().await;
        f.tracker
            .assign(&f.registry, patient(), f.steps[0])
            .await
            .unwrap();
        let err = f.tracker.retreat(&f.registry, &patient()).await.unwrap_err();
        assert!(matches!(err, JourneyError::NoPreviousStep));
        assert_eq!(err.kind(), ErrorKind::InvalidTransition);

        f.tracker
            .assign(&f.registry, patient(), f.steps[3])
            .await
            .unwrap();
        let err = f.tracker.advance(&f.registry, &patient()).await.unwrap_err();
        assert!(matches!(err, JourneyError::NoNextStep));
    }

    #[tokio::test]
    async fn test_advance_skips_inactive_steps() {
        let mut f = fixture().await;
        f.tracker
            .assign(&f.registry, patient(), f.steps[0])
            .await
            .unwrap();
        f.registry.toggle_active(f.steps[1]).await.unwrap();
        f.registry.toggle_active(f.steps[2]).await.unwrap();

        let advanced = f.tracker.advance(&f.registry, &patient()).await.unwrap();
        assert_eq!(advanced.current_step_id, f.steps[3]);
        let back = f.tracker.retreat(&f.registry, &patient()).await.unwrap();
        assert_eq!(back.current_step_id, f.steps[0]);
    }

    #[tokio::test]
    async fn test_deactivating_current_step_leaves_patient_in_place() {
        let mut f = fixture().await;
        f.tracker
            .assign(&f.registry, patient(), f.steps[1])
            .await
            .unwrap();
        f.registry.toggle_active(f.steps[1]).await.unwrap();

        let progress = f.tracker.progress(&patient()).await.unwrap();
        assert_eq!(progress.current_step_id, f.steps[1]);
        assert_eq!(
            f.tracker.current_phase(&f.registry, &patient()).await.unwrap(),
            Phase::Planning
        );

        let advanced = f.tracker.advance(&f.registry, &patient()).await.unwrap();
        assert_eq!(advanced.current_step_id, f.steps[2]);
    }

    #[tokio::test]
    async fn test_unknown_patient_is_not_found() {
        let mut f = fixture().await;
        let err = f
            .tracker
            .current_phase(&f.registry, &patient())
            .await
            .unwrap_err();
        assert!(matches!(err, JourneyError::PatientNotFound(_)));
        assert!(f.tracker.advance(&f.registry, &patient()).await.is_err());
    }

    #[tokio::test]
    async fn test_admit_starts_on_first_active_step() {
        let mut f = fixture().await;
        f.registry.toggle_active(f.steps[0]).await.unwrap();

        let progress = f.tracker.admit(&f.registry, patient()).await.unwrap();
        assert_eq!(progress.current_step_id, f.steps[1]);

        let err = f.tracker.admit(&f.registry, patient()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidTransition);
    }

    #[tokio::test]
    async fn test_admit_without_active_steps_fails() {
        let store = Arc::new(MemoryStore::new());
        let registry = StepRegistry::new(store.clone());
        let mut tracker = PatientProgressTracker::new(store);
        let err = tracker.admit(&registry, patient()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidTransition);
    }

    #[tokio::test]
    async fn test_failed_save_keeps_previous_position() {
        let mut f = fixture().await;
        f.tracker
            .assign(&f.registry, patient(), f.steps[0])
            .await
            .unwrap();
        f.store.set_fail_writes(true);

        let err = f.tracker.advance(&f.registry, &patient()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PersistenceFailed);
        let progress = f.tracker.progress(&patient()).await.unwrap();
        assert_eq!(progress.current_step_id, f.steps[0]);
    }

    #[tokio::test]
    async fn test_records_are_loaded_lazily_from_store() {
        let f = fixture().await;
        let saved = PatientProgress::new(patient(), f.steps[2]);
        f.store.save_progress(&saved).await.unwrap();

        let mut tracker = PatientProgressTracker::new(f.store.clone());
        assert!(tracker.list().is_empty());
        assert_eq!(
            tracker.current_phase(&f.registry, &patient()).await.unwrap(),
            Phase::Travel
        );
        assert_eq!(tracker.list().len(), 1);

        let loaded = PatientProgressTracker::load(f.store.clone()).await.unwrap();
        assert_eq!(loaded.list(), vec![saved]);
        assert_eq!(loaded.patients_on(f.steps[2]), vec![patient()]);
        assert!(loaded.patients_on(f.steps[0]).is_empty());
    }
}
