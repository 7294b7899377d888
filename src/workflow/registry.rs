//! Ordered registry of workflow steps.
//!
//! The registry is the single source of truth for step ordering. Step numbers
//! are always a dense `1..=N` sequence matching list position. Every mutation
//! is written through the [`StepStore`] before it is committed in memory, so a
//! rejected write leaves the registry exactly as it was.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::defaults::default_steps;
use super::step::{MoveDirection, Phase, StepId, StepUpdate, WorkflowStep};
use crate::error::{JourneyError, Result};
use crate::store::StepStore;

/// Title used when a step is appended without one
pub const DEFAULT_STEP_TITLE: &str = "New Step";
/// Description used when a step is appended without one
pub const DEFAULT_STEP_DESCRIPTION: &str = "Step description";

pub struct StepRegistry {
    /// Steps in position order; `steps[i].step_number == i + 1`
    steps: Vec<WorkflowStep>,
    store: Arc<dyn StepStore>,
}

impl std::fmt::Debug for StepRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepRegistry")
            .field("steps", &self.steps)
            .finish_non_exhaustive()
    }
}

impl StepRegistry {
    /// Empty registry writing through to `store`
    pub fn new(store: Arc<dyn StepStore>) -> Self {
        Self {
            steps: Vec::new(),
            store,
        }
    }

    /// Load the registry from its store.
    ///
    /// A persisted ordering with gaps or duplicate numbers is repaired by
    /// renumbering in stored order, and the repaired numbers are written back.
    pub async fn load(store: Arc<dyn StepStore>) -> Result<Self> {
        let mut steps = store.load_steps().await?;
        steps.sort_by_key(|s| s.step_number);

        let mut repaired = Vec::new();
        for (index, step) in steps.iter_mut().enumerate() {
            let expected = position_number(index);
            if step.step_number != expected {
                step.step_number = expected;
                repaired.push(step.clone());
            }
        }
        if !repaired.is_empty() {
            warn!(
                "Repairing {} step numbers loaded from store",
                repaired.len()
            );
            for step in &repaired {
                store.save_step(step).await?;
            }
        }

        info!("Loaded {} workflow steps", steps.len());
        Ok(Self { steps, store })
    }

    /// Append the default journey when the registry is empty.
    ///
    /// Returns the number of steps added.
    pub async fn seed_defaults(&mut self) -> Result<usize> {
        if !self.steps.is_empty() {
            debug!("Registry already has steps, skipping default seed");
            return Ok(0);
        }
        let defaults = default_steps();
        let count = defaults.len();
        for (title, description, phase) in defaults {
            self.append(title, description, phase).await?;
        }
        info!("Seeded {} default workflow steps", count);
        Ok(count)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn get(&self, id: StepId) -> Option<&WorkflowStep> {
        self.steps.iter().find(|s| s.id == id)
    }

    pub fn contains(&self, id: StepId) -> bool {
        self.get(id).is_some()
    }

    /// Every step, ordered by step number
    pub fn list_all(&self) -> Vec<WorkflowStep> {
        self.steps.clone()
    }

    /// Active steps only, ordered by step number
    pub fn list_active(&self) -> Vec<WorkflowStep> {
        self.steps.iter().filter(|s| s.is_active).cloned().collect()
    }

    /// Borrowing view used by the progress tracker
    pub fn steps(&self) -> &[WorkflowStep] {
        &self.steps
    }

    /// First active step in order, where newly admitted patients start
    pub fn first_active(&self) -> Option<&WorkflowStep> {
        self.steps.iter().find(|s| s.is_active)
    }

    /// Nearest active step after `id`, skipping inactive ones
    pub fn next_active_after(&self, id: StepId) -> Result<Option<&WorkflowStep>> {
        let index = self.index_of(id)?;
        Ok(self.steps[index + 1..].iter().find(|s| s.is_active))
    }

    /// Nearest active step before `id`, skipping inactive ones
    pub fn previous_active_before(&self, id: StepId) -> Result<Option<&WorkflowStep>> {
        let index = self.index_of(id)?;
        Ok(self.steps[..index].iter().rev().find(|s| s.is_active))
    }

    /// Create an active step at the end of the journey
    pub async fn append(
        &mut self,
        title: impl Into<String>,
        description: impl Into<String>,
        phase: Phase,
    ) -> Result<WorkflowStep> {
        let step = WorkflowStep {
            id: StepId::new(),
            step_number: position_number(self.steps.len()),
            title: title.into(),
            description: description.into(),
            phase,
            is_active: true,
        };

        self.store.save_step(&step).await?;
        self.steps.push(step.clone());

        info!(step_id = %step.id, step_number = step.step_number, "Appended workflow step");
        Ok(step)
    }

    /// Append a step with the placeholder title, description and `Initial` phase
    pub async fn append_default(&mut self) -> Result<WorkflowStep> {
        self.append(DEFAULT_STEP_TITLE, DEFAULT_STEP_DESCRIPTION, Phase::Initial)
            .await
    }

    /// Edit title, description or phase. Number and id never change here.
    pub async fn update(&mut self, id: StepId, update: StepUpdate) -> Result<WorkflowStep> {
        let index = self.index_of(id)?;
        let mut candidate = self.steps[index].clone();
        update.apply_to(&mut candidate);

        self.store.save_step(&candidate).await?;
        self.steps[index] = candidate.clone();

        debug!(step_id = %id, "Updated workflow step");
        Ok(candidate)
    }

    /// Flip the active flag without touching ordering
    pub async fn toggle_active(&mut self, id: StepId) -> Result<WorkflowStep> {
        let index = self.index_of(id)?;
        let mut candidate = self.steps[index].clone();
        candidate.is_active = !candidate.is_active;

        self.store.save_step(&candidate).await?;
        self.steps[index] = candidate.clone();

        info!(step_id = %id, active = candidate.is_active, "Toggled workflow step");
        Ok(candidate)
    }

    /// Delete a step and close the gap it leaves.
    ///
    /// Every step after it moves up by exactly one; earlier steps are untouched.
    pub async fn remove(&mut self, id: StepId) -> Result<WorkflowStep> {
        let index = self.index_of(id)?;

        let mut candidate = self.steps.clone();
        let removed = candidate.remove(index);
        let shifted: Vec<WorkflowStep> = candidate[index..]
            .iter_mut()
            .map(|step| {
                step.step_number -= 1;
                step.clone()
            })
            .collect();

        self.store.delete_step(id).await?;
        for step in &shifted {
            if let Err(e) = self.store.save_step(step).await {
                self.restore(&self.steps[index..]).await;
                return Err(e.into());
            }
        }
        self.steps = candidate;

        info!(
            step_id = %id,
            renumbered = shifted.len(),
            "Removed workflow step"
        );
        Ok(removed)
    }

    /// Swap a step with its neighbour in `direction`.
    ///
    /// Moving the first step up or the last step down changes nothing and is
    /// not an error. Returns the full ordered list after the move.
    pub async fn move_step(
        &mut self,
        id: StepId,
        direction: MoveDirection,
    ) -> Result<Vec<WorkflowStep>> {
        let index = self.index_of(id)?;
        let target = match direction {
            MoveDirection::Up => index.checked_sub(1),
            MoveDirection::Down => Some(index + 1).filter(|t| *t < self.steps.len()),
        };
        let Some(target) = target else {
            debug!(step_id = %id, ?direction, "Step already at boundary, move ignored");
            return Ok(self.list_all());
        };

        let mut candidate = self.steps.clone();
        candidate.swap(index, target);
        candidate[index].step_number = position_number(index);
        candidate[target].step_number = position_number(target);

        self.store.save_step(&candidate[index]).await?;
        if let Err(e) = self.store.save_step(&candidate[target]).await {
            let originals = [self.steps[index].clone(), self.steps[target].clone()];
            self.restore(&originals).await;
            return Err(e.into());
        }
        self.steps = candidate;

        info!(step_id = %id, ?direction, "Moved workflow step");
        Ok(self.list_all())
    }

    /// Write `steps` back as they were before a multi-write change failed
    async fn restore(&self, steps: &[WorkflowStep]) {
        for step in steps {
            if let Err(e) = self.store.save_step(step).await {
                warn!(step_id = %step.id, "Failed to restore step after partial write: {}", e);
            }
        }
    }

    fn index_of(&self, id: StepId) -> Result<usize> {
        self.steps
            .iter()
            .position(|s| s.id == id)
            .ok_or(JourneyError::StepNotFound(id))
    }
}

/// Step number for a zero-based list position
fn position_number(index: usize) -> u32 {
    u32::try_from(index + 1).unwrap_or(u32::MAX)
}
