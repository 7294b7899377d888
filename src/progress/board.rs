//! Journey board: patients grouped under the step they currently sit on.

use std::collections::HashMap;

use serde::Serialize;

use super::PatientProgress;
use crate::workflow::{StepId, WorkflowStep};

/// One column of the board
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardColumn {
    pub step: WorkflowStep,
    /// Patients on this step, longest-waiting first
    pub patients: Vec<PatientProgress>,
}

/// Snapshot of every patient's position, one column per step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JourneyBoard {
    /// Every step in step-number order, including inactive ones
    pub columns: Vec<BoardColumn>,
    /// Records pointing at steps no longer in the registry
    pub unplaced: Vec<PatientProgress>,
    pub total_patients: usize,
}

impl JourneyBoard {
    pub fn build(steps: &[WorkflowStep], records: &[PatientProgress]) -> Self {
        let mut by_step: HashMap<StepId, Vec<PatientProgress>> = HashMap::new();
        for record in records {
            by_step
                .entry(record.current_step_id)
                .or_default()
                .push(record.clone());
        }

        let columns = steps
            .iter()
            .map(|step| {
                let mut patients = by_step.remove(&step.id).unwrap_or_default();
                patients.sort_by(|a, b| {
                    a.updated_at
                        .cmp(&b.updated_at)
                        .then_with(|| a.patient_id.cmp(&b.patient_id))
                });
                BoardColumn {
                    step: step.clone(),
                    patients,
                }
            })
            .collect();

        let mut unplaced: Vec<PatientProgress> = by_step.into_values().flatten().collect();
        unplaced.sort_by(|a, b| a.patient_id.cmp(&b.patient_id));

        Self {
            columns,
            unplaced,
            total_patients: records.len(),
        }
    }

    /// Column for `step_id`, if the step exists
    pub fn column(&self, step_id: StepId) -> Option<&BoardColumn> {
        self.columns.iter().find(|c| c.step.id == step_id)
    }
}
