//! Patient progression through the workflow.

mod board;
mod tracker;

pub use board::{BoardColumn, JourneyBoard};
pub use tracker::PatientProgressTracker;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflow::StepId;

/// Reference to a patient record owned by the patient system
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatientId(String);

impl PatientId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PatientId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Where a patient currently sits in the journey
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientProgress {
    pub patient_id: PatientId,
    /// May point at an inactive step; the patient stays there until moved
    pub current_step_id: StepId,
    pub updated_at: DateTime<Utc>,
}

impl PatientProgress {
    pub fn new(patient_id: PatientId, current_step_id: StepId) -> Self {
        Self {
            patient_id,
            current_step_id,
            updated_at: Utc::now(),
        }
    }

    /// Copy of this record moved to `step_id`
    pub(crate) fn moved_to(&self, step_id: StepId) -> Self {
        Self::new(self.patient_id.clone(), step_id)
    }
}
