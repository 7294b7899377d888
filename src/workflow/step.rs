//! Workflow step definitions

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a workflow step; survives reorders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(Uuid);

impl StepId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for StepId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for StepId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for StepId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Coarse grouping of steps along the patient journey
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    Initial,
    Planning,
    Travel,
    Treatment,
    #[serde(rename = "Follow-up")]
    FollowUp,
}

impl Phase {
    /// All phases in journey order
    pub fn all() -> &'static [Phase] {
        &[
            Phase::Initial,
            Phase::Planning,
            Phase::Travel,
            Phase::Treatment,
            Phase::FollowUp,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Phase::Initial => "Initial",
            Phase::Planning => "Planning",
            Phase::Travel => "Travel",
            Phase::Treatment => "Treatment",
            Phase::FollowUp => "Follow-up",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error for an unrecognised phase label
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown phase '{0}'")]
pub struct UnknownPhase(pub String);

impl FromStr for Phase {
    type Err = UnknownPhase;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Phase::all()
            .iter()
            .copied()
            .find(|p| p.label().eq_ignore_ascii_case(wanted))
            .or_else(|| {
                // "followup" / "follow_up" as typed in config files
                let squashed: String = wanted
                    .chars()
                    .filter(char::is_ascii_alphanumeric)
                    .collect();
                squashed
                    .eq_ignore_ascii_case("followup")
                    .then_some(Phase::FollowUp)
            })
            .ok_or_else(|| UnknownPhase(s.to_string()))
    }
}

/// One ordinal unit of the patient journey
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowStep {
    pub id: StepId,
    /// 1-based position; dense across the registry
    pub step_number: u32,
    pub title: String,
    pub description: String,
    pub phase: Phase,
    pub is_active: bool,
}

/// Editable fields of a step; `None` leaves the field as is
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub phase: Option<Phase>,
}

impl StepUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.phase.is_none()
    }

    pub(crate) fn apply_to(self, step: &mut WorkflowStep) {
        if let Some(title) = self.title {
            step.title = title;
        }
        if let Some(description) = self.description {
            step.description = description;
        }
        if let Some(phase) = self.phase {
            step.phase = phase;
        }
    }
}

/// Direction for reordering a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Up,
    Down,
}
