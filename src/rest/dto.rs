//! Data Transfer Objects for the REST API.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::intake::{
    Accommodation, BudgetRange, Choice, Gender, IntakeReview, IntakeStage, IntakeWizard, Urgency,
    WizardState,
};
use crate::progress::{BoardColumn, JourneyBoard, PatientProgress};
use crate::workflow::WorkflowStep;

// =============================================================================
// Health DTOs
// =============================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

// =============================================================================
// Workflow step DTOs
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StepResponse {
    pub id: String,
    pub step_number: u32,
    pub title: String,
    pub description: String,
    /// Initial, Planning, Travel, Treatment or Follow-up
    pub phase: String,
    pub is_active: bool,
}

impl From<&WorkflowStep> for StepResponse {
    fn from(step: &WorkflowStep) -> Self {
        Self {
            id: step.id.to_string(),
            step_number: step.step_number,
            title: step.title.clone(),
            description: step.description.clone(),
            phase: step.phase.label().to_string(),
            is_active: step.is_active,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListStepsQuery {
    /// Include inactive steps (staff only)
    #[serde(default)]
    pub all: bool,
}

/// Request to append a step; omitted fields take the new-step defaults
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateStepRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub phase: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateStepRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub phase: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MoveStepRequest {
    /// "up" or "down"
    pub direction: String,
}

// =============================================================================
// Patient progress DTOs
// =============================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProgressResponse {
    pub patient_id: String,
    pub current_step_id: String,
    pub step_number: u32,
    pub step_title: String,
    pub phase: String,
    /// False when the patient is parked on a deactivated step
    pub step_is_active: bool,
    pub updated_at: String,
}

impl ProgressResponse {
    pub fn new(progress: &PatientProgress, step: &WorkflowStep) -> Self {
        Self {
            patient_id: progress.patient_id.to_string(),
            current_step_id: progress.current_step_id.to_string(),
            step_number: step.step_number,
            step_title: step.title.clone(),
            phase: step.phase.label().to_string(),
            step_is_active: step.is_active,
            updated_at: progress.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AssignStepRequest {
    pub step_id: String,
}

// =============================================================================
// Journey board DTOs
// =============================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BoardPatientCard {
    pub patient_id: String,
    pub updated_at: String,
}

impl From<&PatientProgress> for BoardPatientCard {
    fn from(progress: &PatientProgress) -> Self {
        Self {
            patient_id: progress.patient_id.to_string(),
            updated_at: progress.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BoardColumnResponse {
    pub step: StepResponse,
    pub patients: Vec<BoardPatientCard>,
}

impl From<&BoardColumn> for BoardColumnResponse {
    fn from(column: &BoardColumn) -> Self {
        Self {
            step: StepResponse::from(&column.step),
            patients: column.patients.iter().map(BoardPatientCard::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BoardResponse {
    pub columns: Vec<BoardColumnResponse>,
    /// Patients whose step no longer exists
    pub unplaced: Vec<BoardPatientCard>,
    pub total_patients: usize,
    pub last_updated: String,
}

impl From<&JourneyBoard> for BoardResponse {
    fn from(board: &JourneyBoard) -> Self {
        Self {
            columns: board.columns.iter().map(BoardColumnResponse::from).collect(),
            unplaced: board.unplaced.iter().map(BoardPatientCard::from).collect(),
            total_patients: board.total_patients,
            last_updated: chrono::Utc::now().to_rfc3339(),
        }
    }
}

// =============================================================================
// Intake DTOs
// =============================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubmitStageRequest {
    /// medical, personal, preferences or review
    pub stage: String,
    /// Field name to value; ignored on the review stage
    #[serde(default)]
    #[schema(value_type = Object)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReviewEntryResponse {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReviewSectionResponse {
    pub title: String,
    pub entries: Vec<ReviewEntryResponse>,
}

fn review_sections(review: &IntakeReview) -> Vec<ReviewSectionResponse> {
    review
        .sections
        .iter()
        .map(|s| ReviewSectionResponse {
            title: s.title.clone(),
            entries: s
                .entries
                .iter()
                .map(|e| ReviewEntryResponse {
                    label: e.label.clone(),
                    value: e.value.clone(),
                })
                .collect(),
        })
        .collect()
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IntakeSessionResponse {
    pub session_id: String,
    /// Current stage name, or "submitted" / "abandoned"
    pub state: String,
    /// 1-based stage number while the form is open
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage_number: Option<u8>,
    pub stage_count: u8,
    /// Fields collected on the current stage
    pub fields: Vec<String>,
    /// Values to pre-populate the current stage with
    #[schema(value_type = Object)]
    pub prefill: serde_json::Map<String, serde_json::Value>,
    pub field_errors: BTreeMap<String, String>,
    /// Summary shown on the review stage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review: Option<Vec<ReviewSectionResponse>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inquiry_id: Option<String>,
}

impl From<&IntakeWizard> for IntakeSessionResponse {
    fn from(wizard: &IntakeWizard) -> Self {
        let stage = wizard.stage();
        let state = match wizard.state() {
            WizardState::Stage { stage } => stage_name(stage).to_string(),
            WizardState::Submitted { .. } => "submitted".to_string(),
            WizardState::Abandoned => "abandoned".to_string(),
        };
        let inquiry_id = match wizard.state() {
            WizardState::Submitted { inquiry_id } => Some(inquiry_id.to_string()),
            _ => None,
        };
        Self {
            session_id: wizard.id().to_string(),
            state,
            stage_number: stage.map(|s| s.number()),
            stage_count: IntakeStage::COUNT,
            fields: stage
                .map(|s| s.fields().iter().map(|f| f.to_string()).collect())
                .unwrap_or_default(),
            prefill: stage.map(|s| wizard.prefill(s)).unwrap_or_default(),
            field_errors: wizard.field_errors().clone().into_map(),
            review: (stage == Some(IntakeStage::Review))
                .then(|| review_sections(&wizard.review())),
            inquiry_id,
        }
    }
}

/// Wire name of a stage
pub fn stage_name(stage: IntakeStage) -> &'static str {
    match stage {
        IntakeStage::Medical => "medical",
        IntakeStage::Personal => "personal",
        IntakeStage::Preferences => "preferences",
        IntakeStage::Review => "review",
    }
}

/// Parse a stage from its wire name or 1-based number
pub fn parse_stage(value: &str) -> Option<IntakeStage> {
    let value = value.trim();
    if let Ok(number) = value.parse::<u8>() {
        return IntakeStage::from_number(number);
    }
    IntakeStage::all()
        .iter()
        .copied()
        .find(|s| stage_name(*s).eq_ignore_ascii_case(value))
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OptionResponse {
    pub value: String,
    pub label: String,
}

fn options<C: Choice>() -> Vec<OptionResponse> {
    C::all()
        .iter()
        .map(|c| OptionResponse {
            value: c.value().to_string(),
            label: c.label().to_string(),
        })
        .collect()
}

/// Option sets offered by the intake form
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IntakeOptionsResponse {
    pub urgency: Vec<OptionResponse>,
    pub gender: Vec<OptionResponse>,
    pub budget: Vec<OptionResponse>,
    /// Suggestions only; any text is accepted
    pub accommodation: Vec<OptionResponse>,
}

impl IntakeOptionsResponse {
    pub fn current() -> Self {
        Self {
            urgency: options::<Urgency>(),
            gender: options::<Gender>(),
            budget: options::<BudgetRange>(),
            accommodation: options::<Accommodation>(),
        }
    }
}
