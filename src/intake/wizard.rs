//! Multi-stage intake form state machine.
//!
//! A wizard walks the four [`IntakeStage`]s in order. Each stage's input is
//! validated before it is merged into the accumulated data; invalid input
//! keeps the wizard where it is and is remembered as a draft so nothing the
//! patient typed is lost. Submitting the review stage hands the accumulated
//! data to an [`InquirySink`] exactly once.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::record::InquiryRecord;
use super::review::IntakeReview;
use super::stage::IntakeStage;
use super::validate::validate_stage;
use crate::error::{FieldErrors, JourneyError, Result};
use crate::store::InquirySink;

/// Where a wizard is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum WizardState {
    /// Collecting input for a stage
    Stage { stage: IntakeStage },
    /// Final submit recorded
    Submitted { inquiry_id: Uuid },
    /// Left without finishing; nothing was recorded
    Abandoned,
}

impl WizardState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, WizardState::Stage { .. })
    }
}

#[derive(Debug, Clone)]
pub struct IntakeWizard {
    id: Uuid,
    state: WizardState,
    data: Map<String, Value>,
    /// Last rejected input per stage, shown again when the stage is revisited
    drafts: HashMap<IntakeStage, Map<String, Value>>,
    field_errors: FieldErrors,
    started_at: DateTime<Utc>,
}

impl Default for IntakeWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl IntakeWizard {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            state: WizardState::Stage {
                stage: IntakeStage::Medical,
            },
            data: Map::new(),
            drafts: HashMap::new(),
            field_errors: FieldErrors::new(),
            started_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> WizardState {
        self.state
    }

    /// Current stage, or `None` once the wizard is terminal
    pub fn stage(&self) -> Option<IntakeStage> {
        match self.state {
            WizardState::Stage { stage } => Some(stage),
            _ => None,
        }
    }

    /// Validated data merged so far
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Errors from the most recent rejected submit
    pub fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Values to show in `stage`'s form: accepted data overlaid with any draft
    pub fn prefill(&self, stage: IntakeStage) -> Map<String, Value> {
        let mut values: Map<String, Value> = stage
            .fields()
            .iter()
            .filter_map(|f| self.data.get(*f).map(|v| (f.to_string(), v.clone())))
            .collect();
        if let Some(draft) = self.drafts.get(&stage) {
            for (field, value) in draft {
                values.insert(field.clone(), value.clone());
            }
        }
        values
    }

    /// Grouped summary of the accumulated data
    pub fn review(&self) -> IntakeReview {
        IntakeReview::from_data(&self.data)
    }

    /// Submit input for `stage`, which must be the current stage.
    ///
    /// On the review stage `fields` is ignored and the accumulated data is
    /// recorded through `sink`. If the sink fails the wizard stays on review
    /// with its data intact so the submit can be retried.
    pub async fn submit_stage(
        &mut self,
        stage: IntakeStage,
        fields: Map<String, Value>,
        sink: &dyn InquirySink,
    ) -> Result<WizardState> {
        self.expect_stage(stage)?;

        let values = match validate_stage(stage, &fields) {
            Ok(values) => values,
            Err(errors) => {
                debug!(wizard = %self.id, %stage, errors = errors.len(), "Stage rejected");
                self.drafts.insert(stage, stage_fields(stage, fields));
                self.field_errors = errors.clone();
                return Err(JourneyError::ValidationFailed(errors));
            }
        };

        if stage.is_last() {
            return self.finish(sink).await;
        }

        for (field, value) in values {
            self.data.insert(field, value);
        }
        self.drafts.remove(&stage);
        self.field_errors = FieldErrors::new();
        if let Some(next) = stage.next() {
            self.state = WizardState::Stage { stage: next };
        }
        debug!(wizard = %self.id, from = %stage, "Stage accepted");
        Ok(self.state)
    }

    /// Step back one stage; a no-op on the first stage
    pub fn go_back(&mut self) -> Result<IntakeStage> {
        let current = self.stage().ok_or_else(|| self.terminal_error())?;
        let target = current.previous().unwrap_or(current);
        self.state = WizardState::Stage { stage: target };
        self.field_errors = FieldErrors::new();
        Ok(target)
    }

    /// Leave the form without submitting; gathered data is discarded
    pub fn abandon(&mut self) -> Result<()> {
        match self.state {
            WizardState::Submitted { .. } => Err(self.terminal_error()),
            WizardState::Abandoned => Ok(()),
            WizardState::Stage { .. } => {
                self.data.clear();
                self.drafts.clear();
                self.field_errors = FieldErrors::new();
                self.state = WizardState::Abandoned;
                debug!(wizard = %self.id, "Intake abandoned");
                Ok(())
            }
        }
    }

    async fn finish(&mut self, sink: &dyn InquirySink) -> Result<WizardState> {
        let record = InquiryRecord::new(self.data.clone());
        match sink.record_inquiry(&record).await {
            Ok(inquiry_id) => {
                self.state = WizardState::Submitted { inquiry_id };
                self.field_errors = FieldErrors::new();
                info!(wizard = %self.id, %inquiry_id, "Inquiry submitted");
                Ok(self.state)
            }
            Err(e) => {
                warn!(wizard = %self.id, "Inquiry submit failed: {}", e);
                Err(e.into())
            }
        }
    }

    fn expect_stage(&self, stage: IntakeStage) -> Result<()> {
        match self.state {
            WizardState::Stage { stage: current } if current == stage => Ok(()),
            WizardState::Stage { stage: current } => Err(JourneyError::InvalidTransition(
                format!("wizard is on stage '{}', not '{}'", current, stage),
            )),
            _ => Err(self.terminal_error()),
        }
    }

    fn terminal_error(&self) -> JourneyError {
        let state = match self.state {
            WizardState::Submitted { .. } => "submitted",
            _ => "abandoned",
        };
        JourneyError::InvalidTransition(format!("intake has already been {state}"))
    }
}

/// Only the fields that belong to `stage`
fn stage_fields(stage: IntakeStage, mut fields: Map<String, Value>) -> Map<String, Value> {
    fields.retain(|k, _| stage.fields().contains(&k.as_str()));
    fields
}
