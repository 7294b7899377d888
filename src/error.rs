//! Error types shared by the workflow, progress and intake components.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::progress::PatientId;
use crate::store::StoreError;
use crate::workflow::StepId;

/// Result alias used across the library
pub type Result<T, E = JourneyError> = std::result::Result<T, E>;

/// Field-scoped validation failures, keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error for a field. The first message for a field wins.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn into_map(self) -> BTreeMap<String, String> {
        self.0
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(k, v)| format!("{k}: {v}")).collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Coarse error categories callers branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidTransition,
    ValidationFailed,
    PersistenceFailed,
}

/// Errors returned by the journey components
#[derive(Error, Debug)]
pub enum JourneyError {
    #[error("workflow step '{0}' not found")]
    StepNotFound(StepId),

    #[error("no progress record for patient '{0}'")]
    PatientNotFound(PatientId),

    #[error("patient is already on the last active step")]
    NoNextStep,

    #[error("patient is already on the first active step")]
    NoPreviousStep,

    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    #[error("validation failed: {0}")]
    ValidationFailed(FieldErrors),

    #[error("persistence failed: {0}")]
    PersistenceFailed(String),
}

impl JourneyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            JourneyError::StepNotFound(_) | JourneyError::PatientNotFound(_) => ErrorKind::NotFound,
            JourneyError::NoNextStep
            | JourneyError::NoPreviousStep
            | JourneyError::InvalidTransition(_) => ErrorKind::InvalidTransition,
            JourneyError::ValidationFailed(_) => ErrorKind::ValidationFailed,
            JourneyError::PersistenceFailed(_) => ErrorKind::PersistenceFailed,
        }
    }

    /// Field errors carried by a validation failure
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            JourneyError::ValidationFailed(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<StoreError> for JourneyError {
    fn from(err: StoreError) -> Self {
        JourneyError::PersistenceFailed(err.to_string())
    }
}
