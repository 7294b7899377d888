//! Caller roles and the capabilities each one is offered.
//!
//! The journey components never check roles themselves; the REST layer uses
//! [`Role::allows`] to decide which operations a caller may reach.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Request header carrying the caller's role
pub const ROLE_HEADER: &str = "x-medjourney-role";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Patient,
    Employee,
    Admin,
}

/// Operation groups exposed through the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Fill in and submit the intake form
    SubmitIntake,
    /// Read the active steps of the journey
    ViewActiveSteps,
    /// Read every step, inactive ones included
    ViewAllSteps,
    /// Read a patient's current position
    ViewProgress,
    /// Read the journey board
    ViewBoard,
    /// Admit, assign, advance and retreat patients
    MovePatients,
    /// Create, edit, reorder, toggle and delete steps
    EditWorkflow,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Patient => "patient",
            Role::Employee => "employee",
            Role::Admin => "admin",
        }
    }

    pub fn allows(&self, capability: Capability) -> bool {
        match self {
            Role::Admin => true,
            Role::Employee => !matches!(capability, Capability::EditWorkflow),
            Role::Patient => matches!(
                capability,
                Capability::SubmitIntake | Capability::ViewActiveSteps | Capability::ViewProgress
            ),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role '{0}', expected patient, employee or admin")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "patient" => Ok(Role::Patient),
            "employee" => Ok(Role::Employee),
            "admin" => Ok(Role::Admin),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}
