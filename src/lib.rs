//! MedJourney - patient journey workflow for a medical-tourism portal
//!
//! Three components make up the core:
//! - [`workflow::StepRegistry`]: the admin-configured, ordered list of journey steps
//! - [`progress::PatientProgressTracker`]: each patient's position in that list
//! - [`intake::IntakeWizard`]: the multi-stage intake form that produces inquiries
//!
//! Persistence is injected through the traits in [`store`]. The [`rest`]
//! module exposes everything over HTTP.

pub mod config;
pub mod error;
pub mod intake;
pub mod logging;
pub mod progress;
pub mod rest;
pub mod roles;
pub mod store;
pub mod workflow;

pub use error::{ErrorKind, FieldErrors, JourneyError, Result};
