//! Admin-configurable workflow definition.
//!
//! A workflow is an ordered list of [`WorkflowStep`]s owned by a
//! [`StepRegistry`]. Steps carry a [`Phase`] label and can be deactivated
//! without being removed.

mod defaults;
mod registry;
mod step;

pub use defaults::default_steps;
pub use registry::{StepRegistry, DEFAULT_STEP_DESCRIPTION, DEFAULT_STEP_TITLE};
pub use step::{MoveDirection, Phase, StepId, StepUpdate, UnknownPhase, WorkflowStep};
