//! Patient intake form.
//!
//! [`IntakeWizard`] drives one patient's pass through the form. It owns its
//! data exclusively; nothing is persisted until the review stage is
//! submitted, at which point a single [`InquiryRecord`] goes to the
//! configured [`crate::store::InquirySink`].

mod record;
mod review;
mod stage;
pub mod validate;
mod wizard;


pub use record::InquiryRecord;
pub use review::{IntakeReview, ReviewEntry, ReviewSection};
pub use stage::{choice_label, Accommodation, BudgetRange, Choice, Gender, IntakeStage, Urgency};
pub use wizard::{IntakeWizard, WizardState};
