//! Default patient journey seeded into an empty registry

use super::step::Phase;

/// Title, description and phase of each default step, in journey order
pub fn default_steps() -> Vec<(&'static str, &'static str, Phase)> {
    vec![
        (
            "Initial Consultation",
            "Patient inquiry and initial medical assessment",
            Phase::Initial,
        ),
        (
            "Medical Review",
            "Doctor reviews patient case and medical history",
            Phase::Planning,
        ),
        (
            "Treatment Planning",
            "Create detailed treatment plan and timeline",
            Phase::Planning,
        ),
        (
            "Travel Arrangements",
            "Book flights, accommodation, and transfers",
            Phase::Travel,
        ),
        (
            "Pre-treatment Preparation",
            "Final medical preparations and documentation",
            Phase::Travel,
        ),
    ]
}
