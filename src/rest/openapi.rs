//! OpenAPI specification builder using utoipa.

use utoipa::OpenApi;

use crate::rest::dto::{
    AssignStepRequest, BoardColumnResponse, BoardPatientCard, BoardResponse, CreateStepRequest,
    HealthResponse, IntakeOptionsResponse, IntakeSessionResponse, MoveStepRequest,
    OptionResponse, ProgressResponse, ReviewEntryResponse, ReviewSectionResponse, StepResponse,
    SubmitStageRequest, UpdateStepRequest,
};
use crate::rest::error::ErrorResponse;

/// OpenAPI documentation for the patient journey API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "MedJourney API",
        description = "Workflow steps, patient progression and intake for a medical-tourism portal.",
        license(name = "MIT")
    ),
    paths(
        crate::rest::routes::health::health,
        // Steps
        crate::rest::routes::steps::list,
        crate::rest::routes::steps::create,
        crate::rest::routes::steps::update,
        crate::rest::routes::steps::delete,
        crate::rest::routes::steps::toggle,
        crate::rest::routes::steps::move_step,
        // Patients
        crate::rest::routes::patients::get_progress,
        crate::rest::routes::patients::assign,
        crate::rest::routes::patients::admit,
        crate::rest::routes::patients::advance,
        crate::rest::routes::patients::retreat,
        crate::rest::routes::board::board,
        // Intake
        crate::rest::routes::intake::options,
        crate::rest::routes::intake::start,
        crate::rest::routes::intake::get_one,
        crate::rest::routes::intake::submit,
        crate::rest::routes::intake::back,
        crate::rest::routes::intake::abandon,
    ),
    components(
        schemas(
            HealthResponse,
            StepResponse,
            ProgressResponse,
            BoardResponse,
            BoardColumnResponse,
            BoardPatientCard,
            IntakeSessionResponse,
            IntakeOptionsResponse,
            OptionResponse,
            ReviewSectionResponse,
            ReviewEntryResponse,
            ErrorResponse,
            CreateStepRequest,
            UpdateStepRequest,
            MoveStepRequest,
            AssignStepRequest,
            SubmitStageRequest,
        )
    ),
    tags(
        (name = "Health", description = "Health check"),
        (name = "Steps", description = "Workflow step administration"),
        (name = "Patients", description = "Patient progression and journey board"),
        (name = "Intake", description = "Multi-stage patient intake form"),
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    /// Generate the OpenAPI specification as a JSON string
    pub fn json() -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::openapi())
    }
}
