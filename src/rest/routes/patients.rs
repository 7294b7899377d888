//! Patient progression endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::progress::{PatientId, PatientProgress};
use crate::rest::dto::{AssignStepRequest, ProgressResponse};
use crate::rest::error::{ApiError, ErrorResponse};
use crate::rest::role::CallerRole;
use crate::rest::routes::steps::parse_step_id;
use crate::rest::state::ApiState;
use crate::roles::Capability;
use crate::workflow::StepRegistry;

fn progress_response(
    registry: &StepRegistry,
    progress: &PatientProgress,
) -> Result<ProgressResponse, ApiError> {
    let step = registry.get(progress.current_step_id).ok_or_else(|| {
        ApiError::NotFound(format!(
            "workflow step '{}' not found",
            progress.current_step_id
        ))
    })?;
    Ok(ProgressResponse::new(progress, step))
}

/// Get a patient's current step and phase
#[utoipa::path(
    get,
    path = "/api/v1/patients/{id}/progress",
    tag = "Patients",
    params(
        ("id" = String, Path, description = "Patient id")
    ),
    responses(
        (status = 200, description = "Current position", body = ProgressResponse),
        (status = 404, description = "Patient has no progress record", body = ErrorResponse)
    )
)]
pub async fn get_progress(
    State(state): State<ApiState>,
    role: CallerRole,
    Path(id): Path<String>,
) -> Result<Json<ProgressResponse>, ApiError> {
    role.require(Capability::ViewProgress)?;
    let patient = PatientId::new(id);

    let registry = state.registry.lock().await;
    let mut tracker = state.tracker.lock().await;
    let progress = tracker.progress(&patient).await?;
    Ok(Json(progress_response(&registry, &progress)?))
}

/// Place a patient on a specific step
#[utoipa::path(
    put,
    path = "/api/v1/patients/{id}/progress",
    tag = "Patients",
    params(
        ("id" = String, Path, description = "Patient id")
    ),
    request_body = AssignStepRequest,
    responses(
        (status = 200, description = "Patient assigned", body = ProgressResponse),
        (status = 403, description = "Staff only", body = ErrorResponse),
        (status = 404, description = "Step not found", body = ErrorResponse)
    )
)]
pub async fn assign(
    State(state): State<ApiState>,
    role: CallerRole,
    Path(id): Path<String>,
    Json(request): Json<AssignStepRequest>,
) -> Result<Json<ProgressResponse>, ApiError> {
    role.require(Capability::MovePatients)?;
    let step_id = parse_step_id(&request.step_id)?;

    let registry = state.registry.lock().await;
    let mut tracker = state.tracker.lock().await;
    let progress = tracker
        .assign(&registry, PatientId::new(id), step_id)
        .await?;
    Ok(Json(progress_response(&registry, &progress)?))
}

/// Admit a patient onto the first active step
#[utoipa::path(
    post,
    path = "/api/v1/patients/{id}/admit",
    tag = "Patients",
    params(
        ("id" = String, Path, description = "Patient id")
    ),
    responses(
        (status = 200, description = "Patient admitted", body = ProgressResponse),
        (status = 403, description = "Staff only", body = ErrorResponse),
        (status = 409, description = "Already admitted or no active steps", body = ErrorResponse)
    )
)]
pub async fn admit(
    State(state): State<ApiState>,
    role: CallerRole,
    Path(id): Path<String>,
) -> Result<Json<ProgressResponse>, ApiError> {
    role.require(Capability::MovePatients)?;

    let registry = state.registry.lock().await;
    let mut tracker = state.tracker.lock().await;
    let progress = tracker.admit(&registry, PatientId::new(id)).await?;
    Ok(Json(progress_response(&registry, &progress)?))
}

#[derive(Clone, Copy)]
enum Direction {
    Forward,
    Back,
}

async fn step_patient(
    state: &ApiState,
    role: CallerRole,
    id: String,
    direction: Direction,
) -> Result<Json<ProgressResponse>, ApiError> {
    role.require(Capability::MovePatients)?;
    let patient = PatientId::new(id);

    let registry = state.registry.lock().await;
    let mut tracker = state.tracker.lock().await;
    let progress = match direction {
        Direction::Forward => tracker.advance(&registry, &patient).await?,
        Direction::Back => tracker.retreat(&registry, &patient).await?,
    };
    Ok(Json(progress_response(&registry, &progress)?))
}

/// Move a patient to the next active step
#[utoipa::path(
    post,
    path = "/api/v1/patients/{id}/advance",
    tag = "Patients",
    params(
        ("id" = String, Path, description = "Patient id")
    ),
    responses(
        (status = 200, description = "Patient advanced", body = ProgressResponse),
        (status = 404, description = "Patient has no progress record", body = ErrorResponse),
        (status = 409, description = "Already on the last active step", body = ErrorResponse)
    )
)]
pub async fn advance(
    State(state): State<ApiState>,
    role: CallerRole,
    Path(id): Path<String>,
) -> Result<Json<ProgressResponse>, ApiError> {
    step_patient(&state, role, id, Direction::Forward).await
}

/// Move a patient to the previous active step
#[utoipa::path(
    post,
    path = "/api/v1/patients/{id}/retreat",
    tag = "Patients",
    params(
        ("id" = String, Path, description = "Patient id")
    ),
    responses(
        (status = 200, description = "Patient moved back", body = ProgressResponse),
        (status = 404, description = "Patient has no progress record", body = ErrorResponse),
        (status = 409, description = "Already on the first active step", body = ErrorResponse)
    )
)]
pub async fn retreat(
    State(state): State<ApiState>,
    role: CallerRole,
    Path(id): Path<String>,
) -> Result<Json<ProgressResponse>, ApiError> {
    step_patient(&state, role, id, Direction::Back).await
}
