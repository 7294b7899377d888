//! Workflow step management endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::rest::dto::{
    CreateStepRequest, ListStepsQuery, MoveStepRequest, StepResponse, UpdateStepRequest,
};
use crate::rest::error::{ApiError, ErrorResponse};
use crate::rest::role::CallerRole;
use crate::rest::state::ApiState;
use crate::roles::Capability;
use crate::workflow::{
    MoveDirection, Phase, StepId, StepUpdate, DEFAULT_STEP_DESCRIPTION, DEFAULT_STEP_TITLE,
};

pub(crate) fn parse_step_id(id: &str) -> Result<StepId, ApiError> {
    id.parse()
        .map_err(|_| ApiError::BadRequest(format!("'{}' is not a valid step id", id)))
}

fn parse_phase(phase: Option<String>) -> Result<Option<Phase>, ApiError> {
    phase
        .map(|p| p.parse::<Phase>())
        .transpose()
        .map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// List workflow steps in order
#[utoipa::path(
    get,
    path = "/api/v1/steps",
    tag = "Steps",
    params(ListStepsQuery),
    responses(
        (status = 200, description = "Steps ordered by step number", body = Vec<StepResponse>),
        (status = 403, description = "Role may not list inactive steps", body = ErrorResponse)
    )
)]
pub async fn list(
    State(state): State<ApiState>,
    role: CallerRole,
    Query(query): Query<ListStepsQuery>,
) -> Result<Json<Vec<StepResponse>>, ApiError> {
    let registry = state.registry.lock().await;
    let steps = if query.all {
        role.require(Capability::ViewAllSteps)?;
        registry.list_all()
    } else {
        role.require(Capability::ViewActiveSteps)?;
        registry.list_active()
    };
    Ok(Json(steps.iter().map(StepResponse::from).collect()))
}

/// Append a step at the end of the journey
#[utoipa::path(
    post,
    path = "/api/v1/steps",
    tag = "Steps",
    request_body = CreateStepRequest,
    responses(
        (status = 201, description = "Step created", body = StepResponse),
        (status = 400, description = "Unknown phase", body = ErrorResponse),
        (status = 403, description = "Admins only", body = ErrorResponse),
        (status = 503, description = "Step store unavailable", body = ErrorResponse)
    )
)]
pub async fn create(
    State(state): State<ApiState>,
    role: CallerRole,
    Json(request): Json<CreateStepRequest>,
) -> Result<(StatusCode, Json<StepResponse>), ApiError> {
    role.require(Capability::EditWorkflow)?;
    let phase = parse_phase(request.phase)?.unwrap_or_default();

    let mut registry = state.registry.lock().await;
    let step = registry
        .append(
            request
                .title
                .unwrap_or_else(|| DEFAULT_STEP_TITLE.to_string()),
            request
                .description
                .unwrap_or_else(|| DEFAULT_STEP_DESCRIPTION.to_string()),
            phase,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(StepResponse::from(&step))))
}

/// Edit a step's title, description or phase
#[utoipa::path(
    put,
    path = "/api/v1/steps/{id}",
    tag = "Steps",
    params(
        ("id" = String, Path, description = "Step id")
    ),
    request_body = UpdateStepRequest,
    responses(
        (status = 200, description = "Step updated", body = StepResponse),
        (status = 403, description = "Admins only", body = ErrorResponse),
        (status = 404, description = "Step not found", body = ErrorResponse)
    )
)]
pub async fn update(
    State(state): State<ApiState>,
    role: CallerRole,
    Path(id): Path<String>,
    Json(request): Json<UpdateStepRequest>,
) -> Result<Json<StepResponse>, ApiError> {
    role.require(Capability::EditWorkflow)?;
    let id = parse_step_id(&id)?;
    let update = StepUpdate {
        title: request.title,
        description: request.description,
        phase: parse_phase(request.phase)?,
    };

    let mut registry = state.registry.lock().await;
    let step = registry.update(id, update).await?;
    Ok(Json(StepResponse::from(&step)))
}

/// Delete a step and renumber the ones after it
///
/// Refused while any patient is on the step.
#[utoipa::path(
    delete,
    path = "/api/v1/steps/{id}",
    tag = "Steps",
    params(
        ("id" = String, Path, description = "Step id")
    ),
    responses(
        (status = 204, description = "Step deleted"),
        (status = 403, description = "Admins only", body = ErrorResponse),
        (status = 404, description = "Step not found", body = ErrorResponse),
        (status = 409, description = "Patients are on this step", body = ErrorResponse)
    )
)]
pub async fn delete(
    State(state): State<ApiState>,
    role: CallerRole,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    role.require(Capability::EditWorkflow)?;
    let id = parse_step_id(&id)?;

    let mut registry = state.registry.lock().await;
    let tracker = state.tracker.lock().await;
    let occupants = tracker.patients_on(id);
    if !occupants.is_empty() {
        return Err(ApiError::InvalidTransition(format!(
            "{} patient(s) are on step '{}'; move them first",
            occupants.len(),
            id
        )));
    }
    registry.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Flip a step between active and inactive
#[utoipa::path(
    post,
    path = "/api/v1/steps/{id}/toggle",
    tag = "Steps",
    params(
        ("id" = String, Path, description = "Step id")
    ),
    responses(
        (status = 200, description = "Step toggled", body = StepResponse),
        (status = 403, description = "Admins only", body = ErrorResponse),
        (status = 404, description = "Step not found", body = ErrorResponse)
    )
)]
pub async fn toggle(
    State(state): State<ApiState>,
    role: CallerRole,
    Path(id): Path<String>,
) -> Result<Json<StepResponse>, ApiError> {
    role.require(Capability::EditWorkflow)?;
    let id = parse_step_id(&id)?;

    let mut registry = state.registry.lock().await;
    let step = registry.toggle_active(id).await?;
    Ok(Json(StepResponse::from(&step)))
}

/// Swap a step with its neighbour
///
/// Moving past either end leaves the order unchanged.
#[utoipa::path(
    post,
    path = "/api/v1/steps/{id}/move",
    tag = "Steps",
    params(
        ("id" = String, Path, description = "Step id")
    ),
    request_body = MoveStepRequest,
    responses(
        (status = 200, description = "Full ordered step list", body = Vec<StepResponse>),
        (status = 400, description = "Unknown direction", body = ErrorResponse),
        (status = 403, description = "Admins only", body = ErrorResponse),
        (status = 404, description = "Step not found", body = ErrorResponse)
    )
)]
pub async fn move_step(
    State(state): State<ApiState>,
    role: CallerRole,
    Path(id): Path<String>,
    Json(request): Json<MoveStepRequest>,
) -> Result<Json<Vec<StepResponse>>, ApiError> {
    role.require(Capability::EditWorkflow)?;
    let id = parse_step_id(&id)?;
    let direction = match request.direction.to_ascii_lowercase().as_str() {
        "up" => MoveDirection::Up,
        "down" => MoveDirection::Down,
        other => {
            return Err(ApiError::BadRequest(format!(
                "direction must be 'up' or 'down', got '{}'",
                other
            )))
        }
    };

    let mut registry = state.registry.lock().await;
    let steps = registry.move_step(id, direction).await?;
    Ok(Json(steps.iter().map(StepResponse::from).collect()))
}
