//! Intake form endpoints.
//!
//! Each session is a server-held [`crate::intake::IntakeWizard`] addressed by
//! its id. Submitted and abandoned sessions are dropped from memory.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::rest::dto::{
    parse_stage, IntakeOptionsResponse, IntakeSessionResponse, SubmitStageRequest,
};
use crate::rest::error::{ApiError, ErrorResponse};
use crate::rest::role::CallerRole;
use crate::rest::state::ApiState;
use crate::roles::Capability;

fn parse_session_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id)
        .map_err(|_| ApiError::BadRequest(format!("'{}' is not a valid session id", id)))
}

/// Option sets offered by the intake form
#[utoipa::path(
    get,
    path = "/api/v1/intake/options",
    tag = "Intake",
    responses(
        (status = 200, description = "Choice fields and their labels", body = IntakeOptionsResponse)
    )
)]
pub async fn options() -> Json<IntakeOptionsResponse> {
    Json(IntakeOptionsResponse::current())
}

/// Start a new intake session on the first stage
#[utoipa::path(
    post,
    path = "/api/v1/intake",
    tag = "Intake",
    responses(
        (status = 201, description = "Session started", body = IntakeSessionResponse)
    )
)]
pub async fn start(
    State(state): State<ApiState>,
    role: CallerRole,
) -> Result<(StatusCode, Json<IntakeSessionResponse>), ApiError> {
    role.require(Capability::SubmitIntake)?;
    let wizard = state.start_session().await;
    let wizard = wizard.lock().await;
    tracing::debug!(session = %wizard.id(), "Intake session started");
    Ok((
        StatusCode::CREATED,
        Json(IntakeSessionResponse::from(&*wizard)),
    ))
}

/// Current stage, prefill values and errors of a session
#[utoipa::path(
    get,
    path = "/api/v1/intake/{id}",
    tag = "Intake",
    params(
        ("id" = String, Path, description = "Session id")
    ),
    responses(
        (status = 200, description = "Session state", body = IntakeSessionResponse),
        (status = 404, description = "Session not found", body = ErrorResponse)
    )
)]
pub async fn get_one(
    State(state): State<ApiState>,
    role: CallerRole,
    Path(id): Path<String>,
) -> Result<Json<IntakeSessionResponse>, ApiError> {
    role.require(Capability::SubmitIntake)?;
    let wizard = state.session(parse_session_id(&id)?).await?;
    let wizard = wizard.lock().await;
    Ok(Json(IntakeSessionResponse::from(&*wizard)))
}

/// Submit the current stage
///
/// On the review stage this records the inquiry. Validation failures return
/// 422 with per-field messages and leave the session on the same stage.
#[utoipa::path(
    post,
    path = "/api/v1/intake/{id}/submit",
    tag = "Intake",
    params(
        ("id" = String, Path, description = "Session id")
    ),
    request_body = SubmitStageRequest,
    responses(
        (status = 200, description = "Stage accepted", body = IntakeSessionResponse),
        (status = 404, description = "Session not found", body = ErrorResponse),
        (status = 409, description = "Stage is not the current stage", body = ErrorResponse),
        (status = 422, description = "Field validation failed", body = ErrorResponse),
        (status = 503, description = "Inquiry could not be recorded; retry", body = ErrorResponse)
    )
)]
pub async fn submit(
    State(state): State<ApiState>,
    role: CallerRole,
    Path(id): Path<String>,
    Json(request): Json<SubmitStageRequest>,
) -> Result<Json<IntakeSessionResponse>, ApiError> {
    role.require(Capability::SubmitIntake)?;
    let session_id = parse_session_id(&id)?;
    let stage = parse_stage(&request.stage)
        .ok_or_else(|| ApiError::BadRequest(format!("unknown stage '{}'", request.stage)))?;

    let wizard = state.session(session_id).await?;
    let mut wizard = wizard.lock().await;
    wizard
        .submit_stage(stage, request.fields, state.sink.as_ref())
        .await?;
    let response = IntakeSessionResponse::from(&*wizard);

    if wizard.state().is_terminal() {
        drop(wizard);
        state.end_session(session_id).await;
    }
    Ok(Json(response))
}

/// Go back one stage; a no-op on the first stage
#[utoipa::path(
    post,
    path = "/api/v1/intake/{id}/back",
    tag = "Intake",
    params(
        ("id" = String, Path, description = "Session id")
    ),
    responses(
        (status = 200, description = "Session moved back", body = IntakeSessionResponse),
        (status = 404, description = "Session not found", body = ErrorResponse)
    )
)]
pub async fn back(
    State(state): State<ApiState>,
    role: CallerRole,
    Path(id): Path<String>,
) -> Result<Json<IntakeSessionResponse>, ApiError> {
    role.require(Capability::SubmitIntake)?;
    let wizard = state.session(parse_session_id(&id)?).await?;
    let mut wizard = wizard.lock().await;
    wizard.go_back()?;
    Ok(Json(IntakeSessionResponse::from(&*wizard)))
}

/// Abandon a session without recording anything
#[utoipa::path(
    delete,
    path = "/api/v1/intake/{id}",
    tag = "Intake",
    params(
        ("id" = String, Path, description = "Session id")
    ),
    responses(
        (status = 204, description = "Session abandoned"),
        (status = 404, description = "Session not found", body = ErrorResponse)
    )
)]
pub async fn abandon(
    State(state): State<ApiState>,
    role: CallerRole,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    role.require(Capability::SubmitIntake)?;
    let session_id = parse_session_id(&id)?;
    let wizard = state.session(session_id).await?;
    wizard.lock().await.abandon()?;
    state.end_session(session_id).await;
    Ok(StatusCode::NO_CONTENT)
}
