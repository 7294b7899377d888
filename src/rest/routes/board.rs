//! Journey board endpoint.

use axum::{extract::State, Json};

use crate::progress::JourneyBoard;
use crate::rest::dto::BoardResponse;
use crate::rest::error::{ApiError, ErrorResponse};
use crate::rest::role::CallerRole;
use crate::rest::state::ApiState;
use crate::roles::Capability;

/// Patients grouped by the step they are on
///
/// One column per step in step order. Inactive steps are included so patients
/// parked on them stay visible.
#[utoipa::path(
    get,
    path = "/api/v1/board",
    tag = "Patients",
    responses(
        (status = 200, description = "Journey board", body = BoardResponse),
        (status = 403, description = "Staff only", body = ErrorResponse)
    )
)]
pub async fn board(
    State(state): State<ApiState>,
    role: CallerRole,
) -> Result<Json<BoardResponse>, ApiError> {
    role.require(Capability::ViewBoard)?;

    let registry = state.registry.lock().await;
    let tracker = state.tracker.lock().await;
    let board = JourneyBoard::build(registry.steps(), &tracker.list());
    Ok(Json(BoardResponse::from(&board)))
}
