use axum::{extract::State, Json};

use crate::tracker::{LocationSample, RefreshOutcome, TrackerError, ViewModel};
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::state::AppState;

#[utoipa::path(
    get,
    path = "/api/tracker/view",
    responses(
        (status = 200, description = "Current marker, route line and status", body = ViewModel)
    ),
    tag = "tracker"
)]
pub async fn view(State(state): State<AppState>) -> Json<ViewModel> {
    Json(state.tracker.view())
}

#[utoipa::path(
    get,
    path = "/api/tracker/route",
    responses(
        (status = 200, description = "Route samples in timestamp order", body = Vec<LocationSample>)
    ),
    tag = "tracker"
)]
pub async fn route(State(state): State<AppState>) -> Json<Vec<LocationSample>> {
    Json(state.tracker.state().route.samples().to_vec())
}

#[utoipa::path(
    post,
    path = "/api/tracker/reconnect",
    responses(
        (status = 200, description = "Refresh attempted, view after the attempt", body = ViewModel),
        (status = 409, description = "A refresh is already in flight", body = ErrorResponse),
        (status = 503, description = "Tracker stopped", body = ErrorResponse)
    ),
    tag = "tracker"
)]
pub async fn reconnect(State(state): State<AppState>) -> ApiResult<Json<ViewModel>> {
    match state.tracker.manual_reconnect().await {
        RefreshOutcome::Live | RefreshOutcome::Fallback => Ok(Json(state.tracker.view())),
        RefreshOutcome::Skipped => Err(ApiError::Conflict("refresh_in_flight")),
        RefreshOutcome::Cancelled => Err(TrackerError::Stopped.into()),
    }
}
