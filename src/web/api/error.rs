use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::tracker::TrackerError;

#[derive(Debug)]
pub enum ApiError {
    Conflict(&'static str),
    Tracker(TrackerError),
}

impl From<TrackerError> for ApiError {
    fn from(e: TrackerError) -> Self {
        ApiError::Tracker(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Conflict(reason) => {
                (StatusCode::CONFLICT, Json(ErrorResponse::new(reason))).into_response()
            }
            ApiError::Tracker(e @ TrackerError::Stopped) => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse::with_message("tracker_stopped", &e.to_string())),
            )
                .into_response(),
            ApiError::Tracker(e @ TrackerError::AlreadyRunning) => (
                StatusCode::CONFLICT,
                Json(ErrorResponse::with_message("tracker_running", &e.to_string())),
            )
                .into_response(),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: &str) -> Self {
        ErrorResponse {
            error: error.to_string(),
            message: None,
        }
    }

    pub fn with_message(error: &str, message: &str) -> Self {
        ErrorResponse {
            error: error.to_string(),
            message: Some(message.to_string()),
        }
    }
}
