use axum::{extract::State, response::IntoResponse};

use crate::web::state::AppState;

use super::templates::MapTemplate;

pub async fn map(State(state): State<AppState>) -> impl IntoResponse {
    let view = state.tracker.view();
    MapTemplate {
        latitude: view.current_position.lat(),
        longitude: view.current_position.lng(),
        refresh_interval_ms: state.refresh_interval.as_millis() as u64,
    }
}
