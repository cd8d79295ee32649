use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::parsing::deserialize_timestamp;

/// A `(latitude, longitude)` pair in degrees. Serializes as a two-element
/// array, which is what map widgets take for marker and polyline positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLng(pub f64, pub f64);

impl LatLng {
    pub fn lat(&self) -> f64 {
        self.0
    }

    pub fn lng(&self) -> f64 {
        self.1
    }
}

/// One timestamped position record, either fetched from the location source
/// or taken from the simulated route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LocationSample {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    /// km/h
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    /// Degrees clockwise from north.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,
}

impl LocationSample {
    pub fn new(
        id: impl Into<String>,
        latitude: f64,
        longitude: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            latitude,
            longitude,
            timestamp,
            speed: None,
            heading: None,
        }
    }

    pub fn position(&self) -> LatLng {
        LatLng(self.latitude, self.longitude)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display, utoipa::ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TrackerMode {
    Live,
    Simulated,
}

/// Lifecycle of the poll loop, independent of the live/simulated mode.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display, utoipa::ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EngineState {
    Idle,
    Running,
    Stopped,
}

/// Result of a single `refresh_from_source` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RefreshOutcome {
    /// The source answered and the route was replaced.
    Live,
    /// The source failed and the tracker fell back to simulation.
    Fallback,
    /// Another refresh was already in flight.
    Skipped,
    /// The tracker was stopped before the response could be applied.
    Cancelled,
}

/// What the renderer draws: a marker, an optional route line and status text.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct ViewModel {
    #[schema(value_type = Vec<f64>)]
    pub current_position: LatLng,
    #[schema(value_type = Vec<Vec<f64>>)]
    pub route_coordinates: Vec<LatLng>,
    /// A polyline needs at least two points.
    pub show_route: bool,
    pub mode: TrackerMode,
    pub is_loading: bool,
    pub last_error: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
}
