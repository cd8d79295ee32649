mod error;
mod parsing;
mod route;
mod simulation;
mod source;
mod state;
mod tracker;
mod types;

pub use error::{SourceError, TrackerError};
pub use parsing::parse_coordinates;
pub use route::RouteLog;
pub use simulation::{SimulatedRoute, DEFAULT_CENTER, MAX_CIRCLE_POINTS};
pub use source::{HttpLocationSource, LocationSource};
pub use state::{TrackerState, FALLBACK_MESSAGE};
pub use tracker::{
    PollAction, Tracker, TrackerHandle, TrackerSettings, DEFAULT_POLL_INTERVAL,
    DEFAULT_REQUEST_TIMEOUT,
};
pub use types::{EngineState, LatLng, LocationSample, RefreshOutcome, TrackerMode, ViewModel};
