use std::time::Duration;

use crate::tracker::{HttpLocationSource, TrackerHandle};

#[derive(Clone)]
pub struct AppState {
    pub tracker: TrackerHandle<HttpLocationSource>,
    /// How often the map page asks for a fresh view model.
    pub refresh_interval: Duration,
}
