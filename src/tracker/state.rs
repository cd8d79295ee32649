use super::route::RouteLog;
use super::simulation::SimulatedRoute;
use super::types::{LatLng, LocationSample, TrackerMode, ViewModel};

pub const FALLBACK_MESSAGE: &str = "Failed to connect to the server. Using simulated data instead.";

#[derive(Debug, Clone, PartialEq)]
pub struct TrackerState {
    pub current_position: LatLng,
    pub route: RouteLog,
    pub mode: TrackerMode,
    pub is_loading: bool,
    pub last_error: Option<String>,
    /// Only advanced in simulated mode. Wraps by modulo on read.
    pub simulated_cursor: u64,
}

impl TrackerState {
    pub fn new(default_position: LatLng) -> Self {
        Self {
            current_position: default_position,
            route: RouteLog::new(),
            mode: TrackerMode::Live,
            is_loading: true,
            last_error: None,
            simulated_cursor: 0,
        }
    }

    /// Replaces the route with a successful fetch.
    pub fn apply_samples(&mut self, samples: Vec<LocationSample>) {
        self.route = RouteLog::from_unordered(samples);
        if let Some(latest) = self.route.latest() {
            self.current_position = latest.position();
        }
        self.set_mode(TrackerMode::Live);
        self.last_error = None;
        self.is_loading = false;
    }

    /// Falls back to simulation. The existing route is left alone.
    pub fn apply_failure(&mut self) {
        self.set_mode(TrackerMode::Simulated);
        self.last_error = Some(FALLBACK_MESSAGE.to_string());
        self.is_loading = false;
    }

    /// Moves the marker to the next simulated sample. Returns whether the
    /// route grew.
    pub fn advance(&mut self, simulation: &SimulatedRoute) -> bool {
        let grew = match simulation.sample_at(self.simulated_cursor) {
            Some(sample) => {
                self.current_position = sample.position();
                self.route.insert_if_absent(sample.clone())
            }
            None => false,
        };
        self.simulated_cursor = self.simulated_cursor.wrapping_add(1);
        grew
    }

    pub fn view(&self) -> ViewModel {
        let route_coordinates = self.route.coordinates();
        ViewModel {
            current_position: self.current_position,
            show_route: route_coordinates.len() >= 2,
            route_coordinates,
            mode: self.mode,
            is_loading: self.is_loading,
            last_error: self.last_error.clone(),
            last_updated: self.route.latest().map(|s| s.timestamp),
        }
    }

    fn set_mode(&mut self, mode: TrackerMode) {
        if self.mode != mode {
            log::info!("Tracker mode {} -> {}", self.mode, mode);
            self.mode = mode;
        }
    }
}
