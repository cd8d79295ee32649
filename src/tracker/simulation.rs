use chrono::{DateTime, Duration, TimeZone, Utc};

use super::types::{LatLng, LocationSample};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Hyderabad, where the canned path starts.
pub const DEFAULT_CENTER: LatLng = LatLng(17.385044, 78.486671);

const DEFAULT_PATH_LEN: usize = 6;
const DEFAULT_PATH_STEP_DEG: f64 = 0.003;
const CIRCLE_SPACING_MINUTES: i64 = 2;

/// Upper bound on generated circle points.
pub const MAX_CIRCLE_POINTS: usize = 10_000;

/// Fixed sequence of samples replayed cyclically while the location source
/// is unavailable.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedRoute {
    samples: Vec<LocationSample>,
}

impl Default for SimulatedRoute {
    /// Six points heading north-east one minute apart.
    fn default() -> Self {
        let start = Utc
            .with_ymd_and_hms(2023, 1, 1, 10, 0, 0)
            .single()
            .unwrap_or_default();
        let samples = (0..DEFAULT_PATH_LEN)
            .map(|i| {
                let step = DEFAULT_PATH_STEP_DEG * i as f64;
                LocationSample::new(
                    (i + 1).to_string(),
                    DEFAULT_CENTER.lat() + step,
                    DEFAULT_CENTER.lng() + step,
                    start + Duration::minutes(i as i64),
                )
            })
            .collect();
        Self { samples }
    }
}

impl SimulatedRoute {
    pub fn new(samples: Vec<LocationSample>) -> Self {
        Self { samples }
    }

    /// `count` points evenly spaced on a circle of `radius_km` around
    /// `center`, two minutes apart and ending just before `until`. `count` is
    /// clamped to `MAX_CIRCLE_POINTS`.
    pub fn circle(center: LatLng, count: usize, radius_km: f64, until: DateTime<Utc>) -> Self {
        let count = count.min(MAX_CIRCLE_POINTS);
        let lat_rad = center.lat().to_radians();
        let samples = (0..count)
            .map(|i| {
                let fraction = i as f64 / count as f64;
                let angle = fraction * std::f64::consts::TAU;
                let dx = radius_km * angle.cos();
                let dy = radius_km * angle.sin();

                let lat = center.lat() + (dy / EARTH_RADIUS_KM).to_degrees();
                let lng = center.lng() + (dx / EARTH_RADIUS_KM).to_degrees() / lat_rad.cos();
                let steps_back = (count - i) as i64;
                let timestamp = until - Duration::minutes(CIRCLE_SPACING_MINUTES * steps_back);

                LocationSample {
                    heading: Some(fraction * 360.0),
                    ..LocationSample::new(format!("sim-{i}"), lat, lng, timestamp)
                }
            })
            .collect();
        Self { samples }
    }

    /// Sample for a monotonically increasing cursor, wrapping around the
    /// sequence. `None` only when the route is empty.
    pub fn sample_at(&self, cursor: u64) -> Option<&LocationSample> {
        if self.is_empty() {
            return None;
        }
        let index = (cursor % self.samples.len() as u64) as usize;
        self.samples.get(index)
    }

    pub fn samples(&self) -> &[LocationSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_route_has_six_distinct_ascending_points() {
        let route = SimulatedRoute::default();
        assert_eq!(route.len(), 6);

        let ids: Vec<_> = route.samples().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "3", "4", "5", "6"]);
        assert!(route
            .samples()
            .windows(2)
            .all(|w| w[0].timestamp < w[1].timestamp));

        let last = &route.samples()[5];
        assert!((last.latitude - 17.400044).abs() < 1e-9);
        assert!((last.longitude - 78.501671).abs() < 1e-9);
    }

    #[test]
    fn sample_at_wraps() {
        let route = SimulatedRoute::default();
        assert_eq!(route.sample_at(0).map(|s| s.id.as_str()), Some("1"));
        assert_eq!(route.sample_at(5).map(|s| s.id.as_str()), Some("6"));
        assert_eq!(route.sample_at(6).map(|s| s.id.as_str()), Some("1"));
        assert_eq!(route.sample_at(13).map(|s| s.id.as_str()), Some("2"));
        assert!(SimulatedRoute::new(Vec::new()).sample_at(0).is_none());
    }

    #[test]
    fn circle_points_stay_on_radius() {
        let until = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let route = SimulatedRoute::circle(DEFAULT_CENTER, 20, 0.5, until);
        assert_eq!(route.len(), 20);

        for sample in route.samples() {
            let dy = (sample.latitude - DEFAULT_CENTER.lat()).to_radians() * EARTH_RADIUS_KM;
            let dx = (sample.longitude - DEFAULT_CENTER.lng()).to_radians()
                * EARTH_RADIUS_KM
                * DEFAULT_CENTER.lat().to_radians().cos();
            let r = (dx * dx + dy * dy).sqrt();
            assert!((r - 0.5).abs() < 1e-6, "radius {r}");
        }

        let first = &route.samples()[0];
        let last = &route.samples()[19];
        assert_eq!(first.id, "sim-0");
        assert_eq!(first.heading, Some(0.0));
        assert_eq!(first.timestamp, until - Duration::minutes(40));
        assert_eq!(last.timestamp, until - Duration::minutes(2));
    }

    #[test]
    fn circle_count_is_clamped() {
        let until = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let route = SimulatedRoute::circle(DEFAULT_CENTER, usize::MAX, 0.5, until);
        assert_eq!(route.len(), MAX_CIRCLE_POINTS);
        assert!(!route.is_empty());
        assert!(route.samples()[0].timestamp < until);
    }
}
