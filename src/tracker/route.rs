use std::collections::HashSet;

use super::types::{LatLng, LocationSample};

/// Position history drawn as the vehicle's trail.
///
/// Entries are unique by `id` and kept in non-decreasing timestamp order.
/// Both constructors and `insert_if_absent` preserve that.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteLog {
    samples: Vec<LocationSample>,
}

impl RouteLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a route from samples in arbitrary order. The sort is stable so
    /// equal timestamps keep source order; a repeated id keeps its first
    /// occurrence in that order.
    pub fn from_unordered(mut samples: Vec<LocationSample>) -> Self {
        samples.sort_by_key(|s| s.timestamp);

        let mut seen = HashSet::with_capacity(samples.len());
        samples.retain(|s| seen.insert(s.id.clone()));

        Self { samples }
    }

    /// Adds `sample` unless an entry with the same id exists. Returns whether
    /// the route grew.
    pub fn insert_if_absent(&mut self, sample: LocationSample) -> bool {
        if self.contains_id(&sample.id) {
            return false;
        }
        let at = self
            .samples
            .partition_point(|s| s.timestamp <= sample.timestamp);
        self.samples.insert(at, sample);
        true
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.samples.iter().any(|s| s.id == id)
    }

    pub fn latest(&self) -> Option<&LocationSample> {
        self.samples.last()
    }

    pub fn coordinates(&self) -> Vec<LatLng> {
        self.samples.iter().map(LocationSample::position).collect()
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
    use chrono::{Duration, TimeZone, Utc};

    fn sample(id: &str, minute: i64) -> LocationSample {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        LocationSample::new(id, minute as f64, minute as f64, base + Duration::minutes(minute))
    }

    fn ids(route: &RouteLog) -> Vec<&str> {
        route.samples().iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn from_unordered_sorts_by_timestamp() {
        let route = RouteLog::from_unordered(vec![sample("b", 2), sample("a", 1), sample("c", 3)]);
        assert_eq!(ids(&route), ["a", "b", "c"]);
        assert_eq!(route.latest().map(|s| s.id.as_str()), Some("c"));
    }

    #[test]
    fn equal_timestamps_keep_source_order() {
        let route = RouteLog::from_unordered(vec![
            sample("late", 5),
            sample("x", 1),
            sample("y", 1),
            sample("z", 1),
        ]);
        assert_eq!(ids(&route), ["x", "y", "z", "late"]);
    }

    #[test]
    fn repeated_ids_are_dropped() {
        let route = RouteLog::from_unordered(vec![sample("a", 3), sample("a", 1), sample("b", 2)]);
        assert_eq!(ids(&route), ["a", "b"]);
        assert_eq!(route.samples()[0].latitude, 1.0);
    }

    #[test]
    fn insert_if_absent_ignores_known_ids() {
        let mut route = RouteLog::new();
        assert!(route.insert_if_absent(sample("1", 0)));
        assert!(route.insert_if_absent(sample("2", 1)));
        assert!(!route.insert_if_absent(sample("1", 0)));
        assert_eq!(route.len(), 2);
    }

    #[test]
    fn insert_if_absent_keeps_timestamp_order() {
        let mut route = RouteLog::from_unordered(vec![sample("a", 10), sample("b", 20)]);
        route.insert_if_absent(sample("early", 5));
        route.insert_if_absent(sample("tie", 10));
        route.insert_if_absent(sample("end", 30));
        assert_eq!(ids(&route), ["early", "a", "tie", "b", "end"]);
    }

    #[test]
    fn coordinates_follow_route_order() {
        let route = RouteLog::from_unordered(vec![sample("b", 2), sample("a", 1)]);
        assert_eq!(route.coordinates(), vec![LatLng(1.0, 1.0), LatLng(2.0, 2.0)]);
    }
}
