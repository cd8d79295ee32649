use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::tracker::{LatLng, LocationSample, SourceError};

/// Body of a records listing. Only `items` is read; paging fields are ignored.
#[derive(Debug, Deserialize)]
struct RecordList {
    items: Vec<LocationSample>,
}

pub fn parse_records(body: &[u8]) -> Result<Vec<LocationSample>, SourceError> {
    let list: RecordList =
        serde_json::from_slice(body).map_err(|e| SourceError::Malformed(e.to_string()))?;
    Ok(list.items)
}

/// Parses `"lat, lng"`.
pub fn parse_coordinates(coordinates: &str) -> Option<LatLng> {
    let parts: Vec<_> = coordinates.split(',').map(|s| s.trim()).collect();
    if parts.len() != 2 {
        return None;
    }
    let lat: f64 = parts[0].parse().ok()?;
    let lng: f64 = parts[1].parse().ok()?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return None;
    }
    Some(LatLng(lat, lng))
}

/// Accepts RFC 3339 as well as the `2023-01-01 10:00:00.000Z` form record
/// stores commonly emit for date fields.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(&value.replacen(' ', "T", 1)) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value.trim_end_matches('Z'), "%Y-%m-%d %H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

pub fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_records_and_ignores_extra_fields() {
        let body = br#"{
            "page": 1,
            "perPage": 30,
            "totalItems": 2,
            "items": [
                {"id": "a", "collectionId": "x", "latitude": 17.1, "longitude": 78.2,
                 "timestamp": "2024-05-01T08:00:00Z", "speed": 42.5, "heading": 90},
                {"id": "b", "latitude": 17.2, "longitude": 78.3,
                 "timestamp": "2024-05-01 08:02:00.000Z"}
            ]
        }"#;

        let samples = parse_records(body).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].speed, Some(42.5));
        assert_eq!(samples[0].heading, Some(90.0));
        assert_eq!(samples[1].speed, None);
        assert_eq!(
            samples[1].timestamp,
            Utc.with_ymd_and_hms(2024, 5, 1, 8, 2, 0).unwrap()
        );
    }

    #[test]
    fn missing_or_non_array_items_is_malformed() {
        assert!(matches!(
            parse_records(br#"{"page": 1}"#),
            Err(SourceError::Malformed(_))
        ));
        assert!(matches!(
            parse_records(br#"{"items": {"id": "a"}}"#),
            Err(SourceError::Malformed(_))
        ));
        assert!(matches!(
            parse_records(b"<html>502</html>"),
            Err(SourceError::Malformed(_))
        ));
    }

    #[test]
    fn bad_timestamp_is_malformed() {
        let body = br#"{"items": [{"id": "a", "latitude": 1, "longitude": 2, "timestamp": "yesterday"}]}"#;
        assert!(matches!(parse_records(body), Err(SourceError::Malformed(_))));
    }

    #[test]
    fn parse_timestamp_accepts_offsets() {
        let ts = parse_timestamp("2023-01-01T12:00:00+02:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2023, 1, 1, 10, 0, 0).unwrap());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn parse_coordinates_checks_shape_and_range() {
        assert_eq!(
            parse_coordinates("17.385044, 78.486671"),
            Some(LatLng(17.385044, 78.486671))
        );
        assert_eq!(parse_coordinates("17.0"), None);
        assert_eq!(parse_coordinates("1, 2, 3"), None);
        assert_eq!(parse_coordinates("91, 0"), None);
        assert_eq!(parse_coordinates("north, east"), None);
    }
}
