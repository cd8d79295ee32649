use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::tracker::{
    parse_coordinates, LatLng, LocationSample, SimulatedRoute, TrackerSettings, DEFAULT_CENTER,
    DEFAULT_POLL_INTERVAL, DEFAULT_REQUEST_TIMEOUT, MAX_CIRCLE_POINTS,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tracker: TrackerConfig,
    pub web: WebConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub source_url: String,
    /// `"lat, lng"`, shown until the first sample arrives.
    pub default_position: String,
    #[serde(deserialize_with = "deserialize_duration")]
    pub poll_interval: Duration,
    #[serde(deserialize_with = "deserialize_duration")]
    pub request_timeout: Duration,
    pub simulation: SimulationConfig,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            source_url: default_source_url(),
            default_position: format!("{}, {}", DEFAULT_CENTER.lat(), DEFAULT_CENTER.lng()),
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            simulation: SimulationConfig::default(),
        }
    }
}

fn default_source_url() -> String {
    "http://localhost:8090/api/collections/locations/records".to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SimulationConfig {
    #[default]
    Default,
    Circle {
        /// Defaults to the tracker's default position.
        #[serde(default)]
        center: Option<String>,
        #[serde(default = "default_circle_count")]
        count: usize,
        #[serde(default = "default_circle_radius_km")]
        radius_km: f64,
    },
    Fixed {
        samples: Vec<LocationSample>,
    },
}

fn default_circle_count() -> usize {
    20
}

fn default_circle_radius_km() -> f64 {
    0.5
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    humantime::parse_duration(raw.trim()).map_err(serde::de::Error::custom)
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let tracker = &self.tracker;
        if !(tracker.source_url.starts_with("http://") || tracker.source_url.starts_with("https://"))
        {
            return Err(ConfigError::Invalid(format!(
                "source_url must be an http(s) URL, got {:?}",
                tracker.source_url
            )));
        }
        if tracker.poll_interval.is_zero() {
            return Err(ConfigError::Invalid("poll_interval must be non-zero".into()));
        }
        if tracker.request_timeout.is_zero() {
            return Err(ConfigError::Invalid("request_timeout must be non-zero".into()));
        }
        self.default_position()?;
        self.simulated_route()?;
        Ok(())
    }

    pub fn default_position(&self) -> Result<LatLng, ConfigError> {
        coordinates(&self.tracker.default_position)
    }

    pub fn tracker_settings(&self) -> Result<TrackerSettings, ConfigError> {
        Ok(TrackerSettings {
            default_position: self.default_position()?,
            poll_interval: self.tracker.poll_interval,
            request_timeout: self.tracker.request_timeout,
        })
    }

    pub fn simulated_route(&self) -> Result<SimulatedRoute, ConfigError> {
        match &self.tracker.simulation {
            SimulationConfig::Default => Ok(SimulatedRoute::default()),
            SimulationConfig::Circle {
                center,
                count,
                radius_km,
            } => {
                if *count == 0 || *radius_km <= 0.0 {
                    return Err(ConfigError::Invalid(
                        "circle simulation needs count > 0 and radius_km > 0".into(),
                    ));
                }
                if *count > MAX_CIRCLE_POINTS {
                    return Err(ConfigError::Invalid(format!(
                        "circle simulation count must be at most {MAX_CIRCLE_POINTS}"
                    )));
                }
                let center = match center {
                    Some(c) => coordinates(c)?,
                    None => self.default_position()?,
                };
                Ok(SimulatedRoute::circle(center, *count, *radius_km, Utc::now()))
            }
            SimulationConfig::Fixed { samples } => {
                if samples.is_empty() {
                    return Err(ConfigError::Invalid(
                        "fixed simulation needs at least one sample".into(),
                    ));
                }
                Ok(SimulatedRoute::new(samples.clone()))
            }
        }
    }
}

fn coordinates(value: &str) -> Result<LatLng, ConfigError> {
    parse_coordinates(value)
        .ok_or_else(|| ConfigError::Invalid(format!("invalid coordinates: {value:?}")))
}
