//! Types for weather service requests and responses.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default geocoding endpoint
pub const DEFAULT_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com";

/// Default forecast endpoint
pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com";

/// Configuration for the weather client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Base URL of the geocoding service
    #[serde(default = "default_geocoding_url")]
    pub geocoding_url: String,

    /// Base URL of the forecast service
    #[serde(default = "default_forecast_url")]
    pub forecast_url: String,

    /// Language for place names
    #[serde(default = "default_language")]
    pub language: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_geocoding_url() -> String {
    DEFAULT_GEOCODING_URL.to_string()
}

fn default_forecast_url() -> String {
    DEFAULT_FORECAST_URL.to_string()
}

fn default_language() -> String {
    "pt".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            geocoding_url: default_geocoding_url(),
            forecast_url: default_forecast_url(),
            language: default_language(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl WeatherConfig {
    /// Point both services at one base URL (used by tests and proxies).
    pub fn with_base_url(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            geocoding_url: url.clone(),
            forecast_url: url,
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// A geocoded place.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Location {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// One day of the forecast.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyForecast {
    pub date: NaiveDate,
    /// WMO weather interpretation code
    pub weather_code: u16,
    /// Rounded maximum temperature
    pub max: i32,
    /// Rounded minimum temperature
    pub min: i32,
}

/// Multi-day forecast for a place.
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    /// Resolved place name (from geocoding)
    pub place: String,
    /// Unit label reported by the service (e.g. "°C")
    pub temperature_unit: String,
    pub days: Vec<DailyForecast>,
}

/// Current conditions, used by the corner weather overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentConditions {
    pub place: String,
    pub temperature: i32,
    pub temperature_unit: String,
    pub weather_code: u16,
}

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct GeocodeResponse {
    #[serde(default)]
    pub results: Option<Vec<Location>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DailyBlock {
    pub time: Vec<String>,
    pub weather_code: Vec<u16>,
    pub temperature_2m_max: Vec<f64>,
    pub temperature_2m_min: Vec<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DailyUnits {
    pub temperature_2m_max: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ForecastResponse {
    pub daily: DailyBlock,
    pub daily_units: DailyUnits,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CurrentBlock {
    pub temperature_2m: f64,
    pub weather_code: u16,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CurrentUnits {
    pub temperature_2m: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CurrentResponse {
    pub current: CurrentBlock,
    pub current_units: CurrentUnits,
}
