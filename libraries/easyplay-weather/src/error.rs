//! Error types for the weather client.

use thiserror::Error;

/// Errors that can occur while looking up weather data.
#[derive(Error, Debug)]
pub enum WeatherError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Service returned an error response
    #[error("Weather service error ({status}): {message}")]
    ServiceError { status: u16, message: String },

    /// Geocoding returned no result for the location
    #[error("Location not found: {0}")]
    LocationNotFound(String),

    /// Invalid service URL
    #[error("Invalid service URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse service response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Service is offline or unreachable
    #[error("Weather service unreachable: {0}")]
    ServiceUnreachable(String),
}

/// Result type for weather operations.
pub type Result<T> = std::result::Result<T, WeatherError>;
