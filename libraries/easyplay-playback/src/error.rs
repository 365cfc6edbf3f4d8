//! Error types for playback

use thiserror::Error;

/// Playback errors
///
/// Per-item failures never show up here: the renderer folds them into
/// skip or diagnostic outcomes before they reach the engine.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// `play()` was called with nothing to play
    #[error("Playlist is empty")]
    EmptyPlaylist,

    /// A full cycle produced no renderable item
    #[error("No playable items in playlist")]
    NoPlayableItems,

    /// Platform backend failure
    #[error("Backend error: {0}")]
    Backend(String),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),

    /// Weather lookup failed
    #[error("Weather error: {0}")]
    Weather(#[from] easyplay_weather::WeatherError),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
