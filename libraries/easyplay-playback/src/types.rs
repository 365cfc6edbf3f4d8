//! Core types for playback management

use crate::error::{PlaybackError, Result};
use easyplay_weather::{ForecastProvider, WeatherClient, WeatherConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackState {
    /// Nothing on screen, editor visible
    #[default]
    Stopped,

    /// Surfaces are being torn down or built
    Transitioning,

    /// A surface is live and its completion is armed
    Showing,
}

/// Engine timing and platform constants
///
/// Every field has a default, so an empty file (or no file at all) yields
/// the stock behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Exit fade run on every live surface before the next item
    pub exit_fade_ms: u64,

    /// Entrance duration when the item does not declare one
    pub default_transition_ms: u64,

    /// Fade used for caption overlays
    pub caption_fade_ms: u64,

    /// Interval between animation frames
    pub frame_interval_ms: u64,

    /// Interval between progress bar updates for timed items
    pub progress_tick_ms: u64,

    /// Delay between frame attach and the first scroll measurement
    pub scroll_settle_ms: u64,

    /// Pause at each end of the bounce scroll
    pub scroll_pause_ms: u64,

    /// Scroll speed (px/s) when an item sets none
    pub default_scroll_speed: f64,

    /// Clock refresh period
    pub clock_tick_ms: u64,

    /// Position poll period for embedded external videos
    pub external_poll_ms: u64,

    /// Delay between typewriter characters
    pub typewriter_step_ms: u64,

    /// Width documents are rasterized to
    pub document_raster_width: u32,

    /// Recognition language for live captions
    pub caption_language: String,

    /// Capacity of the event broadcast channel
    pub event_capacity: usize,

    /// Weather service settings
    pub weather: WeatherConfig,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            exit_fade_ms: 500,
            default_transition_ms: 800,
            caption_fade_ms: 500,
            frame_interval_ms: 16,
            progress_tick_ms: 100,
            scroll_settle_ms: 500,
            scroll_pause_ms: 2000,
            default_scroll_speed: 30.0,
            clock_tick_ms: 1000,
            external_poll_ms: 250,
            typewriter_step_ms: 50,
            document_raster_width: 1920,
            caption_language: "pt-BR".to_string(),
            event_capacity: 64,
            weather: WeatherConfig::default(),
        }
    }
}

impl PlaybackConfig {
    /// Load configuration from an optional file plus the environment
    ///
    /// Later sources win: defaults, then the file (any format the `config`
    /// crate detects from the extension), then `EASYPLAY_*` variables such
    /// as `EASYPLAY_CLOCK_TICK_MS=500` or `EASYPLAY_WEATHER__LANGUAGE=en`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            debug!(path = %path.display(), "Loading playback config file");
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("EASYPLAY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder
            .build()
            .and_then(config::Config::try_deserialize)
            .map_err(|e| PlaybackError::Config(e.to_string()))
    }

    /// Weather client for [`Platform::forecasts`](crate::Platform::forecasts)
    ///
    /// # Errors
    ///
    /// [`PlaybackError::Weather`] when a configured base URL is unusable.
    pub fn forecast_provider(&self) -> Result<Arc<dyn ForecastProvider>> {
        let client = WeatherClient::new(self.weather.clone())?;
        Ok(Arc::new(client))
    }

    pub fn exit_fade(&self) -> Duration {
        Duration::from_millis(self.exit_fade_ms)
    }

    pub fn default_transition(&self) -> Duration {
        Duration::from_millis(self.default_transition_ms)
    }

    pub fn caption_fade(&self) -> Duration {
        Duration::from_millis(self.caption_fade_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }

    pub fn progress_tick(&self) -> Duration {
        Duration::from_millis(self.progress_tick_ms.max(1))
    }

    pub fn scroll_settle(&self) -> Duration {
        Duration::from_millis(self.scroll_settle_ms)
    }

    pub fn scroll_pause(&self) -> Duration {
        Duration::from_millis(self.scroll_pause_ms)
    }

    pub fn clock_tick(&self) -> Duration {
        Duration::from_millis(self.clock_tick_ms.max(1))
    }

    pub fn external_poll(&self) -> Duration {
        Duration::from_millis(self.external_poll_ms.max(1))
    }

    pub fn typewriter_step(&self) -> Duration {
        Duration::from_millis(self.typewriter_step_ms.max(1))
    }
}
