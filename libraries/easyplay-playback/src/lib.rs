//! EasyPlay - Playback Engine
//!
//! Platform-agnostic signage playback for EasyPlay.
//!
//! This crate provides:
//! - Sequential, wrapping playback of a playlist with missing-item skipping
//! - Per-kind rendering (image, video, audio, PDF, markdown, web, HTML,
//!   external video, text, clock, weather, mosaic)
//! - Named entrance transitions and a fixed exit fade
//! - A progress bar driven by timers or real media positions
//! - Explicit per-item resource bags released on every teardown path
//!
//! # Architecture
//!
//! `easyplay-playback` never touches a real screen, decoder or network
//! socket. The host supplies a [`Platform`]:
//! - [`Viewer`]: attaches surfaces and applies animation frames
//! - [`AssetLoader`]: probes images, reads text, rasterizes PDF pages
//! - [`MediaBackend`]: opens local and external media sessions
//! - [`CaptionService`]: optional speech recognition for audio captions
//! - [`ForecastProvider`]: weather lookups (see `easyplay-weather`)
//! - [`EditorVisibility`]: hides the editor while playing
//!
//! # Example: Configuration
//!
//! ```rust
//! use easyplay_playback::{PlaybackConfig, Transition};
//! use std::time::Duration;
//!
//! let config = PlaybackConfig::default();
//! assert_eq!(config.exit_fade(), Duration::from_millis(500));
//!
//! // Unknown names fall back to a fade
//! assert_eq!(Transition::resolve(Some("zoomIn")), Transition::ZoomIn);
//! assert_eq!(Transition::resolve(Some("wobble")), Transition::FadeIn);
//! ```
//!
//! # Example: Host Integration
//!
//! ```rust,ignore
//! use easyplay_core::Playlist;
//! use easyplay_playback::{PlaybackConfig, PlaybackEngine, Platform};
//! use std::sync::{Arc, RwLock};
//!
//! let config = PlaybackConfig::load(None)?;
//! let playlist = Arc::new(RwLock::new(Playlist::from_json(&saved)?));
//! let platform = Platform {
//!     viewer: Arc::new(MyViewer::new()),
//!     assets: Arc::new(MyAssets::new()),
//!     media: Arc::new(MyMedia::new()),
//!     captions: None,
//!     forecasts: config.forecast_provider()?,
//!     editor: Arc::new(MyEditor::new()),
//! };
//!
//! let engine = PlaybackEngine::new(playlist, platform, config);
//! engine.play().await?;
//! // ...
//! engine.stop().await;
//! ```

#![forbid(unsafe_code)]

mod engine;
mod error;
mod events;
pub mod platform;
mod progress;
pub mod renderer;
mod resources;
pub mod style;
pub mod surface;
pub mod transitions;
pub mod types;

// Public exports
pub use engine::PlaybackEngine;
pub use error::{PlaybackError, Result};
pub use events::PlaybackEvent;
pub use platform::{
    AssetLoader, BackendError, CaptionError, CaptionEvent, CaptionService, CaptionSession,
    EditorVisibility, FrameAccessError, MediaBackend, MediaEvent, MediaPosition, MediaRequest,
    MediaSession, MediaSource, Platform, Session, SessionControl, Viewer,
};
pub use progress::ProgressIndicator;
pub use renderer::{Completion, ContentRenderer, RenderOutcome, RenderedItem, SkipReason};
pub use resources::ResourceBag;
pub use transitions::{Easing, Transition, TransitionEngine};
pub use types::{PlaybackConfig, PlaybackState};

pub use easyplay_weather::ForecastProvider;
