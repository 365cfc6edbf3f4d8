//! Platform seams
//!
//! The engine never touches a display, decoder or network stack directly.
//! Hosts implement these traits (a browser shell, a native compositor, or
//! the recording fakes used in tests) and hand them over as a [`Platform`].

use crate::surface::{
    AnimatedProperties, ImageInfo, Raster, ScrollMetrics, Surface, SurfaceId, SurfaceUpdate,
    Viewport,
};
use async_trait::async_trait;
use easyplay_core::BinaryHandle;
use easyplay_weather::ForecastProvider;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;

/// Failure reported by a host backend
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct BackendError(pub String);

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Why a frame's scroll geometry could not be read
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum FrameAccessError {
    /// Page content belongs to another origin
    #[error("frame content is cross-origin")]
    CrossOrigin,

    /// Page has not finished loading
    #[error("frame has not loaded")]
    NotLoaded,

    /// Surface is no longer attached
    #[error("frame is detached")]
    Detached,
}

/// The display container the engine owns while playing
///
/// Calls are synchronous and cheap; anything slow belongs in the host.
pub trait Viewer: Send + Sync {
    /// Current size of the display area
    fn viewport(&self) -> Viewport;

    /// Add a surface on top of the current content
    fn attach(&self, surface: &Surface);

    /// Remove a surface
    fn detach(&self, id: SurfaceId);

    /// Write one animation frame
    fn animate(&self, id: SurfaceId, properties: &AnimatedProperties);

    /// Change an attached surface in place
    fn update(&self, id: SurfaceId, update: SurfaceUpdate);

    fn frame_metrics(&self, id: SurfaceId) -> Result<ScrollMetrics, FrameAccessError>;

    fn scroll_frame_to(&self, id: SurfaceId, top: f64);

    fn reload_frame(&self, id: SurfaceId);

    /// Progress bar width, 0.0 - 1.0
    fn set_progress(&self, fraction: f64);

    fn set_progress_visible(&self, visible: bool);

    /// Clear everything except the persisted watermark
    fn reset(&self);
}

/// Decoders for local binaries
#[async_trait]
pub trait AssetLoader: Send + Sync {
    /// Decode an image far enough to know its size
    async fn probe_image(&self, file: &BinaryHandle) -> Result<ImageInfo, BackendError>;

    /// Read a binary as UTF-8 text
    async fn read_text(&self, file: &BinaryHandle) -> Result<String, BackendError>;

    /// Unscaled size of a document page (1-based)
    async fn page_size(&self, file: &BinaryHandle, page: u32) -> Result<(f64, f64), BackendError>;

    /// Rasterize a document page at `scale`
    async fn rasterize_page(
        &self,
        file: &BinaryHandle,
        page: u32,
        scale: f64,
    ) -> Result<Raster, BackendError>;
}

/// What a media session plays
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    File(BinaryHandle),
    /// Embedded external player, by video identifier
    External(String),
}

/// Request to start playback into a surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRequest {
    pub surface: SurfaceId,
    pub source: MediaSource,
    pub muted: bool,
    pub looping: bool,
}

/// Playback position of a media session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaPosition {
    pub current: Duration,
    pub total: Duration,
}

impl MediaPosition {
    /// Played fraction, `None` while the total is unknown
    pub fn fraction(self) -> Option<f64> {
        (!self.total.is_zero())
            .then(|| (self.current.as_secs_f64() / self.total.as_secs_f64()).clamp(0.0, 1.0))
    }
}

/// Events pushed by a media session
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    Playing,
    TimeUpdate(MediaPosition),
    Ended,
    Error(String),
}

/// Control side of a playing session
pub trait SessionControl: Send + Sync {
    /// Polled position, for players that do not push time updates
    fn position(&self) -> Option<MediaPosition> {
        None
    }

    /// Whether the session is still producing output
    fn is_active(&self) -> bool;

    /// Stop the session; idempotent
    fn stop(&self);
}

/// A running media or caption session
///
/// Dropping the session stops it, so a session held by a cancelled task
/// never outlives that task.
pub struct Session<E> {
    pub events: mpsc::UnboundedReceiver<E>,
    control: Arc<dyn SessionControl>,
}

impl<E> Session<E> {
    pub fn new(events: mpsc::UnboundedReceiver<E>, control: Arc<dyn SessionControl>) -> Self {
        Self { events, control }
    }

    pub fn control(&self) -> Arc<dyn SessionControl> {
        Arc::clone(&self.control)
    }
}

impl<E> Drop for Session<E> {
    fn drop(&mut self) {
        self.control.stop();
    }
}

impl<E> std::fmt::Debug for Session<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("active", &self.control.is_active())
            .finish_non_exhaustive()
    }
}

pub type MediaSession = Session<MediaEvent>;

/// Video, audio and embedded external players
#[async_trait]
pub trait MediaBackend: Send + Sync {
    async fn open(&self, request: MediaRequest) -> Result<MediaSession, BackendError>;
}

/// Reasons a caption session reports failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptionError {
    /// Microphone permission refused
    #[error("not allowed")]
    NotAllowed,

    /// Recognition heard nothing; harmless
    #[error("no speech")]
    NoSpeech,

    #[error("{0}")]
    Other(String),
}

/// Events pushed by a caption session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptionEvent {
    Transcript { final_text: String, interim: String },
    Error(CaptionError),
    /// Recognition stopped on its own
    Ended,
}

pub type CaptionSession = Session<CaptionEvent>;

/// Live speech-to-text
#[async_trait]
pub trait CaptionService: Send + Sync {
    async fn start(&self, language: &str) -> Result<CaptionSession, CaptionError>;
}

/// The editor collaborator that hides while playing
pub trait EditorVisibility: Send + Sync {
    fn set_editor_visible(&self, visible: bool);
}

/// Everything the engine needs from its host
#[derive(Clone)]
pub struct Platform {
    pub viewer: Arc<dyn Viewer>,
    pub assets: Arc<dyn AssetLoader>,
    pub media: Arc<dyn MediaBackend>,
    /// `None` when the host has no speech recognition
    pub captions: Option<Arc<dyn CaptionService>>,
    pub forecasts: Arc<dyn ForecastProvider>,
    pub editor: Arc<dyn EditorVisibility>,
}

impl std::fmt::Debug for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Platform")
            .field("captions", &self.captions.is_some())
            .finish_non_exhaustive()
    }
}
