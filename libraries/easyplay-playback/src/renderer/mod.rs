//! Content Renderer
//!
//! Turns one [`MediaItem`] into a [`RenderOutcome`]. Nothing in here fails
//! outward: missing input becomes [`RenderOutcome::Skip`], a failed attempt
//! at content that was present becomes [`RenderOutcome::Degraded`] with an
//! inline diagnostic surface.
//!
//! Kinds are split by family:
//! - `media`: image, video, audio (with live captions), external video
//! - `document`: PDF first page, markdown
//! - `frame`: web pages and local HTML, auto-scroll and periodic reload
//! - `text`: static text animations and the live clock
//! - `weather`: multi-day forecast panel
//! - `mosaic`: grid of recursively rendered panes

mod document;
mod frame;
mod media;
mod mosaic;
mod text;
mod weather;

pub use document::parse_markdown;
pub use media::youtube_video_id;
pub use mosaic::grid_template;
pub use text::format_clock;

use crate::platform::Platform;
use crate::progress::ProgressIndicator;
use crate::resources::ResourceBag;
use crate::surface::{Surface, SurfaceContent};
use crate::types::PlaybackConfig;
use easyplay_core::{BinaryHandle, ItemContent, MediaItem};
use futures_util::future::BoxFuture;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// Why an item produced no surface
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    /// Local binary was not restored
    #[error("content is missing")]
    Missing,

    /// Kind needs a file, URL or location and has none
    #[error("no content source")]
    NoSource,

    /// Content was present but could not be decoded or opened
    #[error("could not load content: {0}")]
    LoadFailed(String),

    /// URL does not contain a recognizable video identifier
    #[error("unrecognized video URL: {0}")]
    InvalidLocator(String),
}

/// How the engine learns that an item is done
#[derive(Debug)]
pub enum Completion {
    /// Advance after the item's declared duration
    Timed,

    /// Advance when the item signals its own end
    ///
    /// A sender dropped without sending counts as the end too.
    SelfTerminating(oneshot::Receiver<()>),
}

/// A surface ready to attach, plus everything it keeps running
#[derive(Debug)]
pub struct RenderedItem {
    pub surface: Surface,
    /// Extra surfaces entered after the main one (captions)
    pub overlays: Vec<Surface>,
    pub completion: Completion,
    pub resources: ResourceBag,
}

impl RenderedItem {
    pub fn timed(surface: Surface) -> Self {
        Self {
            surface,
            overlays: Vec::new(),
            completion: Completion::Timed,
            resources: ResourceBag::new(),
        }
    }

    fn with_resources(mut self, resources: ResourceBag) -> Self {
        self.resources = resources;
        self
    }

    fn self_terminating(mut self, done: oneshot::Receiver<()>) -> Self {
        self.completion = Completion::SelfTerminating(done);
        self
    }

    pub fn is_self_terminating(&self) -> bool {
        matches!(self.completion, Completion::SelfTerminating(_))
    }
}

/// Result of rendering one item
#[derive(Debug)]
pub enum RenderOutcome {
    /// Nothing to show; advance immediately
    Skip(SkipReason),

    Ready(RenderedItem),

    /// Diagnostic surface shown in place of the content
    Degraded {
        rendered: RenderedItem,
        message: String,
    },
}

impl RenderOutcome {
    fn degraded(message: String) -> Self {
        warn!(%message, "Rendering diagnostic surface");
        RenderOutcome::Degraded {
            rendered: RenderedItem::timed(Surface::diagnostic(message.clone())),
            message,
        }
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, RenderOutcome::Skip(_))
    }
}

/// Whether an item is the playlist entry or a mosaic pane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RenderMode {
    Main,
    /// Forced muted, loops video, no progress, completion ignored
    Pane,
}

/// Renders items against the host platform
#[derive(Clone)]
pub struct ContentRenderer {
    platform: Platform,
    progress: ProgressIndicator,
    config: Arc<PlaybackConfig>,
}

impl ContentRenderer {
    pub fn new(platform: Platform, progress: ProgressIndicator, config: Arc<PlaybackConfig>) -> Self {
        Self {
            platform,
            progress,
            config,
        }
    }

    /// Render a playlist item
    pub async fn render(&self, item: &MediaItem) -> RenderOutcome {
        self.render_as(item, RenderMode::Main).await
    }

    fn render_as<'a>(&'a self, item: &'a MediaItem, mode: RenderMode) -> BoxFuture<'a, RenderOutcome> {
        Box::pin(async move {
            if item.is_missing {
                return RenderOutcome::Skip(SkipReason::Missing);
            }
            debug!(name = %item.name, kind = %item.kind(), ?mode, "Rendering item");

            let outcome = match &item.content {
                ItemContent::Image => self.render_image(item, mode).await,
                ItemContent::Video => self.render_video(item, mode).await,
                ItemContent::Audio { auto_caption } => {
                    self.render_audio(item, *auto_caption, mode).await
                }
                ItemContent::Youtube { url } => self.render_external_video(item, url, mode),
                ItemContent::Pdf => self.render_pdf(item).await,
                ItemContent::Markdown => self.render_markdown(item).await,
                ItemContent::Web { url, frame } => self.render_web(url, frame),
                ItemContent::Html { frame } => self.render_html(item, frame),
                ItemContent::Text {
                    text,
                    color,
                    font_size,
                    text_animation,
                } => self.render_text(
                    text,
                    color.as_deref(),
                    font_size.as_deref(),
                    *text_animation,
                ),
                ItemContent::Clock { clock_config } => self.render_clock(clock_config),
                ItemContent::Weather { location, unit } => {
                    self.render_weather(location, *unit).await
                }
                ItemContent::Mosaic { layout, panes } => self.render_mosaic(*layout, panes).await,
            };

            if mode == RenderMode::Main {
                with_caption_overlay(outcome, item)
            } else {
                outcome
            }
        })
    }
}

impl std::fmt::Debug for ContentRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentRenderer")
            .field("platform", &self.platform)
            .finish_non_exhaustive()
    }
}

/// Bound handle of a local-file item
fn require_file(item: &MediaItem) -> Result<&BinaryHandle, SkipReason> {
    item.file.as_ref().ok_or(SkipReason::NoSource)
}

/// Caption text for image and video items becomes its own surface
fn with_caption_overlay(mut outcome: RenderOutcome, item: &MediaItem) -> RenderOutcome {
    let Some(text) = item.caption.text() else {
        return outcome;
    };
    if let RenderOutcome::Ready(rendered) = &mut outcome {
        if matches!(
            rendered.surface.content,
            SurfaceContent::Image { .. } | SurfaceContent::Video { .. }
        ) {
            rendered.overlays.push(Surface::new(SurfaceContent::Caption {
                text: text.to_string(),
                font_size: item.caption.caption_font_size.clone(),
                color: item.caption.caption_font_color.clone(),
            }));
        }
    }
    outcome
}
