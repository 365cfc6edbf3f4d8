//! Renderable surfaces
//!
//! A [`Surface`] is the description of what one item puts in the viewer.
//! The host's [`Viewer`](crate::platform::Viewer) turns it into pixels and
//! receives later changes as [`SurfaceUpdate`]s and [`AnimatedProperties`].

use crate::style::VisualStyle;
use chrono::{NaiveDate, Weekday};
use easyplay_core::{BinaryHandle, DisplayMode};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Process-unique surface identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(u64);

impl SurfaceId {
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "surface-{}", self.0)
    }
}

/// One attachable unit of content
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pub id: SurfaceId,
    pub content: SurfaceContent,
    pub display_mode: DisplayMode,
    pub style: VisualStyle,
}

impl Surface {
    pub fn new(content: SurfaceContent) -> Self {
        Self {
            id: SurfaceId::next(),
            content,
            display_mode: DisplayMode::default(),
            style: VisualStyle::default(),
        }
    }

    /// Inline error shown in place of content
    pub fn diagnostic(message: impl Into<String>) -> Self {
        Self::new(SurfaceContent::Diagnostic {
            message: message.into(),
        })
    }
}

/// Decoded image dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
}

impl ImageInfo {
    pub fn aspect(self) -> f64 {
        if self.height == 0 {
            1.0
        } else {
            f64::from(self.width) / f64::from(self.height)
        }
    }
}

/// Rasterized document page (RGBA)
#[derive(Clone, PartialEq, Eq)]
pub struct Raster {
    pub width: u32,
    pub height: u32,
    pub pixels: Arc<[u8]>,
}

impl std::fmt::Debug for Raster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Raster")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

/// Page source for frame surfaces
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameSource {
    Url(String),
    File(BinaryHandle),
}

/// Initial presentation of a text surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextPresentation {
    /// Full text, no animation
    Plain,
    /// Starts empty, filled by text updates
    Typewriter,
    /// Split into words that start hidden and are animated one by one
    Words,
    /// Whole block scaled in
    Bounce,
}

/// Inline run of markdown text
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Span {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
}

/// Block-level markdown element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkdownBlock {
    /// Level 1-3
    Heading { level: u8, spans: Vec<Span> },
    Paragraph(Vec<Span>),
    /// Bullet list, one span run per entry
    List(Vec<Vec<Span>>),
}

/// One day column of a weather panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherDay {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub glyph: &'static str,
    pub max: i32,
    pub min: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherPanel {
    pub place: String,
    pub unit: String,
    pub days: Vec<WeatherDay>,
}

/// CSS-like grid template for a mosaic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridTemplate {
    pub columns: &'static str,
    pub rows: &'static str,
    /// Named areas, when the layout uses them
    pub areas: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MosaicPane {
    /// Named grid area for this pane
    pub area: Option<&'static str>,
    /// `None` leaves the cell empty
    pub surface: Option<Surface>,
}

/// Kind-specific surface body
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceContent {
    Image {
        file: BinaryHandle,
        info: ImageInfo,
    },
    /// Local video played by the media backend into this surface
    Video {
        file: BinaryHandle,
        muted: bool,
        looping: bool,
    },
    /// Audio visualizer card, with an optional caption line
    Audio {
        title: String,
        caption: Option<String>,
    },
    /// Embedded external video player
    ExternalVideo {
        video_id: String,
        muted: bool,
        looping: bool,
    },
    Frame {
        source: FrameSource,
    },
    Document {
        raster: Raster,
    },
    Markdown {
        blocks: Vec<MarkdownBlock>,
    },
    Text {
        text: String,
        color: Option<String>,
        font_size: Option<String>,
        presentation: TextPresentation,
    },
    Clock {
        text: String,
        color: Option<String>,
        font_size: Option<String>,
    },
    Weather(WeatherPanel),
    Mosaic {
        grid: GridTemplate,
        panes: Vec<MosaicPane>,
    },
    /// Caption overlay drawn above image and video surfaces
    Caption {
        text: String,
        font_size: Option<String>,
        color: Option<String>,
    },
    Diagnostic {
        message: String,
    },
}

/// Length in an animated transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    Percent(f32),
    Px(f32),
}

/// Properties written by one animation frame
///
/// Only the properties an animation drives are set; the rest keep the
/// surface's own style.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnimatedProperties {
    pub opacity: Option<f32>,
    pub translate_x: Option<Length>,
    pub translate_y: Option<Length>,
    pub scale: Option<f32>,
    pub scale_x: Option<f32>,
    pub scale_y: Option<f32>,
    /// Degrees
    pub rotate: Option<f32>,
    pub rotate_y: Option<f32>,
    pub skew_x: Option<f32>,
    pub skew_y: Option<f32>,
}

/// Live transcript shown on an audio surface
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CaptionText {
    pub final_text: String,
    pub interim: String,
}

/// In-place change to an attached surface
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceUpdate {
    /// Replace the text of a text or clock surface
    Text(String),
    /// Animate one word of a word-split text surface
    Word {
        index: usize,
        properties: AnimatedProperties,
    },
    /// Replace the transcript of an audio surface
    Caption(CaptionText),
    /// Small inline notice (blocked scrolling, caption errors)
    Notice(String),
}

/// Viewer size in logical pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn aspect(self) -> f64 {
        if self.height <= 0.0 {
            1.0
        } else {
            self.width / self.height
        }
    }
}

/// Scroll geometry of a frame surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub content_height: f64,
    pub viewport_height: f64,
    pub scroll_top: f64,
}

impl ScrollMetrics {
    pub fn max_scroll(self) -> f64 {
        (self.content_height - self.viewport_height).max(0.0)
    }
}
