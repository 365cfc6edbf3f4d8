//! Playlist item model

use super::ids::{BinaryHandle, ItemId};
use super::visual::{CaptionStyle, VisualAttributes};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Content kind tag, used for logging and events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Image,
    Video,
    Audio,
    Web,
    Html,
    Pdf,
    Youtube,
    Text,
    Clock,
    Mosaic,
    Weather,
    Markdown,
}

impl ItemKind {
    /// Kinds whose content is a locally picked binary
    pub fn uses_local_file(self) -> bool {
        matches!(
            self,
            ItemKind::Image
                | ItemKind::Video
                | ItemKind::Audio
                | ItemKind::Pdf
                | ItemKind::Html
                | ItemKind::Markdown
        )
    }

    /// Kinds that end on their own instead of by timer
    pub fn is_self_terminating(self) -> bool {
        matches!(self, ItemKind::Video | ItemKind::Audio | ItemKind::Youtube)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ItemKind::Image => "image",
            ItemKind::Video => "video",
            ItemKind::Audio => "audio",
            ItemKind::Web => "web",
            ItemKind::Html => "html",
            ItemKind::Pdf => "pdf",
            ItemKind::Youtube => "youtube",
            ItemKind::Text => "text",
            ItemKind::Clock => "clock",
            ItemKind::Mosaic => "mosaic",
            ItemKind::Weather => "weather",
            ItemKind::Markdown => "markdown",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Clock display format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ClockFormat {
    #[serde(rename = "12h")]
    TwelveHour,
    #[default]
    #[serde(rename = "24h")]
    TwentyFourHour,
    /// Date and time
    #[serde(rename = "date")]
    DateTime,
    #[serde(rename = "date-only")]
    DateOnly,
}

/// Live clock configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockConfig {
    #[serde(default)]
    pub format: ClockFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Temperature unit for weather lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

/// Presentation style for static text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextAnimation {
    #[default]
    None,
    /// One character every 50ms
    Typewriter,
    FadeInWords,
    SlideInWords,
    BounceIn,
}

/// Grid template for multi-pane mosaics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MosaicLayout {
    #[serde(rename = "2-vert")]
    TwoVertical,
    #[serde(rename = "2-horiz")]
    TwoHorizontal,
    /// Large pane on the left, two small on the right
    #[serde(rename = "3-L2S")]
    LargeLeftTwoSmall,
    /// Two small panes on the left, large on the right
    #[serde(rename = "3-R2S")]
    LargeRightTwoSmall,
    #[serde(rename = "3-vert")]
    ThreeVertical,
    #[serde(rename = "3-horiz")]
    ThreeHorizontal,
    #[serde(rename = "1-top-2-bottom")]
    OneTopTwoBottom,
    #[serde(rename = "2x2")]
    Grid2x2,
}

impl MosaicLayout {
    /// Number of panes the template is designed for
    pub fn pane_count(self) -> usize {
        match self {
            MosaicLayout::TwoVertical | MosaicLayout::TwoHorizontal => 2,
            MosaicLayout::Grid2x2 => 4,
            _ => 3,
        }
    }
}

/// Options shared by embedded page kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameOptions {
    #[serde(default)]
    pub auto_scroll: bool,

    /// Pixels per second
    #[serde(default = "default_scroll_speed")]
    pub scroll_speed: f64,

    /// Seconds between reloads, 0 disables
    #[serde(default)]
    pub refresh_interval: u64,
}

fn default_scroll_speed() -> f64 {
    30.0
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self {
            auto_scroll: false,
            scroll_speed: default_scroll_speed(),
            refresh_interval: 0,
        }
    }
}

/// Kind-specific configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ItemContent {
    Image,
    Video,
    Audio {
        #[serde(default, rename = "autoCaption")]
        auto_caption: bool,
    },
    Web {
        url: String,
        #[serde(flatten)]
        frame: FrameOptions,
    },
    Html {
        #[serde(flatten)]
        frame: FrameOptions,
    },
    Pdf,
    Youtube {
        url: String,
    },
    #[serde(rename_all = "camelCase")]
    Text {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        font_size: Option<String>,
        #[serde(default)]
        text_animation: TextAnimation,
    },
    #[serde(rename_all = "camelCase")]
    Clock {
        #[serde(default)]
        clock_config: ClockConfig,
    },
    Mosaic {
        layout: MosaicLayout,
        /// `None` is an empty pane
        #[serde(default)]
        panes: Vec<Option<MediaItem>>,
    },
    Weather {
        location: String,
        #[serde(default)]
        unit: TemperatureUnit,
    },
    Markdown,
}

impl ItemContent {
    pub fn kind(&self) -> ItemKind {
        match self {
            ItemContent::Image => ItemKind::Image,
            ItemContent::Video => ItemKind::Video,
            ItemContent::Audio { .. } => ItemKind::Audio,
            ItemContent::Web { .. } => ItemKind::Web,
            ItemContent::Html { .. } => ItemKind::Html,
            ItemContent::Pdf => ItemKind::Pdf,
            ItemContent::Youtube { .. } => ItemKind::Youtube,
            ItemContent::Text { .. } => ItemKind::Text,
            ItemContent::Clock { .. } => ItemKind::Clock,
            ItemContent::Mosaic { .. } => ItemKind::Mosaic,
            ItemContent::Weather { .. } => ItemKind::Weather,
            ItemContent::Markdown => ItemKind::Markdown,
        }
    }
}

/// Where an item's content comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceRef<'a> {
    /// Locally picked binary
    Handle(&'a BinaryHandle),
    /// Remote URL
    Locator(&'a str),
    /// Generated content (text, clock, weather, mosaic) or an unbound local file
    None,
}

/// The unit of playback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    #[serde(default)]
    pub id: ItemId,

    #[serde(default)]
    pub name: String,

    #[serde(flatten)]
    pub content: ItemContent,

    /// Seconds; 0 means "until the item ends on its own"
    #[serde(default)]
    pub duration: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muted: Option<bool>,

    #[serde(flatten)]
    pub visual: VisualAttributes,

    #[serde(flatten)]
    pub caption: CaptionStyle,

    /// Bound binary for local-file kinds; never persisted
    #[serde(skip)]
    pub file: Option<BinaryHandle>,

    /// Local binary was not restored after reload
    #[serde(skip)]
    pub is_missing: bool,
}

impl MediaItem {
    /// Create an item with default styling and no duration
    pub fn new(name: impl Into<String>, content: ItemContent) -> Self {
        Self {
            id: ItemId::generate(),
            name: name.into(),
            content,
            duration: 0.0,
            muted: None,
            visual: VisualAttributes::default(),
            caption: CaptionStyle::default(),
            file: None,
            is_missing: false,
        }
    }

    /// Bind a local binary
    #[must_use]
    pub fn with_file(mut self, handle: BinaryHandle) -> Self {
        self.file = Some(handle);
        self.is_missing = false;
        self
    }

    #[must_use]
    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration = seconds;
        self
    }

    #[must_use]
    pub fn with_transition(mut self, name: impl Into<String>, duration_ms: u64) -> Self {
        self.visual.transition = Some(name.into());
        self.visual.transition_duration = Some(duration_ms);
        self
    }

    #[must_use]
    pub fn with_caption(mut self, text: impl Into<String>) -> Self {
        self.caption.caption = Some(text.into());
        self
    }

    pub fn kind(&self) -> ItemKind {
        self.content.kind()
    }

    /// Declared duration, `None` when unset, zero or beyond what `Duration` holds
    pub fn declared_duration(&self) -> Option<Duration> {
        if self.duration > 0.0 {
            Duration::try_from_secs_f64(self.duration).ok()
        } else {
            None
        }
    }

    /// Whether the item should play muted
    ///
    /// Audio defaults to audible, every other kind to muted.
    pub fn is_muted(&self) -> bool {
        self.muted.unwrap_or(self.kind() != ItemKind::Audio)
    }

    /// Content source for this item
    pub fn source(&self) -> SourceRef<'_> {
        match &self.content {
            ItemContent::Web { url, .. } | ItemContent::Youtube { url } => {
                SourceRef::Locator(url.as_str())
            }
            content if content.kind().uses_local_file() => {
                self.file.as_ref().map_or(SourceRef::None, SourceRef::Handle)
            }
            _ => SourceRef::None,
        }
    }

    /// Recompute `is_missing` from the bound handle (and panes for mosaics)
    ///
    /// Returns the new value.
    pub fn refresh_missing(&mut self) -> bool {
        self.is_missing = match &mut self.content {
            ItemContent::Mosaic { panes, .. } => panes
                .iter_mut()
                .flatten()
                .fold(false, |missing, pane| pane.refresh_missing() || missing),
            content if content.kind().uses_local_file() => self.file.is_none(),
            _ => false,
        };
        self.is_missing
    }
}
