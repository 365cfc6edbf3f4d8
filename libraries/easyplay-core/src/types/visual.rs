//! Per-item visual attributes

use serde::{Deserialize, Serialize};

/// How a surface is fitted into the viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Natural size, centered
    Native,
    /// Fill the viewer ignoring aspect ratio
    Stretch,
    /// Cover the viewer, cropping overflow
    #[default]
    Zoom,
    /// Fit inside the viewer, letterboxed
    Contain,
    /// Fill one axis and pan along the overflowing one
    Pan,
}

/// Visual styling and entrance settings shared by every item kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualAttributes {
    #[serde(default)]
    pub display_mode: DisplayMode,

    /// Entrance transition name (unknown or absent falls back to a fade)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<String>,

    /// Entrance transition duration in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition_duration: Option<u64>,

    /// CSS-style color, `#000000` means "no background"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,

    /// 0.0 - 1.0
    #[serde(default = "default_unit")]
    pub opacity: f32,

    #[serde(default = "default_unit")]
    pub scale: f32,

    /// Degrees
    #[serde(default)]
    pub rotate: f32,

    /// Pixels
    #[serde(default)]
    pub blur: f32,

    /// Percent, 100 = unchanged
    #[serde(default = "default_percent")]
    pub brightness: f32,

    #[serde(default = "default_percent")]
    pub contrast: f32,

    #[serde(default = "default_percent")]
    pub saturate: f32,
}

fn default_unit() -> f32 {
    1.0
}

fn default_percent() -> f32 {
    100.0
}

impl Default for VisualAttributes {
    fn default() -> Self {
        Self {
            display_mode: DisplayMode::default(),
            transition: None,
            transition_duration: None,
            background_color: None,
            opacity: default_unit(),
            scale: default_unit(),
            rotate: 0.0,
            blur: 0.0,
            brightness: default_percent(),
            contrast: default_percent(),
            saturate: default_percent(),
        }
    }
}

/// Optional caption drawn over image and video items
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption_font_size: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption_font_color: Option<String>,
}

impl CaptionStyle {
    /// Caption text, if one is set and not blank
    pub fn text(&self) -> Option<&str> {
        self.caption.as_deref().filter(|text| !text.trim().is_empty())
    }
}
