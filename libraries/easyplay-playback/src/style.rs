//! Style Applicator
//!
//! Maps an item's visual attributes onto its surface. Only values that
//! differ from the neutral default are emitted, so an untouched item
//! produces an empty [`VisualStyle`] and the host applies nothing.

use crate::surface::Surface;
use easyplay_core::{MediaItem, VisualAttributes};
use std::fmt;

/// Background value that means "leave the viewer background alone"
const NO_BACKGROUND: &str = "#000000";

/// One CSS-style filter function
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Filter {
    /// Pixels
    Blur(f32),
    /// Percent
    Brightness(f32),
    Contrast(f32),
    Saturate(f32),
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Blur(px) => write!(f, "blur({px}px)"),
            Filter::Brightness(pct) => write!(f, "brightness({pct}%)"),
            Filter::Contrast(pct) => write!(f, "contrast({pct}%)"),
            Filter::Saturate(pct) => write!(f, "saturate({pct}%)"),
        }
    }
}

/// One static transform function
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transform {
    Scale(f32),
    /// Degrees
    Rotate(f32),
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transform::Scale(factor) => write!(f, "scale({factor})"),
            Transform::Rotate(deg) => write!(f, "rotate({deg}deg)"),
        }
    }
}

/// Resolved static style for a surface
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisualStyle {
    pub background_color: Option<String>,
    pub opacity: Option<f32>,
    pub filters: Vec<Filter>,
    pub transforms: Vec<Transform>,
}

impl VisualStyle {
    /// Compute the non-default style for a set of attributes
    pub fn from_attributes(visual: &VisualAttributes) -> Self {
        let background_color = visual
            .background_color
            .as_deref()
            .filter(|color| !color.is_empty() && !color.eq_ignore_ascii_case(NO_BACKGROUND))
            .map(str::to_string);

        // Unreadable opacity counts as opaque
        let opacity = if visual.opacity.is_finite() {
            visual.opacity.clamp(0.0, 1.0)
        } else {
            1.0
        };
        let opacity = (opacity < 1.0).then_some(opacity);

        let mut filters = Vec::new();
        if visual.blur > 0.0 {
            filters.push(Filter::Blur(visual.blur));
        }
        if visual.brightness != 100.0 {
            filters.push(Filter::Brightness(visual.brightness));
        }
        if visual.contrast != 100.0 {
            filters.push(Filter::Contrast(visual.contrast));
        }
        if visual.saturate != 100.0 {
            filters.push(Filter::Saturate(visual.saturate));
        }

        let mut transforms = Vec::new();
        if visual.scale != 1.0 {
            transforms.push(Transform::Scale(visual.scale));
        }
        if visual.rotate != 0.0 {
            transforms.push(Transform::Rotate(visual.rotate));
        }

        Self {
            background_color,
            opacity,
            filters,
            transforms,
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// `filter` value, e.g. `blur(2px) contrast(120%)`
    pub fn filter_css(&self) -> Option<String> {
        join(&self.filters)
    }

    /// `transform` value, e.g. `scale(1.2) rotate(5deg)`
    pub fn transform_css(&self) -> Option<String> {
        join(&self.transforms)
    }
}

fn join<T: fmt::Display>(parts: &[T]) -> Option<String> {
    if parts.is_empty() {
        return None;
    }
    Some(
        parts
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" "),
    )
}

/// Apply an item's display mode and visual attributes to its surface
pub fn apply_item_style(surface: &mut Surface, item: &MediaItem) {
    surface.display_mode = item.visual.display_mode;
    surface.style = VisualStyle::from_attributes(&item.visual);
}
