//! Domain types for EasyPlay

mod ids;
mod item;
mod visual;

pub use ids::{BinaryHandle, ItemId};
pub use item::{
    ClockConfig, ClockFormat, FrameOptions, ItemContent, ItemKind, MediaItem, MosaicLayout,
    SourceRef, TemperatureUnit, TextAnimation,
};
pub use visual::{CaptionStyle, DisplayMode, VisualAttributes};
