//! EasyPlay Core
//!
//! Platform-agnostic media item model and playlist store for EasyPlay.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `MediaItem`, `ItemContent`, visual attributes, mosaic layouts
//! - **Core Traits**: `PlaylistSource`, the read accessor the playback engine consumes
//! - **Playlist Store**: ordered in-memory collection with JSON import/export
//! - **Error Handling**: `CoreError` and `Result`
//!
//! # Example
//!
//! ```rust
//! use easyplay_core::{BinaryHandle, ItemContent, MediaItem, Playlist};
//!
//! let mut playlist = Playlist::new();
//! playlist.add(
//!     MediaItem::new("logo.png", ItemContent::Image)
//!         .with_file(BinaryHandle::new("blob-1", "logo.png"))
//!         .with_duration(10.0),
//! );
//!
//! // Binary handles are never persisted, so a reload flags the image missing
//! let json = playlist.export_json().unwrap();
//! let restored = Playlist::from_json(&json).unwrap();
//! assert_eq!(restored.missing_items().count(), 1);
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod playlist;
pub mod traits;
pub mod types;

pub use error::{CoreError, Result};
pub use playlist::Playlist;
pub use traits::PlaylistSource;
pub use types::{
    BinaryHandle, CaptionStyle, ClockConfig, ClockFormat, DisplayMode, FrameOptions, ItemContent,
    ItemId, ItemKind, MediaItem, MosaicLayout, SourceRef, TemperatureUnit, TextAnimation,
    VisualAttributes,
};
