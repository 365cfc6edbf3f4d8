//! Ordered playlist store
//!
//! Insertion order is playback order; the only reordering is through the
//! explicit move operations. Binary handles are dropped on export, so a
//! restored or imported playlist flags every local-file item as missing
//! until the host rebinds it.

use crate::error::{CoreError, Result};
use crate::types::{BinaryHandle, MediaItem};
use tracing::{debug, info};

/// Ordered collection of media items
#[derive(Debug, Clone, Default)]
pub struct Playlist {
    items: Vec<MediaItem>,
}

impl Playlist {
    /// Create an empty playlist
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a playlist from items, recomputing their missing flags
    pub fn from_items(items: Vec<MediaItem>) -> Self {
        let mut playlist = Self { items };
        playlist.refresh_missing();
        playlist
    }

    /// Restore a playlist persisted with [`Playlist::export_json`]
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if !value.is_array() {
            return Err(CoreError::InvalidFormat(
                "expected a JSON array of items".to_string(),
            ));
        }
        let items: Vec<MediaItem> = serde_json::from_value(value)?;
        let playlist = Self::from_items(items);
        info!(
            items = playlist.len(),
            missing = playlist.missing_items().count(),
            "Restored playlist"
        );
        Ok(playlist)
    }

    /// Replace the whole playlist with an imported document
    pub fn import_json(&mut self, json: &str) -> Result<()> {
        *self = Self::from_json(json)?;
        Ok(())
    }

    /// Serialize without binary handles or missing flags
    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.items)?)
    }

    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&MediaItem> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append an item to the end
    pub fn add(&mut self, mut item: MediaItem) {
        item.refresh_missing();
        debug!(name = %item.name, kind = %item.kind(), "Adding playlist item");
        self.items.push(item);
    }

    /// Replace the item at `index`
    ///
    /// The previous binary handle is kept unless the new item brings its own.
    pub fn update(&mut self, index: usize, mut item: MediaItem) -> Result<()> {
        let len = self.items.len();
        let slot = self
            .items
            .get_mut(index)
            .ok_or(CoreError::IndexOutOfBounds { index, len })?;
        if item.file.is_none() {
            item.file = slot.file.take();
        }
        item.refresh_missing();
        *slot = item;
        Ok(())
    }

    /// Remove and return the item at `index`
    pub fn remove(&mut self, index: usize) -> Option<MediaItem> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Swap the item with its predecessor; no-op at the top
    pub fn move_up(&mut self, index: usize) {
        if index > 0 && index < self.items.len() {
            self.items.swap(index - 1, index);
        }
    }

    /// Swap the item with its successor; no-op at the bottom
    pub fn move_down(&mut self, index: usize) {
        if index + 1 < self.items.len() {
            self.items.swap(index, index + 1);
        }
    }

    /// Items whose local binary still needs to be located
    pub fn missing_items(&self) -> impl Iterator<Item = (usize, &MediaItem)> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.is_missing)
    }

    /// Bind a located binary to the item at `index`
    pub fn rebind(&mut self, index: usize, handle: BinaryHandle) -> Result<()> {
        let len = self.items.len();
        let item = self
            .items
            .get_mut(index)
            .ok_or(CoreError::IndexOutOfBounds { index, len })?;
        if !item.kind().uses_local_file() {
            return Err(CoreError::invalid_input(format!(
                "{} items do not take a local file",
                item.kind()
            )));
        }
        item.file = Some(handle);
        item.refresh_missing();
        Ok(())
    }

    fn refresh_missing(&mut self) {
        for item in &mut self.items {
            item.refresh_missing();
        }
    }
}
