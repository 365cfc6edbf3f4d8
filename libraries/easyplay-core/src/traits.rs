/// Core traits for EasyPlay
use crate::types::MediaItem;
use std::sync::{PoisonError, RwLock};

use crate::playlist::Playlist;

/// Read accessor over the ordered playlist
///
/// The playback engine only ever reads through this trait, and only at
/// idle points (start of `play`, between items), so implementations may
/// return snapshots.
pub trait PlaylistSource: Send + Sync {
    /// Current items in playback order
    fn ordered_items(&self) -> Vec<MediaItem>;

    /// Item at `index`, if it exists
    fn item(&self, index: usize) -> Option<MediaItem>;

    /// Number of items
    fn len(&self) -> usize {
        self.ordered_items().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PlaylistSource for RwLock<Playlist> {
    fn ordered_items(&self) -> Vec<MediaItem> {
        self.read()
            .unwrap_or_else(PoisonError::into_inner)
            .items()
            .to_vec()
    }

    fn item(&self, index: usize) -> Option<MediaItem> {
        self.read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(index)
            .cloned()
    }

    fn len(&self) -> usize {
        self.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl PlaylistSource for Vec<MediaItem> {
    fn ordered_items(&self) -> Vec<MediaItem> {
        self.clone()
    }

    fn item(&self, index: usize) -> Option<MediaItem> {
        self.get(index).cloned()
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }
}
