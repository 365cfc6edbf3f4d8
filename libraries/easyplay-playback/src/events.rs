//! Playback Events
//!
//! Event-based communication for hosts watching the engine. Events are
//! emitted at key points:
//! - State changes (stopped/transitioning/showing)
//! - Item lifecycle (started, skipped, degraded, finished)
//! - User-facing notices (empty playlist, nothing playable)

use crate::types::PlaybackState;
use easyplay_core::ItemKind;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

/// Events emitted by the playback engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// Engine state changed
    StateChanged {
        /// The new state
        state: PlaybackState,
    },

    /// An item's surface is live
    ItemStarted {
        /// Playlist index
        index: usize,
        kind: ItemKind,
    },

    /// An item was passed over without rendering
    ItemSkipped {
        index: usize,
        /// Human-readable reason
        reason: String,
    },

    /// An item is showing a diagnostic instead of its content
    ItemDegraded { index: usize, message: String },

    /// An item reached its timer or natural end
    ItemFinished { index: usize },

    /// Message meant for the operator
    Notice { message: String },
}

/// Broadcast fan-out for playback events
#[derive(Debug, Clone)]
pub(crate) struct EventSender {
    tx: broadcast::Sender<PlaybackEvent>,
}

impl EventSender {
    pub(crate) fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.tx.subscribe()
    }

    /// Send to current subscribers; having none is not an error
    pub(crate) fn emit(&self, event: PlaybackEvent) {
        if self.tx.send(event).is_err() {
            trace!("No playback event subscribers");
        }
    }
}
