//! Playback Engine
//!
//! Drives the playlist one item at a time. All mutable playback state lives
//! in a single [`Slot`] owned by the driver task; `play()` and `stop()` only
//! start, cancel and await that task, so at most one item is ever in flight.
//!
//! Per advance the driver:
//! 1. Releases the previous item's resources and runs every exit fade
//! 2. Moves to the next index (wrapping), skipping missing items
//! 3. Renders, attaches and runs the entrance transition
//! 4. Activates the item's resources and waits for its timer or end signal
//!
//! Cancellation drops whatever step is in progress and hands the slot back
//! so `stop()` can tear it down completely.

use crate::error::{PlaybackError, Result};
use crate::events::{EventSender, PlaybackEvent};
use crate::platform::Platform;
use crate::progress::ProgressIndicator;
use crate::renderer::{Completion, ContentRenderer, RenderOutcome, RenderedItem};
use crate::resources::ResourceBag;
use crate::style::apply_item_style;
use crate::surface::SurfaceId;
use crate::transitions::{Transition, TransitionEngine};
use crate::types::{PlaybackConfig, PlaybackState};
use easyplay_core::PlaylistSource;
use futures_util::future::join_all;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Everything owned by the item currently in flight
#[derive(Debug, Default)]
struct Slot {
    /// `None` is the position before the first item
    index: Option<usize>,
    /// Attached surfaces, main surface first
    live: Vec<SurfaceId>,
    resources: Option<ResourceBag>,
    /// Linear progress driver for timed items
    bar: Option<JoinHandle<()>>,
    /// Consecutive advances that showed nothing
    skips: usize,
}

/// How a driver task ended
#[derive(Debug)]
enum RunExit {
    /// Cancelled; the slot still needs tearing down
    Interrupted(Slot),
    /// Stopped on its own and already cleaned up
    Finished,
}

#[derive(Debug)]
struct ActiveRun {
    cancel: CancellationToken,
    task: JoinHandle<RunExit>,
}

impl ActiveRun {
    async fn interrupt(self) -> Option<Slot> {
        self.cancel.cancel();
        match self.task.await {
            Ok(RunExit::Interrupted(slot)) => Some(slot),
            Ok(RunExit::Finished) => None,
            Err(e) => {
                error!(error = %e, "Playback driver failed");
                Some(Slot::default())
            }
        }
    }
}

struct Shared {
    playlist: Arc<dyn PlaylistSource>,
    platform: Platform,
    renderer: ContentRenderer,
    transitions: TransitionEngine,
    progress: ProgressIndicator,
    config: Arc<PlaybackConfig>,
    state: watch::Sender<PlaybackState>,
    playing: AtomicBool,
    events: EventSender,
}

impl Shared {
    fn set_state(&self, state: PlaybackState) {
        let previous = self.state.send_replace(state);
        if previous != state {
            debug!(?previous, ?state, "Playback state changed");
            self.events.emit(PlaybackEvent::StateChanged { state });
        }
    }

    fn notice(&self, message: String) {
        info!(%message, "Playback notice");
        self.events.emit(PlaybackEvent::Notice { message });
    }

    fn skipped(&self, slot: &mut Slot, index: usize, reason: String) {
        warn!(index, %reason, "Skipping item");
        slot.skips += 1;
        self.events.emit(PlaybackEvent::ItemSkipped { index, reason });
    }

    /// Release resources, then fade out and detach every live surface
    async fn teardown(&self, slot: &mut Slot) {
        if let Some(bar) = slot.bar.take() {
            bar.abort();
        }
        if let Some(resources) = slot.resources.take() {
            resources.release().await;
        }
        if !slot.live.is_empty() {
            join_all(slot.live.iter().map(|&id| self.transitions.exit(id))).await;
            slot.live.clear();
        }
    }

    /// Return to the stopped baseline and give the screen back to the editor
    async fn finish(&self, mut slot: Slot) {
        self.progress.reset();
        self.progress.hide();
        self.teardown(&mut slot).await;
        self.platform.viewer.reset();
        self.playing.store(false, Ordering::SeqCst);
        self.set_state(PlaybackState::Stopped);
        self.platform.editor.set_editor_visible(true);
        info!("Playback stopped");
    }

    fn transition_duration(&self, requested: Option<u64>) -> Duration {
        requested
            .filter(|ms| *ms > 0)
            .map_or_else(|| self.config.default_transition(), Duration::from_millis)
    }
}

/// Run `future` unless `token` fires first
async fn until_cancelled<F: Future>(token: &CancellationToken, future: F) -> Option<F::Output> {
    tokio::select! {
        biased;
        () = token.cancelled() => None,
        output = future => Some(output),
    }
}

/// Advance through the playlist until cancelled or nothing is playable
async fn drive(shared: Arc<Shared>, cancel: CancellationToken) -> RunExit {
    let mut slot = Slot::default();

    loop {
        shared.set_state(PlaybackState::Transitioning);
        if until_cancelled(&cancel, shared.teardown(&mut slot))
            .await
            .is_none()
        {
            return RunExit::Interrupted(slot);
        }
        shared.progress.reset();

        let len = shared.playlist.len();
        if len == 0 {
            shared.notice(PlaybackError::EmptyPlaylist.to_string());
            shared.finish(slot).await;
            return RunExit::Finished;
        }
        if slot.skips >= len {
            warn!(len, "Full cycle without a playable item");
            shared.notice(PlaybackError::NoPlayableItems.to_string());
            shared.finish(slot).await;
            return RunExit::Finished;
        }

        let index = slot.index.map_or(0, |i| (i + 1) % len);
        slot.index = Some(index);

        let Some(item) = shared.playlist.item(index) else {
            shared.skipped(&mut slot, index, "item no longer in playlist".to_string());
            continue;
        };

        let Some(outcome) = until_cancelled(&cancel, shared.renderer.render(&item)).await else {
            return RunExit::Interrupted(slot);
        };
        let (rendered, degraded) = match outcome {
            RenderOutcome::Skip(reason) => {
                shared.skipped(&mut slot, index, reason.to_string());
                continue;
            }
            RenderOutcome::Ready(rendered) => (rendered, None),
            RenderOutcome::Degraded { rendered, message } => (rendered, Some(message)),
        };
        slot.skips = 0;

        let RenderedItem {
            mut surface,
            overlays,
            completion,
            resources,
        } = rendered;
        apply_item_style(&mut surface, &item);
        slot.resources = Some(resources);

        let transition = Transition::resolve(item.visual.transition.as_deref());
        let duration = shared.transition_duration(item.visual.transition_duration);
        slot.live.push(surface.id);
        if until_cancelled(&cancel, shared.transitions.enter(&surface, transition, duration))
            .await
            .is_none()
        {
            return RunExit::Interrupted(slot);
        }
        for overlay in &overlays {
            slot.live.push(overlay.id);
            let fade = shared
                .transitions
                .enter(overlay, Transition::FadeIn, shared.config.caption_fade());
            if until_cancelled(&cancel, fade).await.is_none() {
                return RunExit::Interrupted(slot);
            }
        }

        if let Some(resources) = slot.resources.as_mut() {
            resources.activate();
        }
        shared.set_state(PlaybackState::Showing);
        let kind = item.kind();
        info!(index, %kind, name = %item.name, "Showing item");
        match degraded {
            Some(message) => shared
                .events
                .emit(PlaybackEvent::ItemDegraded { index, message }),
            None => shared.events.emit(PlaybackEvent::ItemStarted { index, kind }),
        }

        let completed = match completion {
            Completion::SelfTerminating(done) => {
                until_cancelled(&cancel, async {
                    // A dropped sender ends the item too
                    let _ = done.await;
                })
                .await
            }
            Completion::Timed => match item.declared_duration() {
                Some(length) => {
                    slot.bar = Some(shared.progress.animate_linear(length));
                    until_cancelled(&cancel, tokio::time::sleep(length)).await
                }
                None => until_cancelled(&cancel, std::future::pending::<()>()).await,
            },
        };
        if completed.is_none() {
            return RunExit::Interrupted(slot);
        }
        debug!(index, "Item finished");
        shared.events.emit(PlaybackEvent::ItemFinished { index });
    }
}

/// Plays a playlist onto the host viewer
///
/// Public surface is `play()`, `stop()` and the read-only observers. Several
/// engines can run side by side; none of them share state.
pub struct PlaybackEngine {
    shared: Arc<Shared>,
    run: Mutex<Option<ActiveRun>>,
}

impl PlaybackEngine {
    pub fn new(playlist: Arc<dyn PlaylistSource>, platform: Platform, config: PlaybackConfig) -> Self {
        let config = Arc::new(config);
        let viewer = Arc::clone(&platform.viewer);
        let progress = ProgressIndicator::new(Arc::clone(&viewer), config.progress_tick());
        let renderer = ContentRenderer::new(platform.clone(), progress.clone(), Arc::clone(&config));
        let transitions = TransitionEngine::new(viewer, config.frame_interval(), config.exit_fade());
        let (state, _) = watch::channel(PlaybackState::Stopped);
        let events = EventSender::new(config.event_capacity);

        Self {
            shared: Arc::new(Shared {
                playlist,
                platform,
                renderer,
                transitions,
                progress,
                config,
                state,
                playing: AtomicBool::new(false),
                events,
            }),
            run: Mutex::new(None),
        }
    }

    /// Start from the first item, or restart if already playing
    ///
    /// # Errors
    ///
    /// [`PlaybackError::EmptyPlaylist`] when there is nothing to play. Any
    /// running playback is stopped first.
    pub async fn play(&self) -> Result<()> {
        let mut run = self.run.lock().await;

        if self.shared.playlist.is_empty() {
            if let Some(active) = run.take() {
                if let Some(slot) = active.interrupt().await {
                    self.shared.finish(slot).await;
                }
            }
            self.shared.notice(PlaybackError::EmptyPlaylist.to_string());
            return Err(PlaybackError::EmptyPlaylist);
        }

        let restart = match run.take() {
            Some(active) => match active.interrupt().await {
                Some(mut slot) => {
                    self.shared.progress.reset();
                    self.shared.teardown(&mut slot).await;
                    true
                }
                None => false,
            },
            None => false,
        };

        if restart {
            info!("Restarting playback from the first item");
        } else {
            info!(items = self.shared.playlist.len(), "Starting playback");
            self.shared.platform.editor.set_editor_visible(false);
            self.shared.progress.show();
        }

        self.shared.playing.store(true, Ordering::SeqCst);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(drive(Arc::clone(&self.shared), cancel.clone()));
        *run = Some(ActiveRun { cancel, task });
        Ok(())
    }

    /// Stop playback and release everything the current item holds
    ///
    /// Resolves once every surface has faded out and the viewer is back at
    /// its baseline. A no-op when already stopped.
    pub async fn stop(&self) {
        let mut run = self.run.lock().await;
        let Some(active) = run.take() else {
            debug!("Stop requested while stopped");
            return;
        };
        if let Some(slot) = active.interrupt().await {
            self.shared.finish(slot).await;
        }
    }

    pub fn is_playing(&self) -> bool {
        self.shared.playing.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> PlaybackState {
        *self.shared.state.borrow()
    }

    /// Follow state changes
    pub fn watch_state(&self) -> watch::Receiver<PlaybackState> {
        self.shared.state.subscribe()
    }

    /// Subscribe to playback events
    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.shared.events.subscribe()
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.shared.config
    }
}

impl Drop for PlaybackEngine {
    fn drop(&mut self) {
        if let Some(active) = self.run.get_mut().take() {
            active.cancel.cancel();
        }
    }
}

impl std::fmt::Debug for PlaybackEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackEngine")
            .field("playing", &self.is_playing())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
