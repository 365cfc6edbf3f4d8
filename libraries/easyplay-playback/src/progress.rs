//! Progress Indicator
//!
//! A thin bar along the viewer edge. Timed items drive it with
//! [`ProgressIndicator::animate_linear`]; self-terminating media push real
//! positions through [`ProgressIndicator::set_fraction`]. Every reset bumps
//! a generation counter so a superseded linear driver can never write
//! again, even if it is mid-tick.

use crate::platform::Viewer;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::trace;

#[derive(Debug, Default)]
struct DriverState {
    generation: u64,
}

/// Shared handle to the viewer's progress bar
#[derive(Clone)]
pub struct ProgressIndicator {
    viewer: Arc<dyn Viewer>,
    tick: Duration,
    state: Arc<Mutex<DriverState>>,
}

impl ProgressIndicator {
    pub fn new(viewer: Arc<dyn Viewer>, tick: Duration) -> Self {
        Self {
            viewer,
            tick,
            state: Arc::new(Mutex::new(DriverState::default())),
        }
    }

    /// Stop any running driver and empty the bar
    pub fn reset(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.generation += 1;
        self.viewer.set_progress(0.0);
    }

    pub fn show(&self) {
        self.viewer.set_progress_visible(true);
    }

    pub fn hide(&self) {
        self.viewer.set_progress_visible(false);
    }

    /// Set an exact fraction (clamped to 0.0 - 1.0)
    pub fn set_fraction(&self, fraction: f64) {
        if fraction.is_finite() {
            self.viewer.set_progress(fraction.clamp(0.0, 1.0));
        }
    }

    /// Fill the bar from 0 to 100% over `duration`
    ///
    /// Replaces any earlier driver. The returned task ends on its own when
    /// the bar is full or the next `reset()` happens.
    pub fn animate_linear(&self, duration: Duration) -> tokio::task::JoinHandle<()> {
        let generation = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.generation += 1;
            state.generation
        };
        let this = self.clone();

        tokio::spawn(async move {
            let start = Instant::now();
            let mut ticker = tokio::time::interval(this.tick);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                let fraction = if duration.is_zero() {
                    1.0
                } else {
                    (start.elapsed().as_secs_f64() / duration.as_secs_f64()).min(1.0)
                };
                if !this.write_if_current(generation, fraction) {
                    trace!(generation, "Progress driver superseded");
                    break;
                }
                if fraction >= 1.0 {
                    break;
                }
            }
        })
    }

    fn write_if_current(&self, generation: u64, fraction: f64) -> bool {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.generation != generation {
            return false;
        }
        self.viewer.set_progress(fraction);
        true
    }
}

impl std::fmt::Debug for ProgressIndicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressIndicator")
            .field("tick", &self.tick)
            .finish_non_exhaustive()
    }
}
