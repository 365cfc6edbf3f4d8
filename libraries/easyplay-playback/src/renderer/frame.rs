//! Web pages and local HTML documents

use super::{require_file, ContentRenderer, RenderOutcome, RenderedItem, SkipReason};
use crate::platform::{FrameAccessError, Viewer};
use crate::resources::ResourceBag;
use crate::surface::{FrameSource, Surface, SurfaceContent, SurfaceId, SurfaceUpdate};
use easyplay_core::{FrameOptions, MediaItem};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

const SCROLL_BLOCKED: &str = "Auto-scroll is not available for this page.";

/// Timing for one frame's background work
#[derive(Debug, Clone, Copy)]
struct FramePlan {
    auto_scroll: Option<ScrollPlan>,
    refresh: Option<Duration>,
}

#[derive(Debug, Clone, Copy)]
struct ScrollPlan {
    /// Pixels per second
    speed: f64,
    settle: Duration,
    pause: Duration,
    frame_interval: Duration,
}

impl ContentRenderer {
    pub(super) fn render_web(&self, url: &str, frame: &FrameOptions) -> RenderOutcome {
        if url.trim().is_empty() {
            warn!("Web item has no URL");
            return RenderOutcome::Skip(SkipReason::NoSource);
        }
        self.frame_surface(FrameSource::Url(url.to_string()), frame)
    }

    pub(super) fn render_html(&self, item: &MediaItem, frame: &FrameOptions) -> RenderOutcome {
        match require_file(item) {
            Ok(file) => self.frame_surface(FrameSource::File(file.clone()), frame),
            Err(reason) => RenderOutcome::Skip(reason),
        }
    }

    fn frame_surface(&self, source: FrameSource, frame: &FrameOptions) -> RenderOutcome {
        let surface = Surface::new(SurfaceContent::Frame { source });
        let plan = FramePlan {
            auto_scroll: frame.auto_scroll.then(|| ScrollPlan {
                speed: if frame.scroll_speed > 0.0 {
                    frame.scroll_speed
                } else {
                    self.config.default_scroll_speed
                },
                settle: self.config.scroll_settle(),
                pause: self.config.scroll_pause(),
                frame_interval: self.config.frame_interval(),
            }),
            refresh: (frame.refresh_interval > 0)
                .then(|| Duration::from_secs(frame.refresh_interval)),
        };

        let mut resources = ResourceBag::new();
        if plan.auto_scroll.is_some() || plan.refresh.is_some() {
            resources.defer(
                "frame",
                run_frame(Arc::clone(&self.platform.viewer), surface.id, plan),
            );
        }
        RenderOutcome::Ready(RenderedItem::timed(surface).with_resources(resources))
    }
}

/// Reload on the refresh period, restarting auto-scroll after each reload
async fn run_frame(viewer: Arc<dyn Viewer>, surface: SurfaceId, plan: FramePlan) {
    let Some(period) = plan.refresh else {
        if let Some(scroll) = plan.auto_scroll {
            auto_scroll(viewer.as_ref(), surface, scroll).await;
        }
        return;
    };

    let mut reload = tokio::time::interval_at(Instant::now() + period, period);
    reload.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        let scroll = async {
            if let Some(scroll) = plan.auto_scroll {
                auto_scroll(viewer.as_ref(), surface, scroll).await;
            }
            std::future::pending::<()>().await;
        };
        tokio::select! {
            () = scroll => {}
            _ = reload.tick() => {}
        }
        info!(surface = %surface, "Reloading frame");
        viewer.reload_frame(surface);
    }
}

/// Bounce-scroll the frame between top and bottom
///
/// Returns when the page is not scrollable or the frame goes away.
async fn auto_scroll(viewer: &dyn Viewer, surface: SurfaceId, plan: ScrollPlan) {
    tokio::time::sleep(plan.settle).await;

    match viewer.frame_metrics(surface) {
        Ok(metrics) if metrics.max_scroll() <= 0.0 => {
            debug!(surface = %surface, "Frame content fits, no scrolling");
            return;
        }
        Ok(_) => {}
        Err(FrameAccessError::CrossOrigin) => {
            warn!(surface = %surface, "Cannot scroll cross-origin frame");
            viewer.update(surface, SurfaceUpdate::Notice(SCROLL_BLOCKED.to_string()));
            return;
        }
        Err(e) => {
            debug!(surface = %surface, error = %e, "Frame not scrollable");
            return;
        }
    }

    let mut direction = 1.0;
    let mut paused_until: Option<Instant> = None;
    let mut ticker = tokio::time::interval(plan.frame_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last = Instant::now();

    loop {
        ticker.tick().await;
        let now = Instant::now();
        let elapsed = now.duration_since(last);
        last = now;

        if paused_until.is_some_and(|until| now < until) {
            continue;
        }
        paused_until = None;

        let Ok(metrics) = viewer.frame_metrics(surface) else {
            debug!(surface = %surface, "Frame gone, auto-scroll ends");
            return;
        };
        let max = metrics.max_scroll();
        let mut top = metrics.scroll_top + plan.speed * elapsed.as_secs_f64() * direction;

        if direction > 0.0 && top >= max {
            top = max;
            direction = -1.0;
            paused_until = Some(now + plan.pause);
        } else if direction < 0.0 && top <= 0.0 {
            top = 0.0;
            direction = 1.0;
            paused_until = Some(now + plan.pause);
        }

        trace!(surface = %surface, top, "scroll frame");
        viewer.scroll_frame_to(surface, top);
    }
}
