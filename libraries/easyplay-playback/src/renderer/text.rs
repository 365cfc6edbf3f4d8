//! Static text presentations and the live clock

use super::{ContentRenderer, RenderOutcome, RenderedItem};
use crate::platform::Viewer;
use crate::resources::ResourceBag;
use crate::surface::{Surface, SurfaceContent, SurfaceId, SurfaceUpdate, TextPresentation};
use crate::transitions::{track, Easing, Property, Tween};
use chrono::{Local, NaiveDateTime};
use easyplay_core::{ClockConfig, ClockFormat, TextAnimation};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::trace;

const WORD_FADE: Duration = Duration::from_millis(500);
const WORD_FADE_STAGGER: Duration = Duration::from_millis(200);
const WORD_SLIDE: Duration = Duration::from_millis(400);
const WORD_SLIDE_STAGGER: Duration = Duration::from_millis(150);
const BLOCK_BOUNCE: Duration = Duration::from_millis(800);

/// Clock text for `now` in the given format
pub fn format_clock(format: ClockFormat, now: NaiveDateTime) -> String {
    let pattern = match format {
        ClockFormat::TwelveHour => "%I:%M:%S %p",
        ClockFormat::TwentyFourHour => "%H:%M:%S",
        ClockFormat::DateTime => "%d/%m/%Y, %H:%M:%S",
        ClockFormat::DateOnly => "%d/%m/%Y",
    };
    now.format(pattern).to_string()
}

/// Words as the viewer splits them for per-word animation
fn word_count(text: &str) -> usize {
    text.split(' ').count()
}

impl ContentRenderer {
    pub(super) fn render_text(
        &self,
        text: &str,
        color: Option<&str>,
        font_size: Option<&str>,
        animation: TextAnimation,
    ) -> RenderOutcome {
        let presentation = match animation {
            TextAnimation::None => TextPresentation::Plain,
            TextAnimation::Typewriter => TextPresentation::Typewriter,
            TextAnimation::FadeInWords | TextAnimation::SlideInWords => TextPresentation::Words,
            TextAnimation::BounceIn => TextPresentation::Bounce,
        };
        let surface = Surface::new(SurfaceContent::Text {
            text: text.to_string(),
            color: color.map(str::to_string),
            font_size: font_size.map(str::to_string),
            presentation,
        });

        let viewer = Arc::clone(&self.platform.viewer);
        let frame = self.config.frame_interval();
        let id = surface.id;
        let mut resources = ResourceBag::new();
        match animation {
            TextAnimation::None => {}
            TextAnimation::Typewriter => resources.defer(
                "typewriter",
                typewrite(viewer, id, text.to_string(), self.config.typewriter_step()),
            ),
            TextAnimation::FadeInWords => {
                let tween = Tween::new(
                    vec![track(Property::Opacity, &[0.0, 1.0])],
                    WORD_FADE,
                    Easing::OutElastic,
                );
                resources.defer(
                    "word-fade",
                    cascade_words(viewer, id, word_count(text), tween, WORD_FADE_STAGGER, frame),
                );
            }
            TextAnimation::SlideInWords => {
                let tween = Tween::new(
                    vec![
                        track(Property::OffsetX, &[-20.0, 0.0]),
                        track(Property::Opacity, &[0.0, 1.0]),
                    ],
                    WORD_SLIDE,
                    Easing::OutElastic,
                );
                resources.defer(
                    "word-slide",
                    cascade_words(viewer, id, word_count(text), tween, WORD_SLIDE_STAGGER, frame),
                );
            }
            TextAnimation::BounceIn => {
                let tween = Tween::new(
                    vec![track(Property::Scale, &[0.3, 1.05, 0.9, 1.0])],
                    BLOCK_BOUNCE,
                    Easing::OutElastic,
                );
                resources.defer("text-bounce", async move {
                    tween
                        .play(frame, |props| viewer.animate(id, &props))
                        .await;
                });
            }
        }

        RenderOutcome::Ready(RenderedItem::timed(surface).with_resources(resources))
    }

    pub(super) fn render_clock(&self, clock: &ClockConfig) -> RenderOutcome {
        let format = clock.format;
        let surface = Surface::new(SurfaceContent::Clock {
            text: format_clock(format, Local::now().naive_local()),
            color: clock.color.clone(),
            font_size: clock.font_size.clone(),
        });

        let viewer = Arc::clone(&self.platform.viewer);
        let id = surface.id;
        let tick = self.config.clock_tick();
        let mut resources = ResourceBag::new();
        resources.defer("clock", async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + tick, tick);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let text = format_clock(format, Local::now().naive_local());
                trace!(surface = %id, %text, "clock tick");
                viewer.update(id, SurfaceUpdate::Text(text));
            }
        });

        RenderOutcome::Ready(RenderedItem::timed(surface).with_resources(resources))
    }
}

/// Reveal `text` one character per step
async fn typewrite(viewer: Arc<dyn Viewer>, surface: SurfaceId, text: String, step: Duration) {
    let mut ticker = tokio::time::interval(step);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let ends = text
        .char_indices()
        .map(|(start, c)| start + c.len_utf8())
        .collect::<Vec<_>>();

    for end in ends {
        ticker.tick().await;
        viewer.update(surface, SurfaceUpdate::Text(text[..end].to_string()));
    }
}

/// Play `tween` on every word, each starting `stagger` after the previous
async fn cascade_words(
    viewer: Arc<dyn Viewer>,
    surface: SurfaceId,
    words: usize,
    tween: Tween,
    stagger: Duration,
    frame_interval: Duration,
) {
    let start = Instant::now();
    let mut settled = 0;
    let mut ticker = tokio::time::interval(frame_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    while settled < words {
        ticker.tick().await;
        let elapsed = start.elapsed();
        for index in settled..words {
            let delay = stagger * index as u32;
            let Some(local) = elapsed.checked_sub(delay) else {
                break;
            };
            let t = tween.progress(local);
            viewer.update(
                surface,
                SurfaceUpdate::Word {
                    index,
                    properties: tween.sample(t),
                },
            );
            if t >= 1.0 {
                settled = index + 1;
            }
        }
    }
}
