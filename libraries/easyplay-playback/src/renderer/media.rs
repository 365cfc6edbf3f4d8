//! Image, video, audio and external video

use super::{require_file, ContentRenderer, RenderMode, RenderOutcome, RenderedItem, SkipReason};
use crate::platform::{
    CaptionError, CaptionEvent, CaptionService, MediaEvent, MediaRequest, MediaSession,
    MediaSource, SessionControl, Viewer,
};
use crate::progress::ProgressIndicator;
use crate::resources::ResourceBag;
use crate::surface::{
    AnimatedProperties, CaptionText, ImageInfo, Length, Surface, SurfaceContent, SurfaceId,
    SurfaceUpdate, Viewport,
};
use easyplay_core::{DisplayMode, MediaItem};
use regex::Regex;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

const MIC_DENIED: &str = "Microphone access denied.";
const CAPTION_FAILED: &str = "Automatic caption error.";
const CAPTION_START_FAILED: &str = "Could not start automatic captions.";
const CAPTIONS_UNSUPPORTED: &str = "Automatic captions are not supported on this platform.";

/// Pause before a caption session that ended on its own is restarted
const CAPTION_RESTART_DELAY: Duration = Duration::from_millis(250);

/// Identifier length of an external video
const VIDEO_ID_LEN: usize = 11;

fn video_url_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(r"^.*(youtu\.be/|v/|u/\w/|embed/|watch\?v=|&v=)([^#&?]*).*").ok()
        })
        .as_ref()
}

/// Extract the 11-character video identifier from a share, embed or watch URL
pub fn youtube_video_id(url: &str) -> Option<String> {
    let captures = video_url_pattern()?.captures(url)?;
    let id = captures.get(2)?.as_str();
    (id.chars().count() == VIDEO_ID_LEN).then(|| id.to_string())
}

impl ContentRenderer {
    pub(super) async fn render_image(&self, item: &MediaItem, mode: RenderMode) -> RenderOutcome {
        let file = match require_file(item) {
            Ok(file) => file,
            Err(reason) => return RenderOutcome::Skip(reason),
        };
        let info = match self.platform.assets.probe_image(file).await {
            Ok(info) => info,
            Err(e) => {
                warn!(name = %item.name, error = %e, "Failed to load image");
                return RenderOutcome::Skip(SkipReason::LoadFailed(e.to_string()));
            }
        };

        let surface = Surface::new(SurfaceContent::Image {
            file: file.clone(),
            info,
        });
        let mut resources = ResourceBag::new();
        if mode == RenderMode::Main && item.visual.display_mode == DisplayMode::Pan {
            if let Some(period) = item.declared_duration() {
                resources.defer(
                    "pan",
                    pan_image(
                        Arc::clone(&self.platform.viewer),
                        surface.id,
                        info,
                        period,
                        self.config.frame_interval(),
                    ),
                );
            }
        }

        RenderOutcome::Ready(RenderedItem::timed(surface).with_resources(resources))
    }

    pub(super) async fn render_video(&self, item: &MediaItem, mode: RenderMode) -> RenderOutcome {
        let file = match require_file(item) {
            Ok(file) => file,
            Err(reason) => return RenderOutcome::Skip(reason),
        };
        let pane = mode == RenderMode::Pane;
        let surface = Surface::new(SurfaceContent::Video {
            file: file.clone(),
            muted: pane || item.is_muted(),
            looping: pane,
        });

        let session = match self
            .open_media(surface.id, MediaSource::File(file.clone()), pane || item.is_muted(), pane)
            .await
        {
            Ok(session) => session,
            Err(reason) => return RenderOutcome::Skip(reason),
        };
        self.pumped(surface, session, mode)
    }

    pub(super) async fn render_audio(
        &self,
        item: &MediaItem,
        auto_caption: bool,
        mode: RenderMode,
    ) -> RenderOutcome {
        let file = match require_file(item) {
            Ok(file) => file,
            Err(reason) => return RenderOutcome::Skip(reason),
        };
        let muted = mode == RenderMode::Pane || item.is_muted();
        let captions = (auto_caption && mode == RenderMode::Main).then(|| self.platform.captions.clone());

        let surface = Surface::new(SurfaceContent::Audio {
            title: item.name.clone(),
            caption: match &captions {
                Some(None) => Some(CAPTIONS_UNSUPPORTED.to_string()),
                _ => None,
            },
        });

        let session = match self
            .open_media(surface.id, MediaSource::File(file.clone()), muted, false)
            .await
        {
            Ok(session) => session,
            Err(reason) => return RenderOutcome::Skip(reason),
        };
        let audio = session.control();
        let surface_id = surface.id;

        let mut outcome = self.pumped(surface, session, mode);
        if let (Some(Some(service)), RenderOutcome::Ready(rendered)) = (captions, &mut outcome) {
            rendered.resources.defer(
                "captions",
                run_captions(
                    service,
                    self.config.caption_language.clone(),
                    Arc::clone(&self.platform.viewer),
                    surface_id,
                    audio,
                ),
            );
        }
        outcome
    }

    /// External videos are opened once the surface is on screen
    pub(super) fn render_external_video(
        &self,
        item: &MediaItem,
        url: &str,
        mode: RenderMode,
    ) -> RenderOutcome {
        let Some(video_id) = youtube_video_id(url) else {
            warn!(name = %item.name, url, "No video identifier in URL");
            return RenderOutcome::Skip(SkipReason::InvalidLocator(url.to_string()));
        };
        let pane = mode == RenderMode::Pane;
        let muted = pane || item.is_muted();
        let surface = Surface::new(SurfaceContent::ExternalVideo {
            video_id: video_id.clone(),
            muted,
            looping: pane,
        });

        let request = MediaRequest {
            surface: surface.id,
            source: MediaSource::External(video_id),
            muted,
            looping: pane,
        };
        let (done_tx, done_rx) = oneshot::channel();
        let media = Arc::clone(&self.platform.media);
        let progress = (!pane).then(|| self.progress.clone());
        let poll = self.config.external_poll();

        let mut resources = ResourceBag::new();
        resources.defer("external-video", async move {
            match media.open(request).await {
                Ok(session) => pump_media(session, progress, Some(done_tx), Some(poll)).await,
                Err(e) => warn!(error = %e, "External video player failed to start"),
            }
        });

        let rendered = RenderedItem::timed(surface).with_resources(resources);
        if pane {
            RenderOutcome::Ready(rendered)
        } else {
            RenderOutcome::Ready(rendered.self_terminating(done_rx))
        }
    }

    async fn open_media(
        &self,
        surface: SurfaceId,
        source: MediaSource,
        muted: bool,
        looping: bool,
    ) -> Result<MediaSession, SkipReason> {
        let request = MediaRequest {
            surface,
            source,
            muted,
            looping,
        };
        self.platform.media.open(request).await.map_err(|e| {
            warn!(error = %e, "Failed to open media");
            SkipReason::LoadFailed(e.to_string())
        })
    }

    /// Wire a local media session to the progress bar and completion
    fn pumped(&self, surface: Surface, session: MediaSession, mode: RenderMode) -> RenderOutcome {
        let mut resources = ResourceBag::new();
        let rendered = if mode == RenderMode::Main {
            let (done_tx, done_rx) = oneshot::channel();
            resources.defer(
                "media",
                pump_media(session, Some(self.progress.clone()), Some(done_tx), None),
            );
            RenderedItem::timed(surface)
                .with_resources(resources)
                .self_terminating(done_rx)
        } else {
            resources.defer("media", pump_media(session, None, None, None));
            RenderedItem::timed(surface).with_resources(resources)
        };
        RenderOutcome::Ready(rendered)
    }
}

/// Forward media events until the session ends
///
/// `poll` is for players that report position only when asked.
async fn pump_media(
    mut session: MediaSession,
    progress: Option<ProgressIndicator>,
    done: Option<oneshot::Sender<()>>,
    poll: Option<Duration>,
) {
    let control = session.control();
    let mut poller = poll.map(|period| {
        let mut timer = tokio::time::interval(period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        timer
    });

    loop {
        let event = match poller.as_mut() {
            Some(timer) => tokio::select! {
                event = session.events.recv() => event,
                _ = timer.tick() => {
                    if let (Some(progress), Some(fraction)) =
                        (&progress, control.position().and_then(|p| p.fraction()))
                    {
                        progress.set_fraction(fraction);
                    }
                    continue;
                }
            },
            None => session.events.recv().await,
        };

        match event {
            Some(MediaEvent::Playing) => debug!("Media playing"),
            Some(MediaEvent::TimeUpdate(position)) => {
                if let (Some(progress), Some(fraction)) = (&progress, position.fraction()) {
                    progress.set_fraction(fraction);
                }
            }
            Some(MediaEvent::Ended) => {
                debug!("Media reached its end");
                break;
            }
            Some(MediaEvent::Error(message)) => {
                warn!(%message, "Media playback error");
                break;
            }
            None => {
                debug!("Media session closed");
                break;
            }
        }
    }

    if let Some(done) = done {
        let _ = done.send(());
    }
}

/// Live transcript for an audio item
///
/// Restarts recognition whenever it stops on its own while the audio is
/// still playing.
async fn run_captions(
    service: Arc<dyn CaptionService>,
    language: String,
    viewer: Arc<dyn Viewer>,
    surface: SurfaceId,
    audio: Arc<dyn SessionControl>,
) {
    loop {
        let mut session = match service.start(&language).await {
            Ok(session) => session,
            Err(CaptionError::NotAllowed) => {
                warn!("Caption session refused microphone access");
                viewer.update(surface, SurfaceUpdate::Notice(MIC_DENIED.to_string()));
                return;
            }
            Err(e) => {
                warn!(error = %e, "Caption session could not start");
                viewer.update(surface, SurfaceUpdate::Notice(CAPTION_START_FAILED.to_string()));
                return;
            }
        };
        info!(%language, "Caption session started");

        let mut transcript = CaptionText::default();
        while let Some(event) = session.events.recv().await {
            match event {
                CaptionEvent::Transcript {
                    final_text,
                    interim,
                } => {
                    transcript.final_text.push_str(&final_text);
                    transcript.interim = interim;
                    viewer.update(surface, SurfaceUpdate::Caption(transcript.clone()));
                }
                CaptionEvent::Error(CaptionError::NotAllowed) => {
                    warn!("Caption session lost microphone access");
                    viewer.update(surface, SurfaceUpdate::Notice(MIC_DENIED.to_string()));
                    return;
                }
                CaptionEvent::Error(CaptionError::NoSpeech) => debug!("No speech detected"),
                CaptionEvent::Error(CaptionError::Other(message)) => {
                    warn!(%message, "Caption session error");
                    viewer.update(surface, SurfaceUpdate::Notice(CAPTION_FAILED.to_string()));
                }
                CaptionEvent::Ended => break,
            }
        }
        drop(session);

        if !audio.is_active() {
            debug!("Audio finished, captions stop");
            return;
        }
        debug!("Restarting caption session");
        tokio::time::sleep(CAPTION_RESTART_DELAY).await;
    }
}

/// Axis and distance (px) an image overflows the viewport by once one
/// axis is filled; `None` when it fits
fn pan_extent(info: ImageInfo, viewport: Viewport) -> Option<(bool, f64)> {
    let horizontal = info.aspect() > viewport.aspect();
    let distance = if horizontal {
        viewport.height * info.aspect() - viewport.width
    } else {
        viewport.width / info.aspect() - viewport.height
    };
    (distance > 0.5).then_some((horizontal, distance))
}

/// Linear back-and-forth position (0.0 - 1.0), one leg per `period`
fn pan_position(elapsed: Duration, period: Duration) -> f64 {
    if period.is_zero() {
        return 0.0;
    }
    let phase = (elapsed.as_secs_f64() / period.as_secs_f64()) % 2.0;
    if phase <= 1.0 {
        phase
    } else {
        2.0 - phase
    }
}

async fn pan_image(
    viewer: Arc<dyn Viewer>,
    surface: SurfaceId,
    info: ImageInfo,
    period: Duration,
    frame_interval: Duration,
) {
    let Some((horizontal, distance)) = pan_extent(info, viewer.viewport()) else {
        debug!(surface = %surface, "Image fits the viewport, nothing to pan");
        return;
    };

    let start = Instant::now();
    let mut ticker = tokio::time::interval(frame_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        ticker.tick().await;
        let offset = Length::Px((-distance * pan_position(start.elapsed(), period)) as f32);
        let mut props = AnimatedProperties::default();
        if horizontal {
            props.translate_x = Some(offset);
        } else {
            props.translate_y = Some(offset);
        }
        viewer.animate(surface, &props);
    }
}
