//! Recording fakes for engine tests

#![allow(dead_code)]

use async_trait::async_trait;
use easyplay_core::{BinaryHandle, MediaItem, PlaylistSource, TemperatureUnit};
use easyplay_playback::surface::{
    AnimatedProperties, ImageInfo, Raster, ScrollMetrics, Surface, SurfaceContent, SurfaceId,
    SurfaceUpdate, Viewport,
};
use easyplay_playback::{
    AssetLoader, BackendError, CaptionError, CaptionEvent, CaptionService, CaptionSession,
    EditorVisibility, FrameAccessError, MediaBackend, MediaEvent, MediaPosition, MediaRequest,
    MediaSession, PlaybackConfig, PlaybackEngine, PlaybackEvent, Platform, Session,
    SessionControl, Viewer,
};
use easyplay_weather::{DailyForecast, Forecast, ForecastProvider, WeatherError};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};

/// Key that makes the fake assets fail to decode
pub const CORRUPT: &str = "corrupt";

/// Key of a 4:1 image, wider than the viewport
pub const PANORAMA: &str = "panorama";

static INIT: Once = Once::new();

fn init_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewerCall {
    Attach(SurfaceId),
    Detach(SurfaceId),
    Animate(SurfaceId, AnimatedProperties),
    Update(SurfaceId, SurfaceUpdate),
    Scroll(SurfaceId, f64),
    Reload(SurfaceId),
    Progress(f64),
    ProgressVisible(bool),
    Reset,
}

#[derive(Default)]
struct ViewerState {
    calls: Vec<ViewerCall>,
    attached: HashSet<SurfaceId>,
    surfaces: Vec<Surface>,
    scroll: HashMap<SurfaceId, f64>,
    peak: usize,
}

/// Viewer that records every call and keeps simple frame geometry
pub struct RecordingViewer {
    state: Mutex<ViewerState>,
    /// Frame content height; 0 makes frames unscrollable
    pub content_height: f64,
    pub cross_origin: AtomicBool,
}

impl Default for RecordingViewer {
    fn default() -> Self {
        Self {
            state: Mutex::new(ViewerState::default()),
            content_height: 3000.0,
            cross_origin: AtomicBool::new(false),
        }
    }
}

impl RecordingViewer {
    fn record(&self, call: ViewerCall) {
        self.state.lock().unwrap().calls.push(call);
    }

    pub fn calls(&self) -> Vec<ViewerCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    /// Every surface ever attached, in order
    pub fn attached_surfaces(&self) -> Vec<Surface> {
        self.state.lock().unwrap().surfaces.clone()
    }

    pub fn attached_now(&self) -> usize {
        self.state.lock().unwrap().attached.len()
    }

    /// Most surfaces attached at the same time
    pub fn peak_attached(&self) -> usize {
        self.state.lock().unwrap().peak
    }

    pub fn count(&self, pred: impl Fn(&ViewerCall) -> bool) -> usize {
        self.state.lock().unwrap().calls.iter().filter(|c| pred(c)).count()
    }
}

impl Viewer for RecordingViewer {
    fn viewport(&self) -> Viewport {
        Viewport {
            width: 1920.0,
            height: 1080.0,
        }
    }

    fn attach(&self, surface: &Surface) {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ViewerCall::Attach(surface.id));
        state.attached.insert(surface.id);
        state.surfaces.push(surface.clone());
        state.peak = state.peak.max(state.attached.len());
    }

    fn detach(&self, id: SurfaceId) {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ViewerCall::Detach(id));
        state.attached.remove(&id);
    }

    fn animate(&self, id: SurfaceId, properties: &AnimatedProperties) {
        self.record(ViewerCall::Animate(id, *properties));
    }

    fn update(&self, id: SurfaceId, update: SurfaceUpdate) {
        self.record(ViewerCall::Update(id, update));
    }

    fn frame_metrics(&self, id: SurfaceId) -> Result<ScrollMetrics, FrameAccessError> {
        if self.cross_origin.load(Ordering::SeqCst) {
            return Err(FrameAccessError::CrossOrigin);
        }
        let state = self.state.lock().unwrap();
        if !state.attached.contains(&id) {
            return Err(FrameAccessError::Detached);
        }
        Ok(ScrollMetrics {
            content_height: self.content_height,
            viewport_height: 1080.0,
            scroll_top: state.scroll.get(&id).copied().unwrap_or(0.0),
        })
    }

    fn scroll_frame_to(&self, id: SurfaceId, top: f64) {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ViewerCall::Scroll(id, top));
        state.scroll.insert(id, top);
    }

    fn reload_frame(&self, id: SurfaceId) {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ViewerCall::Reload(id));
        state.scroll.remove(&id);
    }

    fn set_progress(&self, fraction: f64) {
        self.record(ViewerCall::Progress(fraction));
    }

    fn set_progress_visible(&self, visible: bool) {
        self.record(ViewerCall::ProgressVisible(visible));
    }

    fn reset(&self) {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ViewerCall::Reset);
        state.attached.clear();
    }
}

pub struct FakeAssets;

#[async_trait]
impl AssetLoader for FakeAssets {
    async fn probe_image(&self, file: &BinaryHandle) -> Result<ImageInfo, BackendError> {
        if file.key() == CORRUPT {
            return Err(BackendError::new("not an image"));
        }
        if file.key() == PANORAMA {
            return Ok(ImageInfo {
                width: 4000,
                height: 1000,
            });
        }
        Ok(ImageInfo {
            width: 1920,
            height: 1080,
        })
    }

    async fn read_text(&self, _file: &BinaryHandle) -> Result<String, BackendError> {
        Ok("# Menu\n\n* coffee\n* tea".to_string())
    }

    async fn page_size(&self, file: &BinaryHandle, _page: u32) -> Result<(f64, f64), BackendError> {
        if file.key() == CORRUPT {
            return Err(BackendError::new("invalid PDF structure"));
        }
        Ok((612.0, 792.0))
    }

    async fn rasterize_page(
        &self,
        _file: &BinaryHandle,
        _page: u32,
        scale: f64,
    ) -> Result<Raster, BackendError> {
        Ok(Raster {
            width: (612.0 * scale) as u32,
            height: (792.0 * scale) as u32,
            pixels: Arc::from(vec![0u8; 16]),
        })
    }
}

/// Session control that remembers being stopped
#[derive(Default)]
pub struct FakeControl {
    stopped: AtomicBool,
    position: Mutex<Option<MediaPosition>>,
}

impl FakeControl {
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Position reported to pollers
    pub fn set_position(&self, current_secs: u64, total_secs: u64) {
        *self.position.lock().unwrap() = Some(MediaPosition {
            current: Duration::from_secs(current_secs),
            total: Duration::from_secs(total_secs),
        });
    }
}

impl SessionControl for FakeControl {
    fn position(&self) -> Option<MediaPosition> {
        *self.position.lock().unwrap()
    }

    fn is_active(&self) -> bool {
        !self.is_stopped()
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }
}

pub struct OpenedMedia {
    pub request: MediaRequest,
    pub events: mpsc::UnboundedSender<MediaEvent>,
    pub control: Arc<FakeControl>,
}

/// Media backend whose sessions end only when the test says so
#[derive(Default)]
pub struct FakeMedia {
    opened: Mutex<Vec<Arc<OpenedMedia>>>,
}

impl FakeMedia {
    pub fn opened(&self) -> Vec<Arc<OpenedMedia>> {
        self.opened.lock().unwrap().clone()
    }

    pub fn latest(&self) -> Arc<OpenedMedia> {
        self.opened().last().cloned().expect("no media opened")
    }

    /// Signal natural end on the most recent session
    pub fn end_latest(&self) {
        let _ = self.latest().events.send(MediaEvent::Ended);
    }

    /// Push a time update on the most recent session
    pub fn report_position(&self, current_secs: u64, total_secs: u64) {
        let _ = self.latest().events.send(MediaEvent::TimeUpdate(MediaPosition {
            current: Duration::from_secs(current_secs),
            total: Duration::from_secs(total_secs),
        }));
    }
}

#[async_trait]
impl MediaBackend for FakeMedia {
    async fn open(&self, request: MediaRequest) -> Result<MediaSession, BackendError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let control = Arc::new(FakeControl::default());
        let _ = tx.send(MediaEvent::Playing);
        self.opened.lock().unwrap().push(Arc::new(OpenedMedia {
            request,
            events: tx,
            control: Arc::clone(&control),
        }));
        Ok(Session::new(rx, control))
    }
}

/// Caption service that keeps its sessions open
#[derive(Default)]
pub struct FakeCaptions {
    started: AtomicUsize,
    sessions: Mutex<Vec<(mpsc::UnboundedSender<CaptionEvent>, Arc<FakeControl>)>>,
}

impl FakeCaptions {
    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn controls(&self) -> Vec<Arc<FakeControl>> {
        self.sessions
            .lock()
            .unwrap()
            .iter()
            .map(|(_, control)| Arc::clone(control))
            .collect()
    }

    pub fn say(&self, final_text: &str) {
        for (tx, _) in self.sessions.lock().unwrap().iter() {
            let _ = tx.send(CaptionEvent::Transcript {
                final_text: final_text.to_string(),
                interim: String::new(),
            });
        }
    }
}

#[async_trait]
impl CaptionService for FakeCaptions {
    async fn start(&self, _language: &str) -> Result<CaptionSession, CaptionError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::unbounded_channel();
        let control = Arc::new(FakeControl::default());
        self.sessions
            .lock()
            .unwrap()
            .push((tx, Arc::clone(&control)));
        Ok(Session::new(rx, control))
    }
}

/// Forecasts for a fixed place; "Atlantis" does not exist
pub struct FakeForecasts;

#[async_trait]
impl ForecastProvider for FakeForecasts {
    async fn daily_forecast(
        &self,
        location: &str,
        _unit: TemperatureUnit,
    ) -> easyplay_weather::Result<Forecast> {
        if location == "Atlantis" {
            return Err(WeatherError::LocationNotFound(location.to_string()));
        }
        let start = chrono::NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        Ok(Forecast {
            place: location.to_string(),
            temperature_unit: "°C".to_string(),
            days: (0..5)
                .map(|offset| DailyForecast {
                    date: start + chrono::Days::new(offset),
                    weather_code: 2,
                    max: 25,
                    min: 15,
                })
                .collect(),
        })
    }
}

#[derive(Default)]
pub struct RecordingEditor {
    calls: Mutex<Vec<bool>>,
}

impl RecordingEditor {
    pub fn calls(&self) -> Vec<bool> {
        self.calls.lock().unwrap().clone()
    }
}

impl EditorVisibility for RecordingEditor {
    fn set_editor_visible(&self, visible: bool) {
        self.calls.lock().unwrap().push(visible);
    }
}

/// Engine wired to recording fakes
pub struct Harness {
    pub engine: PlaybackEngine,
    pub viewer: Arc<RecordingViewer>,
    pub media: Arc<FakeMedia>,
    pub captions: Arc<FakeCaptions>,
    pub editor: Arc<RecordingEditor>,
    pub events: broadcast::Receiver<PlaybackEvent>,
}

impl Harness {
    pub fn new(items: Vec<MediaItem>) -> Self {
        Self::with_viewer(items, RecordingViewer::default())
    }

    pub fn with_viewer(items: Vec<MediaItem>, viewer: RecordingViewer) -> Self {
        init_logging();
        let viewer = Arc::new(viewer);
        let media = Arc::new(FakeMedia::default());
        let captions = Arc::new(FakeCaptions::default());
        let editor = Arc::new(RecordingEditor::default());
        let platform = Platform {
            viewer: viewer.clone(),
            assets: Arc::new(FakeAssets),
            media: media.clone(),
            captions: Some(captions.clone()),
            forecasts: Arc::new(FakeForecasts),
            editor: editor.clone(),
        };
        let config = PlaybackConfig {
            event_capacity: 1024,
            ..PlaybackConfig::default()
        };
        let playlist: Arc<dyn PlaylistSource> = Arc::new(items);
        let engine = PlaybackEngine::new(playlist, platform, config);
        let events = engine.subscribe();

        Self {
            engine,
            viewer,
            media,
            captions,
            editor,
            events,
        }
    }

    /// Wait (in virtual time) for the first event matching `pred`
    pub async fn wait_for(&mut self, pred: impl Fn(&PlaybackEvent) -> bool) -> PlaybackEvent {
        tokio::time::timeout(Duration::from_secs(3600), async {
            loop {
                match self.events.recv().await {
                    Ok(event) if pred(&event) => return event,
                    Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                    Err(broadcast::error::RecvError::Closed) => panic!("event channel closed"),
                }
            }
        })
        .await
        .expect("timed out waiting for playback event")
    }

    pub async fn wait_started(&mut self, index: usize) {
        self.wait_for(|e| matches!(e, PlaybackEvent::ItemStarted { index: i, .. } if *i == index))
            .await;
    }

    /// Events already delivered, without waiting
    pub fn drain(&mut self) -> Vec<PlaybackEvent> {
        let mut out = Vec::new();
        loop {
            match self.events.try_recv() {
                Ok(event) => out.push(event),
                Err(broadcast::error::TryRecvError::Lagged(_)) => {}
                Err(_) => return out,
            }
        }
    }
}

pub fn file(key: &str) -> BinaryHandle {
    BinaryHandle::new(key, format!("{key}.bin"))
}

/// Surface content kinds in attach order
pub fn attached_kinds(viewer: &RecordingViewer) -> Vec<&'static str> {
    viewer
        .attached_surfaces()
        .iter()
        .map(|s| match s.content {
            SurfaceContent::Image { .. } => "image",
            SurfaceContent::Video { .. } => "video",
            SurfaceContent::Audio { .. } => "audio",
            SurfaceContent::ExternalVideo { .. } => "external-video",
            SurfaceContent::Frame { .. } => "frame",
            SurfaceContent::Document { .. } => "document",
            SurfaceContent::Markdown { .. } => "markdown",
            SurfaceContent::Text { .. } => "text",
            SurfaceContent::Clock { .. } => "clock",
            SurfaceContent::Weather(_) => "weather",
            SurfaceContent::Mosaic { .. } => "mosaic",
            SurfaceContent::Caption { .. } => "caption",
            SurfaceContent::Diagnostic { .. } => "diagnostic",
        })
        .collect()
}
