//! Engine behaviour against recording fakes, in virtual time

mod common;

use common::{attached_kinds, file, Harness, RecordingViewer, ViewerCall, CORRUPT, PANORAMA};
use easyplay_core::{
    DisplayMode, FrameOptions, ItemContent, MediaItem, MosaicLayout, TextAnimation,
};
use easyplay_playback::surface::{Length, MarkdownBlock, SurfaceContent, SurfaceUpdate};
use easyplay_playback::{MediaSource, PlaybackError, PlaybackEvent, PlaybackState};
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::time::{sleep, Instant};

fn text(name: &str, seconds: f64) -> MediaItem {
    MediaItem::new(
        name,
        ItemContent::Text {
            text: format!("{name} text"),
            color: None,
            font_size: None,
            text_animation: TextAnimation::None,
        },
    )
    .with_duration(seconds)
}

fn youtube(url: &str) -> MediaItem {
    MediaItem::new(
        "clip",
        ItemContent::Youtube {
            url: url.to_string(),
        },
    )
}

fn missing_image(name: &str) -> MediaItem {
    let mut item = MediaItem::new(name, ItemContent::Image);
    item.is_missing = true;
    item
}

fn web(auto_scroll: bool, refresh_interval: u64) -> MediaItem {
    MediaItem::new(
        "page",
        ItemContent::Web {
            url: "https://example.com/menu".to_string(),
            frame: FrameOptions {
                auto_scroll,
                refresh_interval,
                ..FrameOptions::default()
            },
        },
    )
    .with_duration(120.0)
}

#[tokio::test(start_paused = true)]
async fn wraps_around_after_last_item() {
    let mut h = Harness::new(vec![text("a", 1.0), text("b", 1.0), text("c", 1.0)]);
    h.engine.play().await.unwrap();

    for index in [0, 1, 2, 0, 1] {
        h.wait_started(index).await;
    }
    assert!(h.engine.is_playing());
    h.engine.stop().await;
}

#[tokio::test(start_paused = true)]
async fn all_missing_playlist_stops_without_rendering() {
    let mut h = Harness::new(vec![missing_image("a"), missing_image("b"), missing_image("c")]);
    h.engine.play().await.unwrap();

    h.wait_for(|e| matches!(e, PlaybackEvent::Notice { .. })).await;
    h.wait_for(|e| {
        matches!(
            e,
            PlaybackEvent::StateChanged {
                state: PlaybackState::Stopped
            }
        )
    })
    .await;

    assert!(!h.engine.is_playing());
    assert_eq!(h.viewer.attached_surfaces().len(), 0);
    assert_eq!(h.editor.calls(), vec![false, true]);
}

#[tokio::test(start_paused = true)]
async fn all_missing_visits_each_index_once() {
    let mut h = Harness::new(vec![missing_image("a"), missing_image("b")]);
    h.engine.play().await.unwrap();

    let mut skipped = Vec::new();
    loop {
        match h.wait_for(|_| true).await {
            PlaybackEvent::ItemSkipped { index, .. } => skipped.push(index),
            PlaybackEvent::Notice { message } => {
                assert_eq!(message, PlaybackError::NoPlayableItems.to_string());
                break;
            }
            _ => {}
        }
    }
    assert_eq!(skipped, vec![0, 1]);
}

async fn assert_exclusive(transition: &str) {
    let items = vec![
        text("a", 1.0).with_transition(transition, 800),
        text("b", 1.0).with_transition(transition, 800),
    ];
    let mut h = Harness::new(items);
    h.engine.play().await.unwrap();
    for index in [0, 1, 0, 1] {
        h.wait_started(index).await;
    }
    h.engine.stop().await;

    assert_eq!(h.viewer.peak_attached(), 1, "overlap with {transition}");

    // Every attach after the first is preceded by the detach of its predecessor
    let calls = h.viewer.calls();
    let mut live = None;
    for call in calls {
        match call {
            ViewerCall::Attach(id) => {
                assert!(live.is_none(), "{transition}: attached {id} over {live:?}");
                live = Some(id);
            }
            ViewerCall::Detach(id) => {
                assert_eq!(live, Some(id));
                live = None;
            }
            _ => {}
        }
    }
}

#[tokio::test(start_paused = true)]
async fn exclusive_surface_with_fade_in() {
    assert_exclusive("fadeIn").await;
}

#[tokio::test(start_paused = true)]
async fn exclusive_surface_with_slide_in_left() {
    assert_exclusive("slideInLeft").await;
}

#[tokio::test(start_paused = true)]
async fn exclusive_surface_with_zoom_in() {
    assert_exclusive("zoomIn").await;
}

#[tokio::test(start_paused = true)]
async fn self_terminating_item_waits_for_its_end() {
    let video = MediaItem::new("clip", ItemContent::Video).with_file(file("clip"));
    let mut h = Harness::new(vec![video, text("after", 5.0)]);
    h.engine.play().await.unwrap();
    h.wait_started(0).await;

    sleep(Duration::from_secs(600)).await;
    let early = h.drain();
    assert!(
        !early
            .iter()
            .any(|e| matches!(e, PlaybackEvent::ItemFinished { .. })),
        "advanced without an end signal: {early:?}"
    );
    assert_eq!(h.engine.state(), PlaybackState::Showing);

    h.media.end_latest();
    h.wait_for(|e| matches!(e, PlaybackEvent::ItemFinished { index: 0 }))
        .await;
    h.wait_started(1).await;
    h.engine.stop().await;
}

#[tokio::test(start_paused = true)]
async fn self_terminating_item_ignores_positive_duration() {
    let video = MediaItem::new("clip", ItemContent::Video)
        .with_file(file("clip"))
        .with_duration(2.0);
    let mut h = Harness::new(vec![video, text("after", 5.0)]);
    h.engine.play().await.unwrap();
    h.wait_started(0).await;

    sleep(Duration::from_secs(30)).await;
    assert!(h
        .drain()
        .iter()
        .all(|e| !matches!(e, PlaybackEvent::ItemFinished { .. })));

    h.media.end_latest();
    h.wait_started(1).await;
    h.engine.stop().await;
}

async fn assert_quiet_after_stop(h: &mut Harness) {
    h.engine.stop().await;
    assert_eq!(h.engine.state(), PlaybackState::Stopped);
    assert_eq!(h.viewer.attached_now(), 0);

    let calls = h.viewer.call_count();
    sleep(Duration::from_secs(30)).await;
    assert_eq!(
        h.viewer.call_count(),
        calls,
        "viewer touched after stop: {:?}",
        &h.viewer.calls()[calls..]
    );
}

#[tokio::test(start_paused = true)]
async fn stop_silences_clock() {
    let clock = MediaItem::new(
        "clock",
        ItemContent::Clock {
            clock_config: Default::default(),
        },
    )
    .with_duration(60.0);
    let mut h = Harness::new(vec![clock]);
    h.engine.play().await.unwrap();
    h.wait_started(0).await;

    sleep(Duration::from_millis(3500)).await;
    let ticks = h
        .viewer
        .count(|c| matches!(c, ViewerCall::Update(_, SurfaceUpdate::Text(_))));
    assert!(ticks >= 3, "clock ticked {ticks} times");

    assert_quiet_after_stop(&mut h).await;
}

#[tokio::test(start_paused = true)]
async fn stop_silences_auto_scroll() {
    let mut h = Harness::new(vec![web(true, 0)]);
    h.engine.play().await.unwrap();
    h.wait_started(0).await;

    sleep(Duration::from_secs(3)).await;
    assert!(h.viewer.count(|c| matches!(c, ViewerCall::Scroll(..))) > 0);

    assert_quiet_after_stop(&mut h).await;
}

#[tokio::test(start_paused = true)]
async fn stop_silences_refresh_timer() {
    let mut h = Harness::new(vec![web(false, 2)]);
    h.engine.play().await.unwrap();
    h.wait_started(0).await;

    sleep(Duration::from_millis(5500)).await;
    assert_eq!(h.viewer.count(|c| matches!(c, ViewerCall::Reload(_))), 2);

    assert_quiet_after_stop(&mut h).await;
}

#[tokio::test(start_paused = true)]
async fn stop_ends_caption_session() {
    let audio = MediaItem::new("talk", ItemContent::Audio { auto_caption: true })
        .with_file(file("talk"));
    let mut h = Harness::new(vec![audio]);
    h.engine.play().await.unwrap();
    h.wait_started(0).await;

    sleep(Duration::from_secs(1)).await;
    assert_eq!(h.captions.started(), 1);
    h.captions.say("good morning");
    sleep(Duration::from_millis(100)).await;
    assert!(h.viewer.calls().iter().any(|c| matches!(
        c,
        ViewerCall::Update(_, SurfaceUpdate::Caption(text)) if text.final_text.contains("good morning")
    )));

    assert_quiet_after_stop(&mut h).await;
    assert!(h.captions.controls().iter().all(|c| c.is_stopped()));
    assert!(h.media.latest().control.is_stopped());
    assert_eq!(h.captions.started(), 1);
}

#[tokio::test(start_paused = true)]
async fn missing_items_are_skipped_forever() {
    let mut h = Harness::new(vec![missing_image("a"), text("b", 5.0), missing_image("c")]);
    h.engine.play().await.unwrap();

    h.wait_for(|e| matches!(e, PlaybackEvent::ItemSkipped { index: 0, .. }))
        .await;
    h.wait_started(1).await;
    let first = Instant::now();

    h.wait_for(|e| matches!(e, PlaybackEvent::ItemSkipped { index: 2, .. }))
        .await;
    h.wait_for(|e| matches!(e, PlaybackEvent::ItemSkipped { index: 0, .. }))
        .await;
    h.wait_started(1).await;
    assert!(first.elapsed() >= Duration::from_secs(5));

    let kinds = attached_kinds(&h.viewer);
    assert!(kinds.iter().all(|k| *k == "text"), "{kinds:?}");
    h.engine.stop().await;
}

#[tokio::test(start_paused = true)]
async fn corrupt_document_shows_diagnostic_and_missing_one_skips() {
    let corrupt = MediaItem::new("report.pdf", ItemContent::Pdf)
        .with_file(file(CORRUPT))
        .with_duration(2.0);
    let unbound = MediaItem::new("unbound.pdf", ItemContent::Pdf).with_duration(2.0);
    let mut h = Harness::new(vec![corrupt, unbound]);
    h.engine.play().await.unwrap();

    let event = h
        .wait_for(|e| matches!(e, PlaybackEvent::ItemDegraded { index: 0, .. }))
        .await;
    let PlaybackEvent::ItemDegraded { message, .. } = event else {
        unreachable!()
    };
    assert!(message.contains("Could not load PDF: report.pdf"), "{message}");

    let shown = Instant::now();
    h.wait_for(|e| matches!(e, PlaybackEvent::ItemFinished { index: 0 }))
        .await;
    assert!(shown.elapsed() >= Duration::from_secs(2));

    h.wait_for(|e| matches!(e, PlaybackEvent::ItemSkipped { index: 1, .. }))
        .await;
    h.wait_for(|e| matches!(e, PlaybackEvent::ItemDegraded { index: 0, .. }))
        .await;
    h.engine.stop().await;

    assert!(attached_kinds(&h.viewer).iter().all(|k| *k == "diagnostic"));
}

#[tokio::test(start_paused = true)]
async fn empty_playlist_is_an_error() {
    let mut h = Harness::new(Vec::new());
    let result = h.engine.play().await;

    assert!(matches!(result, Err(PlaybackError::EmptyPlaylist)));
    assert!(!h.engine.is_playing());
    assert!(h.editor.calls().is_empty());
    assert!(matches!(
        h.drain().as_slice(),
        [PlaybackEvent::Notice { .. }]
    ));
}

#[tokio::test(start_paused = true)]
async fn editor_toggles_once_per_cycle() {
    let mut h = Harness::new(vec![text("a", 1.0), text("b", 1.0)]);

    h.engine.stop().await;
    assert!(h.editor.calls().is_empty(), "stop while stopped is a no-op");

    h.engine.play().await.unwrap();
    h.wait_started(1).await;

    // Restart goes back to the first item without touching the editor
    h.engine.play().await.unwrap();
    h.wait_started(0).await;
    assert_eq!(h.editor.calls(), vec![false]);

    h.engine.stop().await;
    h.engine.stop().await;
    assert_eq!(h.editor.calls(), vec![false, true]);
    assert_eq!(h.viewer.calls().last(), Some(&ViewerCall::Reset));
}

#[tokio::test(start_paused = true)]
async fn restart_begins_at_first_item() {
    let mut h = Harness::new(vec![text("a", 1.0), text("b", 1.0), text("c", 1.0)]);
    h.engine.play().await.unwrap();
    h.wait_started(2).await;

    h.engine.play().await.unwrap();
    let next = h
        .wait_for(|e| matches!(e, PlaybackEvent::ItemStarted { .. }))
        .await;
    assert!(matches!(next, PlaybackEvent::ItemStarted { index: 0, .. }));
    h.engine.stop().await;
}

#[tokio::test(start_paused = true)]
async fn image_caption_enters_as_overlay() {
    let image = MediaItem::new("poster", ItemContent::Image)
        .with_file(file("poster"))
        .with_caption("Opening soon")
        .with_duration(3.0);
    let mut h = Harness::new(vec![image]);
    h.engine.play().await.unwrap();
    h.wait_started(0).await;

    assert_eq!(attached_kinds(&h.viewer), vec!["image", "caption"]);
    assert_eq!(h.viewer.attached_now(), 2);

    h.engine.stop().await;
    assert_eq!(h.viewer.attached_now(), 0);
}

#[tokio::test(start_paused = true)]
async fn unknown_weather_location_degrades() {
    let item = MediaItem::new(
        "forecast",
        ItemContent::Weather {
            location: "Atlantis".to_string(),
            unit: Default::default(),
        },
    )
    .with_duration(10.0);
    let mut h = Harness::new(vec![item]);
    h.engine.play().await.unwrap();

    let event = h
        .wait_for(|e| matches!(e, PlaybackEvent::ItemDegraded { .. }))
        .await;
    assert!(matches!(
        event,
        PlaybackEvent::ItemDegraded { message, .. } if message.contains("Atlantis")
    ));
    h.engine.stop().await;
}

#[tokio::test(start_paused = true)]
async fn mosaic_panes_play_muted_and_looping() {
    let video = MediaItem::new("loop", ItemContent::Video).with_file(file("loop"));
    let weather = MediaItem::new(
        "city",
        ItemContent::Weather {
            location: "Porto".to_string(),
            unit: Default::default(),
        },
    );
    let mosaic = MediaItem::new(
        "wall",
        ItemContent::Mosaic {
            layout: MosaicLayout::LargeLeftTwoSmall,
            panes: vec![Some(video), None, Some(weather), Some(text("extra", 1.0))],
        },
    )
    .with_duration(20.0);
    let mut h = Harness::new(vec![mosaic]);
    h.engine.play().await.unwrap();
    h.wait_started(0).await;

    let surfaces = h.viewer.attached_surfaces();
    let SurfaceContent::Mosaic { grid, panes } = &surfaces[0].content else {
        panic!("expected a mosaic, got {:?}", surfaces[0].content);
    };
    assert_eq!(grid.columns, "2fr 1fr");
    assert_eq!(panes.len(), 3);
    assert_eq!(panes[0].area, Some("large"));
    assert!(matches!(
        panes[0].surface.as_ref().map(|s| &s.content),
        Some(SurfaceContent::Video {
            muted: true,
            looping: true,
            ..
        })
    ));
    assert!(panes[1].surface.is_none());
    assert!(matches!(
        panes[2].surface.as_ref().map(|s| &s.content),
        Some(SurfaceContent::Weather(_))
    ));

    let request = &h.media.latest().request;
    assert!(request.muted && request.looping);

    // Pane video ending does not end the mosaic
    h.media.end_latest();
    sleep(Duration::from_secs(5)).await;
    assert!(h
        .drain()
        .iter()
        .all(|e| !matches!(e, PlaybackEvent::ItemFinished { .. })));

    h.engine.stop().await;
    assert!(h.media.latest().control.is_stopped());
}

#[tokio::test(start_paused = true)]
async fn cross_origin_frame_gets_notice() {
    let viewer = RecordingViewer::default();
    viewer.cross_origin.store(true, Ordering::SeqCst);
    let mut h = Harness::with_viewer(vec![web(true, 0)], viewer);
    h.engine.play().await.unwrap();
    h.wait_started(0).await;

    sleep(Duration::from_secs(1)).await;
    assert!(h
        .viewer
        .calls()
        .iter()
        .any(|c| matches!(c, ViewerCall::Update(_, SurfaceUpdate::Notice(_)))));
    assert_eq!(h.viewer.count(|c| matches!(c, ViewerCall::Scroll(..))), 0);
    h.engine.stop().await;
}

#[tokio::test(start_paused = true)]
async fn state_follows_the_item_lifecycle() {
    let mut h = Harness::new(vec![text("a", 2.0)]);
    let mut states = h.engine.watch_state();
    assert_eq!(h.engine.state(), PlaybackState::Stopped);

    h.engine.play().await.unwrap();
    states
        .wait_for(|s| *s == PlaybackState::Showing)
        .await
        .unwrap();
    assert!(h.engine.is_playing());

    h.engine.stop().await;
    assert_eq!(*states.borrow_and_update(), PlaybackState::Stopped);
    assert!(!h.engine.is_playing());
    h.drain();
}

#[tokio::test(start_paused = true)]
async fn oversized_duration_keeps_the_driver_alive() {
    let mut h = Harness::new(vec![text("a", 1.0), text("forever", 1e20)]);
    h.engine.play().await.unwrap();
    h.wait_started(1).await;

    sleep(Duration::from_secs(5)).await;
    assert_eq!(h.engine.state(), PlaybackState::Showing);
    assert!(h
        .drain()
        .iter()
        .all(|e| !matches!(e, PlaybackEvent::ItemFinished { .. })));

    // Restarting tears the long item down through the same driver
    h.engine.play().await.unwrap();
    h.wait_started(0).await;
    h.wait_started(1).await;
    assert_eq!(h.viewer.peak_attached(), 1);

    h.engine.stop().await;
    assert_eq!(h.viewer.attached_now(), 0);
    assert_eq!(h.editor.calls(), vec![false, true]);
}

#[tokio::test(start_paused = true)]
async fn external_video_without_identifier_is_skipped() {
    let mut h = Harness::new(vec![youtube("https://example.com/watch?v=short"), text("b", 1.0)]);
    h.engine.play().await.unwrap();

    h.wait_for(|e| matches!(e, PlaybackEvent::ItemSkipped { index: 0, .. }))
        .await;
    h.wait_started(1).await;
    h.engine.stop().await;

    assert!(h.media.opened().is_empty());
    assert_eq!(attached_kinds(&h.viewer), vec!["text"]);
}

#[tokio::test(start_paused = true)]
async fn external_video_advances_on_player_end() {
    let mut h = Harness::new(vec![
        youtube("https://youtu.be/dQw4w9WgXcQ").with_duration(3.0),
        text("after", 5.0),
    ]);
    h.engine.play().await.unwrap();
    h.wait_started(0).await;

    sleep(Duration::from_millis(10)).await;
    let opened = h.media.latest();
    assert_eq!(
        opened.request.source,
        MediaSource::External("dQw4w9WgXcQ".to_string())
    );
    assert!(opened.request.muted);

    // Position is polled from the player
    opened.control.set_position(30, 120);
    sleep(Duration::from_millis(300)).await;
    assert!(h.viewer.calls().contains(&ViewerCall::Progress(0.25)));

    sleep(Duration::from_secs(600)).await;
    assert!(h
        .drain()
        .iter()
        .all(|e| !matches!(e, PlaybackEvent::ItemFinished { .. })));

    h.media.end_latest();
    h.wait_for(|e| matches!(e, PlaybackEvent::ItemFinished { index: 0 }))
        .await;
    h.wait_started(1).await;
    h.engine.stop().await;
    assert!(opened.control.is_stopped());
}

#[tokio::test(start_paused = true)]
async fn media_position_drives_progress_and_resets_between_items() {
    let video = MediaItem::new("clip", ItemContent::Video).with_file(file("clip"));
    let mut h = Harness::new(vec![video, text("after", 5.0)]);
    h.engine.play().await.unwrap();
    h.wait_started(0).await;

    h.media.report_position(5, 20);
    sleep(Duration::from_millis(10)).await;
    h.media.end_latest();
    h.wait_started(1).await;
    h.engine.stop().await;

    let calls = h.viewer.calls();
    let reported = calls
        .iter()
        .position(|c| *c == ViewerCall::Progress(0.25))
        .expect("time update never reached the bar");
    let next_attach = calls
        .iter()
        .rposition(|c| matches!(c, ViewerCall::Attach(_)))
        .unwrap();
    assert!(reported < next_attach);
    assert!(
        calls[reported..next_attach].contains(&ViewerCall::Progress(0.0)),
        "bar not reset before the next item: {:?}",
        &calls[reported..next_attach]
    );
}

#[tokio::test(start_paused = true)]
async fn typewriter_reveals_one_character_per_step() {
    let item = MediaItem::new(
        "greeting",
        ItemContent::Text {
            text: "Hello".to_string(),
            color: None,
            font_size: None,
            text_animation: TextAnimation::Typewriter,
        },
    )
    .with_duration(30.0);
    let mut h = Harness::new(vec![item]);
    h.engine.play().await.unwrap();
    h.wait_started(0).await;

    let typed = |viewer: &RecordingViewer| -> Vec<String> {
        viewer
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                ViewerCall::Update(_, SurfaceUpdate::Text(text)) => Some(text),
                _ => None,
            })
            .collect()
    };

    // Steps land at 0, 50 and 100 ms
    sleep(Duration::from_millis(120)).await;
    assert_eq!(typed(&h.viewer), vec!["H", "He", "Hel"]);

    sleep(Duration::from_secs(1)).await;
    assert_eq!(typed(&h.viewer), vec!["H", "He", "Hel", "Hell", "Hello"]);
    h.engine.stop().await;
}

#[tokio::test(start_paused = true)]
async fn pan_mode_translates_until_stopped() {
    let mut image = MediaItem::new("skyline", ItemContent::Image)
        .with_file(file(PANORAMA))
        .with_duration(10.0);
    image.visual.display_mode = DisplayMode::Pan;
    let mut h = Harness::new(vec![image]);
    h.engine.play().await.unwrap();
    h.wait_started(0).await;

    sleep(Duration::from_secs(2)).await;
    let offsets = h
        .viewer
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            ViewerCall::Animate(_, props) => props.translate_x,
            _ => None,
        })
        .collect::<Vec<_>>();
    assert!(!offsets.is_empty(), "no pan frames");
    assert!(offsets
        .iter()
        .any(|offset| matches!(offset, Length::Px(px) if *px < 0.0)));

    assert_quiet_after_stop(&mut h).await;
}

#[tokio::test(start_paused = true)]
async fn markdown_renders_blocks_and_skips_without_file() {
    let unbound = MediaItem::new("notes.md", ItemContent::Markdown).with_duration(2.0);
    let menu = MediaItem::new("menu.md", ItemContent::Markdown)
        .with_file(file("menu"))
        .with_duration(2.0);
    let mut h = Harness::new(vec![unbound, menu]);
    h.engine.play().await.unwrap();

    h.wait_for(|e| matches!(e, PlaybackEvent::ItemSkipped { index: 0, .. }))
        .await;
    h.wait_started(1).await;
    h.engine.stop().await;

    let surfaces = h.viewer.attached_surfaces();
    assert_eq!(surfaces.len(), 1);
    let SurfaceContent::Markdown { blocks } = &surfaces[0].content else {
        panic!("expected markdown, got {:?}", surfaces[0].content);
    };
    assert!(matches!(
        &blocks[0],
        MarkdownBlock::Heading { level: 1, spans } if spans[0].text == "Menu"
    ));
    assert!(matches!(&blocks[1], MarkdownBlock::List(items) if items.len() == 2));
}
