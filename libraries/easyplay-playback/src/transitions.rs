//! Transition engine for surface entrances and exits
//!
//! Every named entrance is a fixed recipe of property keyframes:
//! - Fades, slides, zooms and rotations settle with an exponential ease-out
//! - Keyframe lists longer than two values split the duration evenly
//! - Unknown or absent names fall back to a plain fade
//!
//! Exits are always a short fade followed by detaching the surface.

use crate::platform::Viewer;
use crate::surface::{AnimatedProperties, Length, Surface, SurfaceId};
use std::f32::consts::PI;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, trace};

/// Easing curve applied to each keyframe segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,

    /// Fast start, long settle: `1 - 2^(-10t)`
    #[default]
    OutExpo,

    /// Overshooting spring (amplitude 1, period 0.5)
    OutElastic,
}

impl Easing {
    /// Map linear progress (0.0 - 1.0) to eased progress
    #[inline]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        if t <= 0.0 || t >= 1.0 {
            return t;
        }

        match self {
            Easing::Linear => t,
            Easing::OutExpo => 1.0 - 2f32.powf(-10.0 * t),
            Easing::OutElastic => {
                let period = 0.5;
                let s = (1.0 - t) - 1.0 - period / 4.0;
                let ease_in = -(2f32.powf(10.0 * ((1.0 - t) - 1.0))) * (s * 2.0 * PI / period).sin();
                1.0 - ease_in
            }
        }
    }
}

/// Animatable surface property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Property {
    Opacity,
    /// Percent of the surface width
    TranslateX,
    /// Percent of the surface height
    TranslateY,
    /// Pixels along X
    OffsetX,
    Scale,
    ScaleX,
    ScaleY,
    /// Degrees
    Rotate,
    RotateY,
    SkewX,
    SkewY,
}

impl Property {
    fn write(self, props: &mut AnimatedProperties, value: f32) {
        match self {
            Property::Opacity => props.opacity = Some(value),
            Property::TranslateX => props.translate_x = Some(Length::Percent(value)),
            Property::TranslateY => props.translate_y = Some(Length::Percent(value)),
            Property::OffsetX => props.translate_x = Some(Length::Px(value)),
            Property::Scale => props.scale = Some(value),
            Property::ScaleX => props.scale_x = Some(value),
            Property::ScaleY => props.scale_y = Some(value),
            Property::Rotate => props.rotate = Some(value),
            Property::RotateY => props.rotate_y = Some(value),
            Property::SkewX => props.skew_x = Some(value),
            Property::SkewY => props.skew_y = Some(value),
        }
    }
}

/// Keyframes for one property
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Track {
    pub property: Property,
    pub keyframes: &'static [f32],
}

pub(crate) const fn track(property: Property, keyframes: &'static [f32]) -> Track {
    Track {
        property,
        keyframes,
    }
}

impl Track {
    /// Value at linear progress `t`, easing each segment separately
    pub fn sample(&self, t: f32, easing: Easing) -> f32 {
        match self.keyframes {
            [] => 0.0,
            [only] => *only,
            frames => {
                let segments = frames.len() - 1;
                let position = t.clamp(0.0, 1.0) * segments as f32;
                let index = (position.floor() as usize).min(segments - 1);
                let local = easing.apply(position - index as f32);
                let (from, to) = (frames[index], frames[index + 1]);
                from + (to - from) * local
            }
        }
    }
}

/// A set of tracks played together
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    pub tracks: Vec<Track>,
    pub duration: Duration,
    pub easing: Easing,
}

impl Tween {
    pub fn new(tracks: Vec<Track>, duration: Duration, easing: Easing) -> Self {
        Self {
            tracks,
            duration,
            easing,
        }
    }

    /// Properties at linear progress `t`
    pub fn sample(&self, t: f32) -> AnimatedProperties {
        let mut props = AnimatedProperties::default();
        for track in &self.tracks {
            track.property.write(&mut props, track.sample(t, self.easing));
        }
        props
    }

    /// Progress at `elapsed`, 1.0 once the tween is over
    pub fn progress(&self, elapsed: Duration) -> f32 {
        if self.duration.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0) as f32
        }
    }

    /// Drive the tween frame by frame until it completes
    ///
    /// The first frame is written immediately and the last one is always
    /// exactly the end state.
    pub async fn play<F>(&self, frame_interval: Duration, mut on_frame: F)
    where
        F: FnMut(AnimatedProperties),
    {
        let start = Instant::now();
        let mut ticker = tokio::time::interval(frame_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            let t = self.progress(start.elapsed());
            on_frame(self.sample(t));
            if t >= 1.0 {
                break;
            }
        }
    }
}

/// Named entrance transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Transition {
    #[default]
    FadeIn,
    SlideInLeft,
    SlideInRight,
    SlideInTop,
    SlideInBottom,
    ZoomIn,
    ZoomOut,
    RotateIn,
    FlipIn,
    BounceIn,
    SpiralIn,
    ExpandIn,
    SwingIn,
    RollIn,
    LightSpeedIn,
    RubberBand,
    Jello,
    HeartBeat,
}

const FADE_IN: &[f32] = &[0.0, 1.0];
const OPAQUE: &[f32] = &[1.0, 1.0];
const JELLO: &[f32] = &[0.0, -12.5, 6.25, -3.125, 1.5625, 0.0];

impl Transition {
    pub const ALL: [Transition; 18] = [
        Transition::FadeIn,
        Transition::SlideInLeft,
        Transition::SlideInRight,
        Transition::SlideInTop,
        Transition::SlideInBottom,
        Transition::ZoomIn,
        Transition::ZoomOut,
        Transition::RotateIn,
        Transition::FlipIn,
        Transition::BounceIn,
        Transition::SpiralIn,
        Transition::ExpandIn,
        Transition::SwingIn,
        Transition::RollIn,
        Transition::LightSpeedIn,
        Transition::RubberBand,
        Transition::Jello,
        Transition::HeartBeat,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Transition::FadeIn => "fadeIn",
            Transition::SlideInLeft => "slideInLeft",
            Transition::SlideInRight => "slideInRight",
            Transition::SlideInTop => "slideInTop",
            Transition::SlideInBottom => "slideInBottom",
            Transition::ZoomIn => "zoomIn",
            Transition::ZoomOut => "zoomOut",
            Transition::RotateIn => "rotateIn",
            Transition::FlipIn => "flipIn",
            Transition::BounceIn => "bounceIn",
            Transition::SpiralIn => "spiralIn",
            Transition::ExpandIn => "expandIn",
            Transition::SwingIn => "swingIn",
            Transition::RollIn => "rollIn",
            Transition::LightSpeedIn => "lightSpeedIn",
            Transition::RubberBand => "rubberBand",
            Transition::Jello => "jello",
            Transition::HeartBeat => "heartBeat",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    /// Parse an item's transition name, falling back to a fade
    pub fn resolve(name: Option<&str>) -> Self {
        match name {
            None => Self::default(),
            Some(name) => Self::from_name(name).unwrap_or_else(|| {
                debug!(transition = name, "Unknown transition, using fadeIn");
                Self::default()
            }),
        }
    }

    /// Keyframe tracks for this entrance
    pub fn tracks(self) -> Vec<Track> {
        use Property::{
            Opacity, Rotate, RotateY, Scale, ScaleX, ScaleY, SkewX, SkewY, TranslateX, TranslateY,
        };

        match self {
            Transition::FadeIn => vec![track(Opacity, FADE_IN)],
            Transition::SlideInLeft => {
                vec![track(TranslateX, &[-100.0, 0.0]), track(Opacity, OPAQUE)]
            }
            Transition::SlideInRight => {
                vec![track(TranslateX, &[100.0, 0.0]), track(Opacity, OPAQUE)]
            }
            Transition::SlideInTop => {
                vec![track(TranslateY, &[-100.0, 0.0]), track(Opacity, OPAQUE)]
            }
            Transition::SlideInBottom => {
                vec![track(TranslateY, &[100.0, 0.0]), track(Opacity, OPAQUE)]
            }
            Transition::ZoomIn => vec![track(Scale, &[0.8, 1.0]), track(Opacity, FADE_IN)],
            Transition::ZoomOut => vec![track(Scale, &[1.2, 1.0]), track(Opacity, FADE_IN)],
            Transition::RotateIn => vec![track(Rotate, &[-180.0, 0.0]), track(Opacity, FADE_IN)],
            Transition::FlipIn => vec![track(RotateY, &[-180.0, 0.0]), track(Opacity, FADE_IN)],
            Transition::BounceIn => vec![
                track(Scale, &[0.3, 1.05, 0.9, 1.0]),
                track(Opacity, FADE_IN),
            ],
            Transition::SpiralIn => vec![
                track(Scale, &[0.1, 1.0]),
                track(Rotate, &[-360.0, 0.0]),
                track(Opacity, FADE_IN),
            ],
            Transition::ExpandIn => vec![
                track(ScaleX, &[0.0, 1.0]),
                track(ScaleY, &[0.0, 1.0]),
                track(Opacity, FADE_IN),
            ],
            Transition::SwingIn => vec![
                track(Rotate, &[-15.0, 10.0, -5.0, 0.0]),
                track(Opacity, FADE_IN),
            ],
            Transition::RollIn => vec![
                track(TranslateX, &[-100.0, 0.0]),
                track(Rotate, &[-120.0, 0.0]),
                track(Opacity, FADE_IN),
            ],
            Transition::LightSpeedIn => vec![
                track(TranslateX, &[100.0, 0.0]),
                track(SkewX, &[-30.0, 0.0]),
                track(Opacity, FADE_IN),
            ],
            Transition::RubberBand => vec![
                track(ScaleX, &[1.0, 1.25, 0.75, 1.15, 0.95, 1.0]),
                track(ScaleY, &[1.0, 0.75, 1.25, 0.85, 1.05, 1.0]),
                track(Opacity, FADE_IN),
            ],
            Transition::Jello => vec![
                track(SkewX, JELLO),
                track(SkewY, JELLO),
                track(Opacity, FADE_IN),
            ],
            Transition::HeartBeat => vec![
                track(Scale, &[1.0, 1.3, 1.0, 1.3, 1.0]),
                track(Opacity, FADE_IN),
            ],
        }
    }

    /// Actual run time for a requested duration
    pub fn effective_duration(self, requested: Duration) -> Duration {
        match self {
            Transition::LightSpeedIn => requested.mul_f64(0.6),
            _ => requested,
        }
    }

    pub fn tween(self, requested: Duration) -> Tween {
        Tween::new(
            self.tracks(),
            self.effective_duration(requested),
            Easing::OutExpo,
        )
    }
}

/// Runs entrance and exit animations against the viewer
#[derive(Clone)]
pub struct TransitionEngine {
    viewer: Arc<dyn Viewer>,
    frame_interval: Duration,
    exit_duration: Duration,
}

impl TransitionEngine {
    pub fn new(viewer: Arc<dyn Viewer>, frame_interval: Duration, exit_duration: Duration) -> Self {
        Self {
            viewer,
            frame_interval,
            exit_duration,
        }
    }

    /// Attach `surface` and animate it in; resolves when the entrance ends
    pub async fn enter(&self, surface: &Surface, transition: Transition, duration: Duration) {
        let tween = transition.tween(duration);
        let id = surface.id;
        debug!(
            surface = %id,
            transition = transition.name(),
            duration_ms = tween.duration.as_millis() as u64,
            "Entering surface"
        );

        // Start state goes out with the attach so nothing flashes at rest
        self.viewer.attach(surface);
        tween
            .play(self.frame_interval, |props| {
                trace!(surface = %id, "entrance frame");
                self.viewer.animate(id, &props);
            })
            .await;
    }

    /// Fade a surface out and detach it
    pub async fn exit(&self, id: SurfaceId) {
        let tween = Tween::new(
            vec![track(Property::Opacity, &[1.0, 0.0])],
            self.exit_duration,
            Easing::OutExpo,
        );
        tween
            .play(self.frame_interval, |props| self.viewer.animate(id, &props))
            .await;
        self.viewer.detach(id);
        debug!(surface = %id, "Surface detached");
    }
}

impl std::fmt::Debug for TransitionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionEngine")
            .field("frame_interval", &self.frame_interval)
            .field("exit_duration", &self.exit_duration)
            .finish_non_exhaustive()
    }
}
