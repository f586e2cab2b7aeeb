//! Touch gesture recognition.
//!
//! [`GestureRecognizer`] turns raw pointer Down/Move/Up events into discrete
//! [`Gesture`]s: horizontal swipes become navigation (advance/retreat) and
//! short, nearly motionless touches become taps. Anything ambiguous is
//! dropped rather than guessed; misnavigating a kiosk is worse than ignoring
//! a sloppy touch.
//!
//! # State Machine
//!
//! ```text
//! Idle     --[Down]--> Tracking   (origin recorded)
//! Tracking --[Move]--> Tracking   (no state change; delta read at Up)
//! Tracking --[Up]----> Idle       (classify: swipe / tap / nothing)
//! Tracking --[Down]--> Tracking   (restart with the new origin)
//! ```
//!
//! # Classification
//!
//! At Up, with `dx`/`dy` the displacement from the origin and `dt` the touch
//! duration:
//!
//! - `|dx| >= swipe_threshold` and `|dx| > |dy|`: a swipe. Finger moving left
//!   (`dx < 0`) advances to the next screen, right retreats. Requiring
//!   horizontal dominance keeps diagonal scroll attempts from navigating.
//! - otherwise `|dx| < tap_threshold`, `|dy| < tap_threshold` and
//!   `dt <= tap_max_duration`: a tap at the Up coordinates.
//! - otherwise: nothing.
//!
//! The classification is a pure function of `(dx, dy, dt)` and the three
//! thresholds; `on_event` only moves the origin in and out. That keeps the
//! whole recognizer testable with synthetic events, no input device needed.

use std::time::{Duration, Instant};

use tracing::{debug, trace};

/// Default minimum horizontal travel for a swipe, in pixels.
pub const DEFAULT_SWIPE_THRESHOLD_PX: i32 = 100;

/// Default maximum displacement on either axis for a tap, in pixels.
pub const DEFAULT_TAP_THRESHOLD_PX: i32 = 10;

/// Default maximum touch duration for a tap, in milliseconds.
pub const DEFAULT_TAP_MAX_DURATION_MS: u64 = 300;

/// Phase of a raw pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    /// Finger made contact.
    Down,
    /// Finger moved while in contact.
    Move,
    /// Finger lifted.
    Up,
}

/// A raw pointer event from the input backend.
#[derive(Debug, Clone, Copy)]
pub struct TouchEvent {
    /// Contact phase.
    pub phase: TouchPhase,
    /// Horizontal position in pixels.
    pub x: i32,
    /// Vertical position in pixels.
    pub y: i32,
    /// When the event occurred.
    pub at: Instant,
}

impl TouchEvent {
    /// A finger-down event.
    pub fn down(x: i32, y: i32, at: Instant) -> Self {
        Self {
            phase: TouchPhase::Down,
            x,
            y,
            at,
        }
    }

    /// A finger-moved event.
    pub fn moved(x: i32, y: i32, at: Instant) -> Self {
        Self {
            phase: TouchPhase::Move,
            x,
            y,
            at,
        }
    }

    /// A finger-up event.
    pub fn up(x: i32, y: i32, at: Instant) -> Self {
        Self {
            phase: TouchPhase::Up,
            x,
            y,
            at,
        }
    }
}

/// A classified touch gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    /// Leftward swipe: go to the next screen.
    Advance,
    /// Rightward swipe: go to the previous screen.
    Retreat,
    /// Short stationary touch at the lift-off coordinates.
    Tap {
        /// Horizontal lift-off position in pixels.
        x: i32,
        /// Vertical lift-off position in pixels.
        y: i32,
    },
}

/// Thresholds for gesture classification.
#[derive(Debug, Clone)]
pub struct GestureConfig {
    /// Minimum horizontal travel for a swipe, in pixels.
    pub swipe_threshold: i32,
    /// Maximum per-axis displacement for a tap, in pixels.
    pub tap_threshold: i32,
    /// Maximum touch duration for a tap.
    pub tap_max_duration: Duration,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            swipe_threshold: DEFAULT_SWIPE_THRESHOLD_PX,
            tap_threshold: DEFAULT_TAP_THRESHOLD_PX,
            tap_max_duration: Duration::from_millis(DEFAULT_TAP_MAX_DURATION_MS),
        }
    }
}

impl GestureConfig {
    /// Sets the minimum horizontal travel for a swipe.
    pub fn with_swipe_threshold(mut self, pixels: i32) -> Self {
        self.swipe_threshold = pixels;
        self
    }

    /// Sets the maximum per-axis displacement for a tap.
    pub fn with_tap_threshold(mut self, pixels: i32) -> Self {
        self.tap_threshold = pixels;
        self
    }

    /// Sets the maximum touch duration for a tap.
    pub fn with_tap_max_duration(mut self, duration: Duration) -> Self {
        self.tap_max_duration = duration;
        self
    }
}

/// Origin of the touch currently being tracked.
#[derive(Debug, Clone, Copy)]
struct TouchOrigin {
    x: i32,
    y: i32,
    at: Instant,
}

/// Single-touch gesture state machine.
///
/// One instance per input stream, driven from the input/control thread;
/// multi-touch is not modeled. All mutation happens through
/// [`on_event`](Self::on_event), which emits at most one gesture per
/// down-move-up sequence.
pub struct GestureRecognizer {
    config: GestureConfig,
    origin: Option<TouchOrigin>,
}

impl GestureRecognizer {
    /// Creates a recognizer with the given thresholds.
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            origin: None,
        }
    }

    /// Feed one raw event through the state machine.
    ///
    /// A `Down` while already tracking discards the previous origin and
    /// starts over: the target hardware is single-touch, and without the
    /// restart a missed `Up` would wedge the recognizer on a dead origin.
    /// `Move` and `Up` without a prior `Down` are ignored.
    pub fn on_event(&mut self, event: TouchEvent) -> Option<Gesture> {
        match event.phase {
            TouchPhase::Down => {
                if self.origin.is_some() {
                    debug!("Second touch before lift, restarting gesture");
                }
                self.origin = Some(TouchOrigin {
                    x: event.x,
                    y: event.y,
                    at: event.at,
                });
                None
            }
            TouchPhase::Move => None,
            TouchPhase::Up => {
                let origin = self.origin.take()?;
                let dx = i64::from(event.x) - i64::from(origin.x);
                let dy = i64::from(event.y) - i64::from(origin.y);
                let dt = event.at.saturating_duration_since(origin.at);

                let gesture = classify(&self.config, dx, dy, dt, event.x, event.y);
                trace!(dx, dy, dt_ms = dt.as_millis() as u64, ?gesture, "Touch ended");
                gesture
            }
        }
    }

    /// Discard any in-flight touch without emitting a gesture.
    ///
    /// For the embedding loop to call when input focus is lost mid-touch.
    pub fn cancel(&mut self) {
        if self.origin.take().is_some() {
            debug!("In-flight touch cancelled");
        }
    }

    /// True while a touch is between Down and Up.
    pub fn is_tracking(&self) -> bool {
        self.origin.is_some()
    }
}

/// Classify a completed touch from its displacement and duration.
fn classify(
    config: &GestureConfig,
    dx: i64,
    dy: i64,
    dt: Duration,
    up_x: i32,
    up_y: i32,
) -> Option<Gesture> {
    let swipe = i64::from(config.swipe_threshold);
    let tap = i64::from(config.tap_threshold);

    if dx.abs() >= swipe && dx.abs() > dy.abs() {
        if dx < 0 {
            Some(Gesture::Advance)
        } else {
            Some(Gesture::Retreat)
        }
    } else if dx.abs() < tap && dy.abs() < tap && dt <= config.tap_max_duration {
        Some(Gesture::Tap { x: up_x, y: up_y })
    } else {
        None
    }
}
