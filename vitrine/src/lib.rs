//! Vitrine - kiosk dashboard core
//!
//! This library provides the engine behind a small touchscreen kiosk that
//! rotates through informational screens (clock, weather, prices, system
//! stats) while background tasks refresh the data each screen shows.
//!
//! The design splits the problem into four pieces:
//!
//! - [`cache::FreshnessCache`] — the single shared store. Pollers write fetch
//!   results and failures per key; the render loop reads the last good value
//!   together with explicit freshness metadata and never waits on a network
//!   call.
//! - [`poller::SourcePoller`] — one cancellable background task per external
//!   source, retrying failures on a capped exponential schedule.
//! - [`gesture::GestureRecognizer`] — a single-touch state machine turning
//!   raw Down/Move/Up events into swipes and taps.
//! - [`nav::ScreenController`] — the screen rotation and its wrapping active
//!   index.
//!
//! [`app::Dashboard`] wires them together for embedders that want the whole
//! core as one object. The actual rendering, input capture and configuration
//! parsing live in the embedding binary; this crate only ever sees plain
//! values and trait objects.

pub mod app;
pub mod cache;
pub mod gesture;
pub mod nav;
pub mod poller;
pub mod source;

pub use app::{Dashboard, DashboardConfig, DashboardError, DashboardStatus};
pub use cache::{CachedValue, FreshnessCache, SourceHealth, SourceStatus};
pub use gesture::{Gesture, GestureConfig, GestureRecognizer, TouchEvent, TouchPhase};
pub use nav::{NavigationError, NavigationIntent, ScreenController, ScreenSpec};
pub use poller::{BackoffPolicy, PollerConfig, PollerSet, ShutdownSummary, SourcePoller};
pub use source::{BoxFuture, FetchError, FetchSource};

/// Crate version, as baked in at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
