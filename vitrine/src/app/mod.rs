//! Dashboard assembly and lifecycle.
//!
//! The [`Dashboard`] facade wires the crate's pieces together the way the
//! kiosk binary uses them:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                      Dashboard                       │
//! │                                                      │
//! │  PollerSet ── SourcePoller per key ──► FreshnessCache│
//! │                                              ▲       │
//! │  GestureRecognizer ──► ScreenController      │       │
//! │        ▲                     ▲               │       │
//! └────────┼─────────────────────┼───────────────┼───────┘
//!          │ touch events        │ intents       │ get()
//!       input loop          keyboard map     render loop
//! ```
//!
//! Configuration arrives as plain values in [`DashboardConfig`]; where those
//! values come from (files, environment, flags) is the embedder's concern.

mod config;
mod dashboard;
mod error;

pub use config::{DashboardConfig, DEFAULT_SHUTDOWN_GRACE_SECS, DEFAULT_STALE_AFTER_SECS};
pub use dashboard::{Dashboard, DashboardStatus};
pub use error::DashboardError;
