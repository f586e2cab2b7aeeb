//! Dashboard configuration.
//!
//! `DashboardConfig` carries the plain values the core needs at construction
//! time. File parsing, environment lookups and CLI flags are the embedder's
//! business; whatever reads them builds one of these.

use std::time::Duration;

use crate::gesture::GestureConfig;

/// Default staleness threshold (in seconds) for keys without a per-source
/// override.
///
/// Fifteen minutes: a source on the classic five-minute poll cadence stays
/// "fresh" through two missed cycles before screens flag it.
pub const DEFAULT_STALE_AFTER_SECS: u64 = 900;

/// Default grace budget (in seconds) for stopping pollers at shutdown.
pub const DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 2;

/// Top-level configuration for [`Dashboard`](super::Dashboard).
#[derive(Clone, Debug)]
pub struct DashboardConfig {
    /// Staleness threshold for cache keys registered without their own.
    pub default_stale_after: Duration,

    /// Gesture classification thresholds.
    pub gesture: GestureConfig,

    /// How long shutdown waits for pollers before aborting stragglers.
    pub shutdown_grace: Duration,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            default_stale_after: Duration::from_secs(DEFAULT_STALE_AFTER_SECS),
            gesture: GestureConfig::default(),
            shutdown_grace: Duration::from_secs(DEFAULT_SHUTDOWN_GRACE_SECS),
        }
    }
}

impl DashboardConfig {
    /// Sets the cache-wide default staleness threshold.
    pub fn with_default_stale_after(mut self, stale_after: Duration) -> Self {
        self.default_stale_after = stale_after;
        self
    }

    /// Sets the gesture thresholds.
    pub fn with_gesture(mut self, gesture: GestureConfig) -> Self {
        self.gesture = gesture;
        self
    }

    /// Sets the shutdown grace budget.
    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }
}
