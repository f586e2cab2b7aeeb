//! Background refresh loops feeding the cache.
//!
//! One [`SourcePoller`] runs per external data source, as an independent
//! tokio task. Pollers never talk to each other and never touch the render
//! side; the cache is the only meeting point, so one source's outage cannot
//! delay another's refresh.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   fetch()    ┌──────────────┐
//! │ SourcePoller │─────────────►│ FetchSource  │
//! │ (tokio task) │◄─────────────│  (external)  │
//! └──────┬───────┘  value / err └──────────────┘
//!        │ put / put_error
//!        ▼
//! ┌──────────────┐    get()     ┌──────────────┐
//! │FreshnessCache│◄─────────────│ render loop  │
//! └──────────────┘              └──────────────┘
//! ```
//!
//! # Refresh cycle
//!
//! The first fetch happens immediately on start (a kiosk that boots with
//! blank screens for a whole poll interval looks broken). After a success the
//! poller sleeps the nominal interval; after a failure it retries on the
//! capped exponential schedule of [`BackoffPolicy`]. Failures are retried
//! forever; none are fatal.
//!
//! # Example
//!
//! ```ignore
//! use vitrine::poller::{PollerConfig, SourcePoller};
//!
//! let config = PollerConfig::new("weather", Duration::from_secs(300));
//! let poller = SourcePoller::new(config, Arc::new(weather_api), Arc::clone(&cache));
//! let refresh = poller.refresh_handle();
//!
//! let shutdown = CancellationToken::new();
//! tokio::spawn(poller.run(shutdown.clone()));
//!
//! // Later: force an immediate re-fetch.
//! refresh.request_refresh();
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::FreshnessCache;
use crate::source::FetchSource;

mod backoff;
mod supervisor;

pub use backoff::{BackoffPolicy, DEFAULT_BACKOFF_BASE_SECS, DEFAULT_CAP_EXPONENT};
pub use supervisor::{PollerSet, ShutdownSummary};

/// Staleness threshold applied when a poller's config does not override it,
/// as a multiple of the poll interval.
pub const DEFAULT_STALE_MULTIPLIER: u32 = 3;

/// Per-source polling configuration. Immutable once the poller is created.
#[derive(Clone, Debug)]
pub struct PollerConfig {
    /// Cache key this source writes to.
    pub key: String,
    /// Nominal duration between fetch attempts.
    pub interval: Duration,
    /// Staleness threshold override; defaults to
    /// `interval * DEFAULT_STALE_MULTIPLIER`.
    pub stale_after: Option<Duration>,
    /// Retry schedule applied after consecutive failures.
    pub backoff: BackoffPolicy,
}

impl PollerConfig {
    /// Creates a config with the default staleness multiple and backoff.
    pub fn new(key: impl Into<String>, interval: Duration) -> Self {
        Self {
            key: key.into(),
            interval,
            stale_after: None,
            backoff: BackoffPolicy::default(),
        }
    }

    /// Sets an explicit staleness threshold for this source.
    pub fn with_stale_after(mut self, stale_after: Duration) -> Self {
        self.stale_after = Some(stale_after);
        self
    }

    /// Sets the retry schedule for this source.
    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    /// The staleness threshold this source registers with.
    pub fn effective_stale_after(&self) -> Duration {
        self.stale_after
            .unwrap_or(self.interval * DEFAULT_STALE_MULTIPLIER)
    }
}

/// Handle for requesting an immediate re-fetch from a running poller.
///
/// Cloneable and cheap; pokes are lossy by design. Several requests during
/// one in-flight fetch collapse into a single extra fetch, which is the
/// debounce a "refresh" button wants.
#[derive(Clone, Debug)]
pub struct RefreshHandle {
    notify: Arc<Notify>,
}

impl RefreshHandle {
    /// Cut the poller's current sleep short so it fetches again now.
    pub fn request_refresh(&self) {
        self.notify.notify_one();
    }
}

/// Background refresh task for one data source.
///
/// Owns the fetch capability and a cache handle; created once, then consumed
/// by [`run`](Self::run) on a tokio task. Construction registers the cache
/// key so the source shows up as pending before its first fetch lands.
pub struct SourcePoller<V> {
    config: PollerConfig,
    source: Arc<dyn FetchSource<V>>,
    cache: Arc<FreshnessCache<V>>,
    refresh: Arc<Notify>,
}

impl<V> SourcePoller<V> {
    /// Creates a poller and registers its key in the cache.
    pub fn new(
        config: PollerConfig,
        source: Arc<dyn FetchSource<V>>,
        cache: Arc<FreshnessCache<V>>,
    ) -> Self {
        cache.register_with(&config.key, config.effective_stale_after());
        Self {
            config,
            source,
            cache,
            refresh: Arc::new(Notify::new()),
        }
    }

    /// The cache key this poller writes.
    pub fn key(&self) -> &str {
        &self.config.key
    }

    /// Handle for manual refresh requests against this poller.
    pub fn refresh_handle(&self) -> RefreshHandle {
        RefreshHandle {
            notify: Arc::clone(&self.refresh),
        }
    }

    /// Runs the refresh cycle until `shutdown` is cancelled.
    ///
    /// Cancellation is observed at both loop boundaries: an in-flight fetch
    /// is dropped and a sleep is cut short, so the task exits within one
    /// select arm of the signal.
    pub async fn run(self, shutdown: CancellationToken) {
        let Self {
            config,
            source,
            cache,
            refresh,
        } = self;
        let key = config.key;

        info!(
            key = %key,
            interval_secs = config.interval.as_secs(),
            "Source poller starting"
        );

        let mut failures: u32 = 0;
        loop {
            let fetched = tokio::select! {
                biased;

                _ = shutdown.cancelled() => break,

                result = source.fetch() => result,
            };

            match fetched {
                Ok(value) => {
                    cache.put(&key, value);
                    if failures > 0 {
                        info!(key = %key, after_failures = failures, "Source recovered");
                    }
                    failures = 0;
                }
                Err(error) => {
                    failures += 1;
                    warn!(key = %key, consecutive = failures, %error, "Fetch failed");
                    cache.put_error(&key, error);
                }
            }

            let delay = config.backoff.delay_after(failures, config.interval);
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => break,

                _ = refresh.notified() => {
                    debug!(key = %key, "Manual refresh requested, fetching now");
                }

                _ = tokio::time::sleep(delay) => {}
            }
        }

        info!(key = %key, "Source poller stopped");
    }
}
