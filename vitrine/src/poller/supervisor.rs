//! Lifecycle management for a set of source pollers.
//!
//! [`PollerSet`] owns the spawned poller tasks and a master cancellation
//! token. It routes manual refresh requests by key and performs bounded
//! shutdown: cancel everything, then await each task against a shared grace
//! deadline, aborting whatever ignores the signal. Process teardown is never
//! held hostage by one stuck fetch.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::{RefreshHandle, SourcePoller};

/// Outcome of a bounded shutdown.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSummary {
    /// Keys whose tasks ended within the grace budget.
    pub stopped: Vec<String>,
    /// Keys whose tasks were still running at the deadline and got aborted.
    pub stragglers: Vec<String>,
}

impl ShutdownSummary {
    /// True when every poller stopped without being aborted.
    pub fn is_clean(&self) -> bool {
        self.stragglers.is_empty()
    }
}

impl fmt::Display for ShutdownSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clean() {
            write!(f, "{} pollers stopped cleanly", self.stopped.len())
        } else {
            write!(
                f,
                "{} pollers stopped, {} aborted: {}",
                self.stopped.len(),
                self.stragglers.len(),
                self.stragglers.join(", ")
            )
        }
    }
}

/// Owns running poller tasks and their master cancellation token.
///
/// Keys are expected to be unique per set; the dashboard facade rejects
/// duplicates before anything reaches [`spawn`](Self::spawn).
#[derive(Default)]
pub struct PollerSet {
    cancellation: CancellationToken,
    tasks: Vec<(String, JoinHandle<()>)>,
    refresh_handles: HashMap<String, RefreshHandle>,
}

impl PollerSet {
    /// Creates an empty set with a fresh master token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns a poller on the tokio runtime under the master token.
    pub fn spawn<V>(&mut self, poller: SourcePoller<V>)
    where
        V: Send + Sync + 'static,
    {
        let key = poller.key().to_string();
        let refresh = poller.refresh_handle();
        let handle = tokio::spawn(poller.run(self.cancellation.child_token()));
        self.refresh_handles.insert(key.clone(), refresh);
        self.tasks.push((key, handle));
    }

    /// Whether a poller with this key has been spawned.
    pub fn contains(&self, key: &str) -> bool {
        self.refresh_handles.contains_key(key)
    }

    /// Number of spawned pollers.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// True when no poller has been spawned yet.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Ask one poller to fetch again now. Returns false for unknown keys.
    pub fn refresh(&self, key: &str) -> bool {
        match self.refresh_handles.get(key) {
            Some(handle) => {
                handle.request_refresh();
                true
            }
            None => false,
        }
    }

    /// Ask every poller to fetch again now.
    pub fn refresh_all(&self) {
        for handle in self.refresh_handles.values() {
            handle.request_refresh();
        }
    }

    /// Cancel every poller and await them against one grace deadline.
    ///
    /// Tasks still running at the deadline are aborted and reported as
    /// stragglers; a panicked task is logged and counted as stopped since it
    /// is no longer running.
    pub async fn shutdown(self, grace: Duration) -> ShutdownSummary {
        info!(pollers = self.tasks.len(), "Stopping source pollers");
        self.cancellation.cancel();

        let deadline = tokio::time::Instant::now() + grace;
        let mut summary = ShutdownSummary::default();

        for (key, mut handle) in self.tasks {
            match tokio::time::timeout_at(deadline, &mut handle).await {
                Ok(Ok(())) => summary.stopped.push(key),
                Ok(Err(join_error)) => {
                    warn!(key = %key, error = %join_error, "Poller task panicked");
                    summary.stopped.push(key);
                }
                Err(_) => {
                    warn!(key = %key, "Poller ignored cancellation, aborting");
                    handle.abort();
                    summary.stragglers.push(key);
                }
            }
        }

        info!(%summary, "Source pollers stopped");
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::FreshnessCache;
    use crate::poller::PollerConfig;
    use crate::source::{FetchError, FetchSource};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn counting_source() -> (Arc<dyn FetchSource<u32>>, Arc<AtomicU32>) {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let source = move || {
            let counter = Arc::clone(&counter);
            async move { Ok::<_, FetchError>(counter.fetch_add(1, Ordering::SeqCst) + 1) }
        };
        (Arc::new(source), calls)
    }

    fn slow_poller(
        key: &str,
        cache: &Arc<FreshnessCache<u32>>,
    ) -> (SourcePoller<u32>, Arc<AtomicU32>) {
        let (source, calls) = counting_source();
        let poller = SourcePoller::new(
            PollerConfig::new(key, Duration::from_secs(3600)),
            source,
            Arc::clone(cache),
        );
        (poller, calls)
    }

    #[tokio::test]
    async fn test_empty_set_shuts_down_clean() {
        let set = PollerSet::new();
        assert!(set.is_empty());

        let summary = set.shutdown(Duration::from_millis(100)).await;
        assert!(summary.is_clean());
        assert!(summary.stopped.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_routes_by_key() {
        let cache = Arc::new(FreshnessCache::new(Duration::from_secs(60)));
        let (poller_a, calls_a) = slow_poller("a", &cache);
        let (poller_b, calls_b) = slow_poller("b", &cache);

        let mut set = PollerSet::new();
        set.spawn(poller_a);
        set.spawn(poller_b);
        assert_eq!(set.len(), 2);
        assert!(set.contains("a"));
        assert!(!set.contains("c"));

        // Both cold-start fetches land, then the pollers sleep for an hour.
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(calls_a.load(Ordering::SeqCst), 1);
        assert_eq!(calls_b.load(Ordering::SeqCst), 1);

        assert!(set.refresh("a"));
        assert!(!set.refresh("missing"));
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(calls_a.load(Ordering::SeqCst), 2);
        assert_eq!(calls_b.load(Ordering::SeqCst), 1);

        set.refresh_all();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(calls_a.load(Ordering::SeqCst), 3);
        assert_eq!(calls_b.load(Ordering::SeqCst), 2);

        let summary = set.shutdown(Duration::from_millis(500)).await;
        assert!(summary.is_clean());
    }

    #[tokio::test]
    async fn test_shutdown_stops_all_within_grace() {
        let cache = Arc::new(FreshnessCache::new(Duration::from_secs(60)));
        let mut set = PollerSet::new();
        for key in ["weather", "bitcoin", "calendar"] {
            let (poller, _) = slow_poller(key, &cache);
            set.spawn(poller);
        }

        tokio::time::sleep(Duration::from_millis(30)).await;
        let summary = set.shutdown(Duration::from_millis(500)).await;

        assert!(summary.is_clean());
        assert_eq!(summary.stopped.len(), 3);
        assert!(summary.stopped.contains(&"bitcoin".to_string()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_shutdown_reports_stragglers() {
        let cache = Arc::new(FreshnessCache::new(Duration::from_secs(60)));

        // A fetch that blocks its worker thread cannot observe cancellation
        // until it finishes, long after the grace deadline.
        let source = || async {
            std::thread::sleep(Duration::from_millis(400));
            Ok::<_, FetchError>(1u32)
        };
        let poller = SourcePoller::new(
            PollerConfig::new("stuck", Duration::from_secs(3600)),
            Arc::new(source),
            Arc::clone(&cache),
        );

        let mut set = PollerSet::new();
        set.spawn(poller);

        tokio::time::sleep(Duration::from_millis(20)).await;
        let summary = set.shutdown(Duration::from_millis(50)).await;

        assert!(!summary.is_clean());
        assert_eq!(summary.stragglers, vec!["stuck".to_string()]);
    }

    #[test]
    fn test_summary_display() {
        let clean = ShutdownSummary {
            stopped: vec!["a".to_string(), "b".to_string()],
            stragglers: vec![],
        };
        assert_eq!(format!("{}", clean), "2 pollers stopped cleanly");

        let dirty = ShutdownSummary {
            stopped: vec!["a".to_string()],
            stragglers: vec!["b".to_string(), "c".to_string()],
        };
        let rendered = format!("{}", dirty);
        assert!(rendered.contains("1 pollers stopped"));
        assert!(rendered.contains("aborted: b, c"));
    }
}
