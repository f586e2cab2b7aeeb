//! Dashboard facade: wiring and lifecycle.
//!
//! [`Dashboard`] assembles the core into one object the embedding loop talks
//! to: a shared [`FreshnessCache`], a [`ScreenController`], a
//! [`GestureRecognizer`] and a [`PollerSet`]. The render side takes `Arc`
//! clones of the cache and controller and reads them every tick; the input
//! side feeds touch events and keyboard intents through the facade.

use std::sync::Arc;

use tracing::info;

use super::config::DashboardConfig;
use super::error::DashboardError;
use crate::cache::{FreshnessCache, SourceStatus};
use crate::gesture::{Gesture, GestureRecognizer, TouchEvent};
use crate::nav::{NavigationError, NavigationIntent, ScreenController, ScreenSpec};
use crate::poller::{PollerConfig, PollerSet, ShutdownSummary, SourcePoller};
use crate::source::FetchSource;

/// Point-in-time snapshot of the whole dashboard, for status screens and
/// diagnostics.
#[derive(Debug, Clone)]
pub struct DashboardStatus {
    /// Index of the screen currently shown.
    pub active_screen: usize,
    /// Number of screens in the rotation.
    pub screen_count: usize,
    /// Per-source cache health, sorted by key.
    pub sources: Vec<SourceStatus>,
}

/// The assembled dashboard core.
///
/// Generic over the cached value type `V`; a kiosk whose screens show
/// heterogeneous data typically uses an enum payload. Touch handling takes
/// `&mut self` because the recognizer is single-threaded state; everything
/// else takes `&self`.
///
/// # Example
///
/// ```ignore
/// use vitrine::{Dashboard, DashboardConfig, PollerConfig, ScreenSpec};
///
/// let screens = vec![
///     ScreenSpec::new("clock"),
///     ScreenSpec::new("weather").with_data_key("weather"),
/// ];
/// let mut dashboard = Dashboard::new(DashboardConfig::default(), screens)?;
/// dashboard.add_source(
///     PollerConfig::new("weather", Duration::from_secs(300)),
///     Arc::new(weather_api),
/// )?;
///
/// // Render loop: read-only handles.
/// let cache = dashboard.cache();
/// let controller = dashboard.controller();
///
/// // Input loop: feed raw events.
/// dashboard.handle_touch(event);
/// ```
pub struct Dashboard<V> {
    config: DashboardConfig,
    cache: Arc<FreshnessCache<V>>,
    controller: Arc<ScreenController>,
    recognizer: GestureRecognizer,
    pollers: PollerSet,
}

impl<V: Send + Sync + 'static> Dashboard<V> {
    /// Wires an empty dashboard over the given screen rotation.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Navigation`] when `screens` is empty.
    pub fn new(
        config: DashboardConfig,
        screens: Vec<ScreenSpec>,
    ) -> Result<Self, DashboardError> {
        let controller = Arc::new(ScreenController::new(screens)?);
        let cache = Arc::new(FreshnessCache::new(config.default_stale_after));
        let recognizer = GestureRecognizer::new(config.gesture.clone());

        info!(screens = controller.screen_count(), "Dashboard assembled");

        Ok(Self {
            config,
            cache,
            controller,
            recognizer,
            pollers: PollerSet::new(),
        })
    }

    /// Registers a data source and starts polling it immediately.
    ///
    /// The poller registers its cache key as pending and performs its
    /// cold-start fetch right away, so the source shows up in
    /// [`status`](Self::status) before anything arrives.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::DuplicateSource`] when a source already
    /// polls this key.
    pub fn add_source(
        &mut self,
        config: PollerConfig,
        source: Arc<dyn FetchSource<V>>,
    ) -> Result<(), DashboardError> {
        if self.pollers.contains(&config.key) {
            return Err(DashboardError::DuplicateSource {
                key: config.key.clone(),
            });
        }
        let poller = SourcePoller::new(config, source, Arc::clone(&self.cache));
        self.pollers.spawn(poller);
        Ok(())
    }

    /// Feeds one raw touch event through the recognizer.
    ///
    /// Swipe gestures are applied to the screen controller internally; the
    /// classified gesture is returned either way so the embedder can react
    /// to taps (and observe navigation if it wants to animate it).
    pub fn handle_touch(&mut self, event: TouchEvent) -> Option<Gesture> {
        let gesture = self.recognizer.on_event(event)?;
        match gesture {
            Gesture::Advance => {
                self.controller.advance();
            }
            Gesture::Retreat => {
                self.controller.retreat();
            }
            Gesture::Tap { .. } => {}
        }
        Some(gesture)
    }

    /// Applies a keyboard-equivalent navigation command.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError::OutOfRange`] for an invalid jump target.
    pub fn handle_intent(&self, intent: NavigationIntent) -> Result<usize, NavigationError> {
        self.controller.apply(intent)
    }

    /// Discards any in-flight touch, for when the input backend loses focus.
    pub fn cancel_touch(&mut self) {
        self.recognizer.cancel();
    }

    /// Asks the poller feeding the active screen to fetch again now.
    ///
    /// Returns false when the active screen has no data key or no poller
    /// serves it (a clock screen, say).
    pub fn refresh_active(&self) -> bool {
        match &self.controller.active_screen().data_key {
            Some(key) => self.pollers.refresh(key),
            None => false,
        }
    }

    /// Asks every poller to fetch again now.
    pub fn refresh_all(&self) {
        self.pollers.refresh_all();
    }

    /// Shared handle to the cache, for the render side.
    pub fn cache(&self) -> Arc<FreshnessCache<V>> {
        Arc::clone(&self.cache)
    }

    /// Shared handle to the screen controller, for the render side.
    pub fn controller(&self) -> Arc<ScreenController> {
        Arc::clone(&self.controller)
    }

    /// Snapshot of navigation state and per-source health.
    pub fn status(&self) -> DashboardStatus {
        DashboardStatus {
            active_screen: self.controller.active(),
            screen_count: self.controller.screen_count(),
            sources: self.cache.statuses(),
        }
    }

    /// Stops every poller within the configured grace budget.
    ///
    /// Consumes the dashboard; the cache and controller stay alive through
    /// any `Arc` clones the render side still holds.
    pub async fn shutdown(self) -> ShutdownSummary {
        info!("Dashboard shutting down");
        self.pollers.shutdown(self.config.shutdown_grace).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::SourceHealth;
    use crate::source::FetchError;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::{Duration, Instant};

    fn kiosk_screens() -> Vec<ScreenSpec> {
        vec![
            ScreenSpec::new("clock"),
            ScreenSpec::new("weather").with_data_key("weather"),
            ScreenSpec::new("bitcoin").with_data_key("bitcoin"),
        ]
    }

    fn counting_source() -> (Arc<dyn FetchSource<u32>>, Arc<AtomicU32>) {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let source = move || {
            let counter = Arc::clone(&counter);
            async move { Ok::<_, FetchError>(counter.fetch_add(1, Ordering::SeqCst) + 1) }
        };
        (Arc::new(source), calls)
    }

    #[tokio::test]
    async fn test_empty_screen_list_fails_construction() {
        let result = Dashboard::<u32>::new(DashboardConfig::default(), Vec::new());
        assert!(matches!(
            result.err(),
            Some(DashboardError::Navigation(NavigationError::NoScreens))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_source_rejected() {
        let mut dashboard =
            Dashboard::<u32>::new(DashboardConfig::default(), kiosk_screens()).unwrap();
        let (source, _) = counting_source();

        dashboard
            .add_source(
                PollerConfig::new("weather", Duration::from_secs(3600)),
                Arc::clone(&source),
            )
            .unwrap();

        let result =
            dashboard.add_source(PollerConfig::new("weather", Duration::from_secs(60)), source);
        assert!(matches!(
            result.err(),
            Some(DashboardError::DuplicateSource { key }) if key == "weather"
        ));

        dashboard.shutdown().await;
    }

    #[tokio::test]
    async fn test_swipes_drive_navigation() {
        let mut dashboard =
            Dashboard::<u32>::new(DashboardConfig::default(), kiosk_screens()).unwrap();
        let t0 = Instant::now();

        dashboard.handle_touch(TouchEvent::down(300, 100, t0));
        let gesture =
            dashboard.handle_touch(TouchEvent::up(100, 100, t0 + Duration::from_millis(80)));
        assert_eq!(gesture, Some(Gesture::Advance));
        assert_eq!(dashboard.controller().active(), 1);

        let t1 = t0 + Duration::from_secs(1);
        dashboard.handle_touch(TouchEvent::down(100, 100, t1));
        let gesture =
            dashboard.handle_touch(TouchEvent::up(300, 100, t1 + Duration::from_millis(80)));
        assert_eq!(gesture, Some(Gesture::Retreat));
        assert_eq!(dashboard.controller().active(), 0);
    }

    #[tokio::test]
    async fn test_tap_does_not_navigate() {
        let mut dashboard =
            Dashboard::<u32>::new(DashboardConfig::default(), kiosk_screens()).unwrap();
        let t0 = Instant::now();

        dashboard.handle_touch(TouchEvent::down(200, 100, t0));
        let gesture =
            dashboard.handle_touch(TouchEvent::up(202, 101, t0 + Duration::from_millis(40)));
        assert_eq!(gesture, Some(Gesture::Tap { x: 202, y: 101 }));
        assert_eq!(dashboard.controller().active(), 0);
    }

    #[tokio::test]
    async fn test_intents_are_keyboard_path() {
        let dashboard =
            Dashboard::<u32>::new(DashboardConfig::default(), kiosk_screens()).unwrap();

        assert_eq!(dashboard.handle_intent(NavigationIntent::Advance), Ok(1));
        assert_eq!(dashboard.handle_intent(NavigationIntent::JumpTo(2)), Ok(2));
        assert!(dashboard.handle_intent(NavigationIntent::JumpTo(7)).is_err());
        assert_eq!(dashboard.controller().active(), 2);
    }

    #[tokio::test]
    async fn test_refresh_active_routes_by_data_key() {
        let mut dashboard =
            Dashboard::<u32>::new(DashboardConfig::default(), kiosk_screens()).unwrap();
        let (source, calls) = counting_source();
        dashboard
            .add_source(PollerConfig::new("weather", Duration::from_secs(3600)), source)
            .unwrap();

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Screen 0 is the clock: nothing to refresh.
        assert!(!dashboard.refresh_active());

        // Screen 1 reads "weather": the poke reaches its poller.
        dashboard.handle_intent(NavigationIntent::JumpTo(1)).unwrap();
        assert!(dashboard.refresh_active());
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        // Screen 2 reads "bitcoin", which has no poller.
        dashboard.handle_intent(NavigationIntent::JumpTo(2)).unwrap();
        assert!(!dashboard.refresh_active());

        dashboard.shutdown().await;
    }

    #[tokio::test]
    async fn test_status_snapshot() {
        let mut dashboard =
            Dashboard::<u32>::new(DashboardConfig::default(), kiosk_screens()).unwrap();
        let (source, _) = counting_source();
        dashboard
            .add_source(PollerConfig::new("weather", Duration::from_secs(3600)), source)
            .unwrap();

        tokio::time::sleep(Duration::from_millis(40)).await;
        dashboard.handle_intent(NavigationIntent::Advance).unwrap();

        let status = dashboard.status();
        assert_eq!(status.active_screen, 1);
        assert_eq!(status.screen_count, 3);
        assert_eq!(status.sources.len(), 1);
        assert_eq!(status.sources[0].key, "weather");
        assert_eq!(status.sources[0].health, SourceHealth::Ok);

        dashboard.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_is_clean() {
        let mut dashboard = Dashboard::<u32>::new(
            DashboardConfig::default().with_shutdown_grace(Duration::from_millis(500)),
            kiosk_screens(),
        )
        .unwrap();
        for key in ["weather", "bitcoin"] {
            let (source, _) = counting_source();
            dashboard
                .add_source(PollerConfig::new(key, Duration::from_secs(3600)), source)
                .unwrap();
        }

        tokio::time::sleep(Duration::from_millis(30)).await;
        let summary = dashboard.shutdown().await;
        assert!(summary.is_clean());
        assert_eq!(summary.stopped.len(), 2);
    }

    #[tokio::test]
    async fn test_cache_handle_outlives_dashboard() {
        let mut dashboard =
            Dashboard::<u32>::new(DashboardConfig::default(), kiosk_screens()).unwrap();
        let (source, _) = counting_source();
        dashboard
            .add_source(PollerConfig::new("weather", Duration::from_secs(3600)), source)
            .unwrap();
        let cache = dashboard.cache();

        tokio::time::sleep(Duration::from_millis(40)).await;
        dashboard.shutdown().await;

        // The render side keeps showing the last good value after teardown.
        assert_eq!(*cache.get("weather").unwrap().value, 1);
    }
}
