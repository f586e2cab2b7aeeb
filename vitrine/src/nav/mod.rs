//! Screen rotation state.
//!
//! [`ScreenController`] owns the ordered list of screens and the active
//! index. Navigation wraps at both ends, so a kiosk cycling four screens
//! advances 0 → 1 → 2 → 3 → 0 and retreats the other way.
//!
//! The active index lives in an atomic: mutations come from the single
//! input/control thread, while a render thread may read
//! [`active`](ScreenController::active) every tick without locking. Intents
//! crossing threads belong in the embedder's queue, not in shared mutable
//! state here.

use std::sync::atomic::{AtomicUsize, Ordering};

use thiserror::Error;
use tracing::debug;

/// A discrete navigation command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationIntent {
    /// Go to the next screen, wrapping past the last.
    Advance,
    /// Go to the previous screen, wrapping past the first.
    Retreat,
    /// Go directly to a screen index (keyboard shortcut, deep link).
    JumpTo(usize),
}

/// Navigation misuse surfaced to the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NavigationError {
    /// A jump target outside `[0, screen_count)`.
    #[error("screen index {index} out of range, {screen_count} screens configured")]
    OutOfRange {
        /// The rejected index.
        index: usize,
        /// Number of configured screens.
        screen_count: usize,
    },

    /// A controller cannot run an empty rotation.
    #[error("screen list is empty")]
    NoScreens,
}

/// One screen in the rotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenSpec {
    /// Display name, used in logs and status output.
    pub name: String,
    /// Cache key feeding this screen, if it shows polled data.
    ///
    /// A clock screen has none; a weather screen names the key its poller
    /// writes, which also routes force-refresh requests.
    pub data_key: Option<String>,
}

impl ScreenSpec {
    /// Creates a screen without a data key.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_key: None,
        }
    }

    /// Sets the cache key this screen reads.
    pub fn with_data_key(mut self, key: impl Into<String>) -> Self {
        self.data_key = Some(key.into());
        self
    }
}

/// Holds the screen list and the active index.
///
/// Mutating methods take `&self`; the index is atomic so concurrent readers
/// see a consistent value. Wrap-around arithmetic assumes a single mutating
/// thread, per the crate's concurrency model.
pub struct ScreenController {
    screens: Vec<ScreenSpec>,
    active: AtomicUsize,
}

impl ScreenController {
    /// Creates a controller starting at screen 0.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError::NoScreens`] for an empty list; a kiosk
    /// with nothing to show is a wiring bug worth surfacing at startup.
    pub fn new(screens: Vec<ScreenSpec>) -> Result<Self, NavigationError> {
        if screens.is_empty() {
            return Err(NavigationError::NoScreens);
        }
        Ok(Self {
            screens,
            active: AtomicUsize::new(0),
        })
    }

    /// Number of screens in the rotation.
    pub fn screen_count(&self) -> usize {
        self.screens.len()
    }

    /// The configured screens, in rotation order.
    pub fn screens(&self) -> &[ScreenSpec] {
        &self.screens
    }

    /// Index of the active screen. Read by the render loop every tick.
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// The active screen's spec.
    pub fn active_screen(&self) -> &ScreenSpec {
        &self.screens[self.active()]
    }

    /// Move to the next screen, wrapping past the end.
    pub fn advance(&self) -> usize {
        let next = (self.active() + 1) % self.screens.len();
        self.set_active(next);
        next
    }

    /// Move to the previous screen, wrapping past the start.
    pub fn retreat(&self) -> usize {
        let count = self.screens.len();
        let next = (self.active() + count - 1) % count;
        self.set_active(next);
        next
    }

    /// Move directly to `index`.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError::OutOfRange`] when `index` is not in
    /// `[0, screen_count)`.
    pub fn jump_to(&self, index: usize) -> Result<usize, NavigationError> {
        if index >= self.screens.len() {
            return Err(NavigationError::OutOfRange {
                index,
                screen_count: self.screens.len(),
            });
        }
        self.set_active(index);
        Ok(index)
    }

    /// Apply a navigation intent, returning the new active index.
    pub fn apply(&self, intent: NavigationIntent) -> Result<usize, NavigationError> {
        match intent {
            NavigationIntent::Advance => Ok(self.advance()),
            NavigationIntent::Retreat => Ok(self.retreat()),
            NavigationIntent::JumpTo(index) => self.jump_to(index),
        }
    }

    fn set_active(&self, index: usize) {
        self.active.store(index, Ordering::SeqCst);
        debug!(
            screen = %self.screens[index].name,
            index,
            of = self.screens.len(),
            "Switched screen"
        );
    }
}
