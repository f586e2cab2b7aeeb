//! Dashboard-level error types.

use thiserror::Error;

use crate::nav::NavigationError;

/// Errors that can occur while wiring or driving a dashboard.
///
/// All of these are integration misuse surfaced to the embedder; nothing a
/// running kiosk produces at steady state lands here. Fetch failures in
/// particular never surface as errors — they live in the cache as status
/// metadata.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Screen navigation setup or use failed.
    #[error("navigation error: {0}")]
    Navigation(#[from] NavigationError),

    /// Two sources were registered under the same cache key.
    #[error("source key '{key}' is already registered")]
    DuplicateSource {
        /// The contested cache key.
        key: String,
    },
}
