//! Data source abstraction.
//!
//! This module defines the boundary between the dashboard core and whatever
//! produces screen data (HTTP APIs, system probes, a calendar backend). The
//! core consumes a [`FetchSource`]: one async call that either yields a fresh
//! value or fails with a [`FetchError`]. Transport, authentication and
//! response parsing all live on the far side of this trait.
//!
//! # Design Principles
//!
//! - **One call, one value**: a fetch performs the whole round trip and
//!   returns a screen-ready value; no streaming, no partial results
//! - **Opaque failures**: the poller retries every error the same way, so the
//!   variants exist for status displays, not for control flow
//! - **Own your deadline**: implementations carry their own timeout; a fetch
//!   that can hang forever would stall its poller's refresh cycle
//! - **Dyn-compatible**: uses `Pin<Box<dyn Future>>` so a poller can hold
//!   `Arc<dyn FetchSource<V>>`
//!
//! # Example
//!
//! ```ignore
//! use vitrine::source::{BoxFuture, FetchError, FetchSource};
//!
//! struct WeatherApi {
//!     endpoint: String,
//! }
//!
//! impl FetchSource<Weather> for WeatherApi {
//!     fn fetch(&self) -> BoxFuture<'_, Result<Weather, FetchError>> {
//!         Box::pin(async move {
//!             let response = http_get(&self.endpoint)
//!                 .await
//!                 .map_err(|e| FetchError::Network(e.to_string()))?;
//!             parse_weather(&response).map_err(|e| FetchError::Malformed(e.to_string()))
//!         })
//!     }
//! }
//! ```

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use thiserror::Error;

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Errors a fetch attempt can produce.
///
/// All variants are handled identically by the retry machinery; the
/// distinction exists so status indicators can say what went wrong.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Transport-level failure (connection refused, DNS, TLS).
    #[error("network error: {0}")]
    Network(String),

    /// The source answered but the payload could not be interpreted.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The source asked us to slow down.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// The fetch exceeded its own deadline.
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// A single external data source.
///
/// Implementations perform one complete fetch per call and are shared across
/// tasks behind an `Arc`, so the call takes `&self`.
///
/// # Returns
///
/// - `Ok(value)` on a successful round trip
/// - `Err(FetchError)` on any failure; the caller records it and retries
pub trait FetchSource<V>: Send + Sync {
    /// Attempt to produce a fresh value.
    fn fetch(&self) -> BoxFuture<'_, Result<V, FetchError>>;
}

/// Blanket implementation so plain async closures work as sources.
///
/// Lets tests and simple embedders write
/// `dashboard.add_source(config, || async { probe().await })` without a
/// dedicated type.
impl<V, F, Fut> FetchSource<V> for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<V, FetchError>> + Send + 'static,
{
    fn fetch(&self) -> BoxFuture<'_, Result<V, FetchError>> {
        Box::pin((self)())
    }
}
