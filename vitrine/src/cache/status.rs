//! Health classification and status snapshots for cached sources.
//!
//! Screens show a small per-source indicator (the classic green/blue/red/grey
//! dot) next to their data. [`SourceHealth`] is that classification, derived
//! purely from what the cache knows about a key; [`SourceStatus`] is the full
//! snapshot a status overlay renders.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};

use super::FetchFailure;

/// Health of a single data source, derived from its cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceHealth {
    /// A value is present and within its staleness threshold.
    Ok,
    /// A value is present but past its staleness threshold.
    Stale,
    /// No value has ever landed and the last fetch attempt failed.
    Failing,
    /// No value and no failure yet (source registered, first fetch pending).
    Pending,
}

impl SourceHealth {
    /// Derive health from what a cache entry records.
    ///
    /// A recorded error never downgrades a present value below `Stale`: the
    /// screen still has data to show, and the failure itself stays visible
    /// through the status snapshot.
    pub fn classify(has_value: bool, is_stale: bool, has_error: bool) -> Self {
        match (has_value, is_stale, has_error) {
            (true, false, _) => SourceHealth::Ok,
            (true, true, _) => SourceHealth::Stale,
            (false, _, true) => SourceHealth::Failing,
            (false, _, false) => SourceHealth::Pending,
        }
    }

    /// User-friendly indicator label for screen overlays.
    pub fn display_status(&self) -> &'static str {
        match self {
            SourceHealth::Ok => "Live",
            SourceHealth::Stale => "Cached",
            SourceHealth::Failing => "Error",
            SourceHealth::Pending => "Waiting...",
        }
    }
}

/// Diagnostic snapshot of one source's cache entry.
#[derive(Debug, Clone)]
pub struct SourceStatus {
    /// The cache key this snapshot describes.
    pub key: String,
    /// Derived health classification.
    pub health: SourceHealth,
    /// Age of the stored value, if one exists.
    pub age: Option<Duration>,
    /// Wall-clock time of the last successful fetch, if any.
    pub fetched_at: Option<DateTime<Utc>>,
    /// Most recent failure, if one is recorded.
    pub last_error: Option<FetchFailure>,
}

impl fmt::Display for SourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.health.display_status())?;
        if let Some(age) = self.age {
            write!(f, " (age {}s)", age.as_secs())?;
        }
        if let Some(failure) = &self.last_error {
            write!(f, " [{}]", failure.error)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::FetchError;

    #[test]
    fn test_classify_fresh_value() {
        assert_eq!(SourceHealth::classify(true, false, false), SourceHealth::Ok);
        // A newer error does not hide a fresh value.
        assert_eq!(SourceHealth::classify(true, false, true), SourceHealth::Ok);
    }

    #[test]
    fn test_classify_stale_value() {
        assert_eq!(SourceHealth::classify(true, true, false), SourceHealth::Stale);
        assert_eq!(SourceHealth::classify(true, true, true), SourceHealth::Stale);
    }

    #[test]
    fn test_classify_no_value() {
        assert_eq!(
            SourceHealth::classify(false, false, true),
            SourceHealth::Failing
        );
        assert_eq!(
            SourceHealth::classify(false, false, false),
            SourceHealth::Pending
        );
    }

    #[test]
    fn test_health_display_status() {
        assert_eq!(SourceHealth::Ok.display_status(), "Live");
        assert_eq!(SourceHealth::Stale.display_status(), "Cached");
        assert_eq!(SourceHealth::Failing.display_status(), "Error");
        assert_eq!(SourceHealth::Pending.display_status(), "Waiting...");
    }

    #[test]
    fn test_status_display_includes_age_and_error() {
        let status = SourceStatus {
            key: "weather".to_string(),
            health: SourceHealth::Stale,
            age: Some(Duration::from_secs(720)),
            fetched_at: Some(Utc::now()),
            last_error: Some(FetchFailure {
                error: FetchError::Network("dns".to_string()),
                at: Utc::now(),
                age: Duration::from_secs(30),
            }),
        };

        let rendered = format!("{}", status);
        assert!(rendered.contains("weather: Cached"));
        assert!(rendered.contains("age 720s"));
        assert!(rendered.contains("network error: dns"));
    }

    #[test]
    fn test_status_display_pending_is_minimal() {
        let status = SourceStatus {
            key: "calendar".to_string(),
            health: SourceHealth::Pending,
            age: None,
            fetched_at: None,
            last_error: None,
        };

        assert_eq!(format!("{}", status), "calendar: Waiting...");
    }
}
