//! Retry delay policy for failing sources.
//!
//! After a failed fetch the poller does not wait the full nominal interval:
//! it retries on a capped exponential schedule so a transient outage recovers
//! quickly, while a source that stays down settles at a bounded retry rate.
//! The nominal interval is always an upper bound, so a failing source never
//! polls slower than a healthy one.

use std::time::Duration;

/// Default backoff base (seconds). First retry lands at twice this.
pub const DEFAULT_BACKOFF_BASE_SECS: u64 = 5;

/// Default cap exponent: the exponential term stops growing at
/// `base * 2^DEFAULT_CAP_EXPONENT`.
pub const DEFAULT_CAP_EXPONENT: u32 = 6;

/// Largest shift applied to the base, keeping `1 << exponent` in range.
const MAX_SHIFT: u32 = 31;

/// Capped exponential backoff for consecutive fetch failures.
///
/// The delay after the `n`-th consecutive failure is
/// `min(interval, base * 2^min(n, cap_exponent))`: it doubles per failure,
/// stops doubling at the cap, and never exceeds the source's nominal poll
/// interval.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Base delay the exponential term grows from.
    pub base: Duration,
    /// Number of doublings after which the exponential term stops growing.
    pub cap_exponent: u32,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_secs(DEFAULT_BACKOFF_BASE_SECS),
            cap_exponent: DEFAULT_CAP_EXPONENT,
        }
    }
}

impl BackoffPolicy {
    /// Creates a policy with the given base delay and cap exponent.
    pub fn new(base: Duration, cap_exponent: u32) -> Self {
        Self { base, cap_exponent }
    }

    /// Delay before the next fetch attempt.
    ///
    /// # Arguments
    ///
    /// * `failures` - Consecutive failures so far; zero means the last fetch
    ///   succeeded and the nominal cadence applies
    /// * `interval` - The source's nominal poll interval, an upper bound on
    ///   every delay this method returns
    pub fn delay_after(&self, failures: u32, interval: Duration) -> Duration {
        if failures == 0 {
            return interval;
        }
        let exponent = failures.min(self.cap_exponent).min(MAX_SHIFT);
        let backoff = self.base.saturating_mul(1u32 << exponent);
        backoff.min(interval)
    }
}
