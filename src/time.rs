//! Time abstraction for cache expiry.
//!
//! This module provides a [`Clock`] trait that lets the SQL-backed configs
//! compute cache expiry against an injected clock in tests and the real
//! system clock in production.

use std::time::{Duration, SystemTime};

/// Abstraction over system time for testability.
///
/// Implementations provide the current time, allowing tests to inject
/// controlled time values instead of relying on actual system time.
///
/// # Example
///
/// ```
/// use treecfg::time::{Clock, SystemClock};
///
/// let clock = SystemClock;
/// let now = clock.now();
/// assert!(now >= std::time::SystemTime::UNIX_EPOCH);
/// ```
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> SystemTime;

    /// Returns the instant `ttl` from now.
    fn expiry_after(&self, ttl: Duration) -> SystemTime {
        self.now() + ttl
    }

    /// Returns `true` while `expiry` lies in the future.
    fn is_before(&self, expiry: SystemTime) -> bool {
        self.now() < expiry
    }
}

/// Production clock using actual system time.
///
/// This is the default clock implementation that delegates to
/// [`SystemTime::now()`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}
