//! Default values for store options.
//!
//! Centralized constants to avoid magic numbers scattered across the backends.

use std::time::Duration;

/// Default SQL server port.
pub const PORT: u16 = 3306;

/// Default SQL server host.
pub const HOST: &str = "localhost";

/// Default cache lifetime of a loaded SQL config, in seconds.
pub const CACHE_LENGTH_SECS: u64 = 1;

/// Consecutive failed reconnects tolerated before giving up.
pub const MAX_RECONNECTS: u32 = 5;

/// Timeout for the liveness check before each SQL operation.
pub const VALIDITY_TIMEOUT: Duration = Duration::from_secs(1);

/// Timeout for the liveness check of a freshly opened connection.
pub const CONNECT_VALIDITY_TIMEOUT: Duration = Duration::from_secs(3);

/// Maximum length of the `path` column.
pub const PATH_COLUMN_LEN: usize = 256;

/// Maximum length of the `value` column.
pub const VALUE_COLUMN_LEN: usize = 4096;

/// Default cache lifetime as Duration.
#[must_use]
pub const fn cache_length() -> Duration {
    Duration::from_secs(CACHE_LENGTH_SECS)
}
