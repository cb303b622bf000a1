//! Shared constants and defaults
//!

use std::time::Duration;

/// Default per-request deadline, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default per-request deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(DEFAULT_TIMEOUT_SECS);

/// Redirects followed before a request is treated as a transport failure.
pub const DEFAULT_MAX_REDIRECTS: u32 = 10;

/// Largest body, in bytes, that content assertions will read.
pub const DEFAULT_BODY_LIMIT: u64 = 10 * 1024 * 1024;

/// User-Agent sent with every request unless overridden.
pub const DEFAULT_USER_AGENT: &str = concat!("sitecheck/", env!("CARGO_PKG_VERSION"));

/// Where the runner looks for feature files by default.
pub const DEFAULT_FEATURES_PATH: &str = "features";

/// Rendered in place of a header that is missing.
pub const NO_VALUE: &str = "";

#[cfg(test)]
/// Base URL used in tests
pub const TEST_BASE_URL: &str = "https://example.test";
