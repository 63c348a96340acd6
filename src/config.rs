//! Client configuration.
//!
//! Defaults suit a dashboard service on the local machine. Environment
//! variables overlay the defaults via [`Config::from_env`], and CLI flags
//! overlay the environment.

use std::str::FromStr;
use std::time::Duration;

use cipherscope_core::constants::{DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SETTLE_DELAY_MS};
use cipherscope_core::ComparisonSet;

/// Base URL of the analysis service.
pub const ENV_BASE_URL: &str = "CIPHERSCOPE_BASE_URL";
/// Request timeout in whole seconds.
pub const ENV_TIMEOUT_SECS: &str = "CIPHERSCOPE_TIMEOUT_SECS";
/// Comma-separated comparison set, e.g. `TEA,AES,NTSA_3.5`.
pub const ENV_ALGORITHMS: &str = "CIPHERSCOPE_ALGORITHMS";

/// Default service address.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// Configuration for a [`crate::Client`] and the orchestrators built on it.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    // =========================================================================
    // Remote service
    // =========================================================================
    /// `http://host[:port][/prefix]` of the analysis service.
    pub base_url: String,

    /// Upper bound on one remote call. A call that has not settled by then
    /// fails with "<fallback>: request timed out". Default: 60 seconds.
    pub request_timeout: Duration,

    // =========================================================================
    // Run lifecycle
    // =========================================================================
    /// How long a settled run keeps showing 100% (or its error) before the
    /// panel returns to idle. Default: 500 ms.
    pub settle_delay: Duration,

    /// Whether attack runs drive the simulated progress cadence.
    ///
    /// When disabled the indicator shows in-flight at 0% until settlement.
    pub progress_enabled: bool,

    // =========================================================================
    // Comparison
    // =========================================================================
    /// Algorithms compared by every multi-algorithm endpoint. Default: TEA, AES.
    pub comparison_set: ComparisonSet,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            settle_delay: Duration::from_millis(DEFAULT_SETTLE_DELAY_MS),
            progress_enabled: true,
            comparison_set: ComparisonSet::default(),
        }
    }
}

impl Config {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overlaid with `CIPHERSCOPE_*` environment variables.
    ///
    /// Unparseable values are ignored with a warning.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var(ENV_BASE_URL)
                .ok()
                .filter(|url| !url.trim().is_empty())
                .unwrap_or(defaults.base_url),
            request_timeout: Duration::from_secs(
                from_env_or(ENV_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS).max(1),
            ),
            comparison_set: match std::env::var(ENV_ALGORITHMS) {
                Ok(list) => ComparisonSet::parse_list(&list).unwrap_or_else(|err| {
                    tracing::warn!(var = ENV_ALGORITHMS, %err, "ignoring invalid comparison set");
                    defaults.comparison_set.clone()
                }),
                Err(_) => defaults.comparison_set.clone(),
            },
            ..defaults
        }
    }

    /// Set the service base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        assert!(!url.trim().is_empty(), "base_url must not be empty");
        self.base_url = url;
        self
    }

    /// Set the per-call timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        assert!(!timeout.is_zero(), "request_timeout must be positive");
        self.request_timeout = timeout;
        self
    }

    /// Set the per-call timeout in seconds.
    pub fn request_timeout_secs(self, secs: u64) -> Self {
        self.request_timeout(Duration::from_secs(secs))
    }

    /// Set the settle delay.
    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Enable or disable the simulated progress cadence.
    pub fn progress_enabled(mut self, enabled: bool) -> Self {
        self.progress_enabled = enabled;
        self
    }

    /// Set the comparison set.
    pub fn comparison_set(mut self, set: ComparisonSet) -> Self {
        self.comparison_set = set;
        self
    }
}

/// Parse `name` from the environment, falling back to `default` when unset
/// or unparseable.
fn from_env_or<T: FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(var = name, value = %raw, "ignoring unparseable environment value");
            default
        }),
        Err(_) => default,
    }
}
