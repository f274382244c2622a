//! Core types for RouterOS REST access.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// How to reach a router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Base URL, e.g. `https://192.168.88.1`. `/rest` is appended.
    pub url: String,
    pub username: String,
    pub password: String,
    /// Timeout for one whole request
    pub timeout: Duration,
    /// Verify the router's TLS certificate
    pub verify_tls: bool,
}

impl ConnectionConfig {
    /// Create a config with the default timeout and TLS verification on.
    pub fn new(url: impl Into<String>, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            username: username.into(),
            password: password.into(),
            timeout: Duration::from_secs(10),
            verify_tls: true,
        }
    }

    /// REST endpoint for a menu path such as `/interface/bonding`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/rest{}", self.url.trim_end_matches('/'), path)
    }
}

/// HTTP verbs used by the REST API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    /// `print`
    Get,
    /// `add`
    Put,
    /// `set`
    Patch,
    /// `remove`
    Delete,
}

impl Method {
    /// Whether repeating the request is harmless.
    pub fn is_idempotent(&self) -> bool {
        !matches!(self, Self::Put)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        };
        write!(f, "{name}")
    }
}

/// Configuration for retry logic.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first
    pub max_attempts: u32,
    /// Base delay between retries
    pub base_delay: Duration,
    /// Multiplier for exponential backoff
    pub backoff_factor: f64,
    /// Maximum delay between retries
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            backoff_factor: 2.0,
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryConfig {
    /// Create a new retry config with custom settings.
    pub fn new(max_attempts: u32, base_delay: Duration, backoff_factor: f64) -> Self {
        Self {
            max_attempts,
            base_delay,
            backoff_factor,
            ..Default::default()
        }
    }

    /// Calculate the delay for a given attempt number (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = self.base_delay.as_secs_f64() * self.backoff_factor.powi(attempt as i32);
        let capped = delay.min(self.max_delay.as_secs_f64());
        Duration::from_secs_f64(capped)
    }

    /// Create a config that never retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint() {
        let config = ConnectionConfig::new("https://192.168.88.1/", "admin", "");
        assert_eq!(
            config.endpoint("/interface/bonding"),
            "https://192.168.88.1/rest/interface/bonding"
        );
    }

    #[test]
    fn test_delay_for_attempt() {
        let config = RetryConfig::new(5, Duration::from_millis(100), 2.0);
        assert_eq!(config.delay_for_attempt(0), Duration::from_millis(100));
        assert_eq!(config.delay_for_attempt(1), Duration::from_millis(200));
        assert_eq!(config.delay_for_attempt(2), Duration::from_millis(400));
    }

    #[test]
    fn test_delay_is_capped() {
        let config = RetryConfig {
            max_delay: Duration::from_secs(1),
            ..RetryConfig::new(10, Duration::from_millis(500), 4.0)
        };
        assert_eq!(config.delay_for_attempt(6), Duration::from_secs(1));
    }

    #[test]
    fn test_method_idempotent() {
        assert!(Method::Get.is_idempotent());
        assert!(Method::Patch.is_idempotent());
        assert!(Method::Delete.is_idempotent());
        assert!(!Method::Put.is_idempotent());
        assert_eq!(Method::Patch.to_string(), "PATCH");
    }
}
