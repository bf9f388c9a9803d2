//! Transport Configuration
//!
//! Runtime configuration handed to a transport, and the serialized settings
//! form it is usually built from.

use crate::error::{Result, TransportError};
use crate::transport::rate_limiter::{
    noop_notifier, RateLimitNotifier, RateLimitSnapshot, RateLimitStrategy,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Request timeout policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Timeout {
    /// Wait indefinitely
    #[default]
    NoTimeout,

    /// Bound the whole request
    Single(Duration),

    /// Separate connect and read budgets
    ConnectRead(Duration, Duration),
}

/// Configuration shared by every transport
#[derive(Clone)]
pub struct TransportConfig {
    /// Verify TLS certificates
    pub verify: bool,

    /// Request timeout
    pub timeout: Timeout,

    /// Called with the rate limit snapshot of every response
    pub rate_limit_notify: RateLimitNotifier,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            verify: true,
            timeout: Timeout::NoTimeout,
            rate_limit_notify: noop_notifier(),
        }
    }
}

impl TransportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    pub fn with_timeout(mut self, timeout: Timeout) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the rate limit notification function
    pub fn with_rate_limit_notify<F>(mut self, notify: F) -> Self
    where
        F: Fn(&RateLimitSnapshot) + Send + Sync + 'static,
    {
        self.rate_limit_notify = Arc::new(notify);
        self
    }

    pub fn with_notifier(mut self, notifier: RateLimitNotifier) -> Self {
        self.rate_limit_notify = notifier;
        self
    }
}

impl fmt::Debug for TransportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportConfig")
            .field("verify", &self.verify)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Timeout as written in a settings file: seconds, or `[connect, read]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeoutValue {
    Seconds(f64),
    Pair(f64, f64),
}

impl TimeoutValue {
    fn to_timeout(self) -> Result<Timeout> {
        match self {
            TimeoutValue::Seconds(secs) => Ok(Timeout::Single(seconds(secs)?)),
            TimeoutValue::Pair(connect, read) => {
                Ok(Timeout::ConnectRead(seconds(connect)?, seconds(read)?))
            }
        }
    }
}

fn seconds(secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs)
        .map_err(|e| TransportError::Config(format!("Invalid timeout {}: {}", secs, e)))
}

/// Serialized transport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportSettings {
    /// Registry key of the transport to use
    #[serde(default = "default_transport")]
    pub transport: String,

    #[serde(default = "default_verify")]
    pub verify: bool,

    /// Overrides `verify` when set
    #[serde(default, rename = "ignore-ssl-errors", alias = "ignore_ssl_errors")]
    pub ignore_ssl_errors: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<TimeoutValue>,

    #[serde(default)]
    pub rate_limit_strategy: RateLimitStrategy,

    /// Number of callers sharing the budget, for the concurrent strategy
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            transport: default_transport(),
            verify: default_verify(),
            ignore_ssl_errors: false,
            timeout: None,
            rate_limit_strategy: RateLimitStrategy::default(),
            parallelism: default_parallelism(),
        }
    }
}

impl TransportSettings {
    /// Effective TLS verification flag
    pub fn verify_tls(&self) -> bool {
        self.verify && !self.ignore_ssl_errors
    }

    /// Effective timeout policy
    pub fn timeout(&self) -> Result<Timeout> {
        self.timeout
            .map(TimeoutValue::to_timeout)
            .transpose()
            .map(Option::unwrap_or_default)
    }

    /// Build a runtime config, using the configured strategy as notifier
    pub fn to_config(&self) -> Result<TransportConfig> {
        Ok(TransportConfig {
            verify: self.verify_tls(),
            timeout: self.timeout()?,
            rate_limit_notify: self.rate_limit_strategy.notifier(self.parallelism),
        })
    }
}

fn default_transport() -> String {
    crate::transport::http::HttpTransport::KIND.to_string()
}

fn default_verify() -> bool {
    true
}

fn default_parallelism() -> u32 {
    10
}
