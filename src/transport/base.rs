//! Transport Base
//!
//! Configuration and hooks shared by every concrete transport.

use crate::config::{Timeout, TransportConfig};
use crate::transport::rate_limiter::RateLimitSnapshot;
use tracing::debug;

/// Headers whose values never reach the log
const SENSITIVE_HEADERS: &[&str] = &["x-nsone-key", "authorization"];

/// State every transport carries
#[derive(Debug, Clone)]
pub struct TransportBase {
    config: TransportConfig,
    kind: &'static str,
}

impl TransportBase {
    /// `kind` names the concrete transport in log output
    pub fn new(config: TransportConfig, kind: &'static str) -> Self {
        Self { config, kind }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn verify(&self) -> bool {
        self.config.verify
    }

    pub fn timeout(&self) -> Timeout {
        self.config.timeout
    }

    /// Record outgoing headers before a send
    pub fn log_headers(&self, headers: &[(String, String)]) {
        if !tracing::enabled!(tracing::Level::DEBUG) {
            return;
        }

        let rendered: Vec<String> = headers
            .iter()
            .map(|(name, value)| format!("{}: {}", name, mask(name, value)))
            .collect();
        debug!(transport = self.kind, headers = ?rendered, "outgoing headers");
    }

    /// Hand a snapshot to the configured notification function
    pub fn notify_rate_limit(&self, snapshot: &RateLimitSnapshot) {
        debug!(
            transport = self.kind,
            by = %snapshot.by,
            limit = snapshot.limit,
            period = snapshot.period,
            remaining = snapshot.remaining,
            "rate limit"
        );
        (self.config.rate_limit_notify)(snapshot);
    }
}

fn mask<'a>(name: &str, value: &'a str) -> &'a str {
    if SENSITIVE_HEADERS
        .iter()
        .any(|h| name.eq_ignore_ascii_case(h))
    {
        "<redacted>"
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_defaults_from_config() {
        let base = TransportBase::new(TransportConfig::default(), "requests");
        assert!(base.verify());
        assert_eq!(base.timeout(), Timeout::NoTimeout);
        assert_eq!(base.kind(), "requests");
    }

    #[test]
    fn test_notify_invokes_configured_function() {
        let seen = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&seen);
        let config = TransportConfig::new().with_rate_limit_notify(move |rl| {
            counter.store(rl.remaining, Ordering::SeqCst);
        });

        let base = TransportBase::new(config, "requests");
        base.notify_rate_limit(&RateLimitSnapshot {
            remaining: 7,
            ..Default::default()
        });

        assert_eq!(seen.load(Ordering::SeqCst), 7);
    }

    #[test]
    fn test_mask_sensitive_headers() {
        assert_eq!(mask("X-NSONE-Key", "abc"), "<redacted>");
        assert_eq!(mask("authorization", "Bearer x"), "<redacted>");
        assert_eq!(mask("Content-Type", "application/json"), "application/json");
    }

    #[test]
    fn test_log_headers_without_subscriber() {
        let base = TransportBase::new(TransportConfig::default(), "requests");
        base.log_headers(&[("X-NSONE-Key".to_string(), "abc".to_string())]);
    }
}
