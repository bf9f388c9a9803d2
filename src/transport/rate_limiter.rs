//! Rate Limit Telemetry
//!
//! Extracts rate limit state from response headers and paces callers through
//! notification functions.

use parking_lot::RwLock;
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

const HEADER_BY: &str = "x-ratelimit-by";
const HEADER_LIMIT: &str = "x-ratelimit-limit";
const HEADER_PERIOD: &str = "x-ratelimit-period";
const HEADER_REMAINING: &str = "x-ratelimit-remaining";

const DEFAULT_BY: &str = "customer";
const DEFAULT_LIMIT: u64 = 10;
const DEFAULT_PERIOD: u64 = 1;
const DEFAULT_REMAINING: u64 = 100;

/// Rate limit state reported by a single response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitSnapshot {
    /// What the limit is keyed on ("customer", "user", ...)
    pub by: String,

    /// Requests allowed per period
    pub limit: u64,

    /// Window length in seconds
    pub period: u64,

    /// Requests left in the current window
    pub remaining: u64,
}

impl Default for RateLimitSnapshot {
    fn default() -> Self {
        Self {
            by: DEFAULT_BY.to_string(),
            limit: DEFAULT_LIMIT,
            period: DEFAULT_PERIOD,
            remaining: DEFAULT_REMAINING,
        }
    }
}

impl RateLimitSnapshot {
    /// Build a snapshot from response headers, filling defaults for absent fields
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let by = headers
            .get(HEADER_BY)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| DEFAULT_BY.to_string());

        Self {
            by,
            limit: numeric_header(headers, HEADER_LIMIT, DEFAULT_LIMIT),
            period: numeric_header(headers, HEADER_PERIOD, DEFAULT_PERIOD),
            remaining: numeric_header(headers, HEADER_REMAINING, DEFAULT_REMAINING),
        }
    }
}

fn numeric_header(headers: &HeaderMap, name: &str, default: u64) -> u64 {
    let Some(value) = headers.get(name) else {
        return default;
    };

    // Negative counts are reported as zero
    let parsed = value.to_str().ok().map(str::trim).and_then(|s| {
        s.parse::<u64>()
            .ok()
            .or_else(|| s.parse::<i64>().ok().map(|n| n.max(0) as u64))
    });

    match parsed {
        Some(n) => n,
        None => {
            warn!(header = name, value = ?value, "unparseable rate limit header, using default");
            default
        }
    }
}

/// Function invoked with the rate limit snapshot of every response
pub type RateLimitNotifier = Arc<dyn Fn(&RateLimitSnapshot) + Send + Sync>;

/// A notifier that ignores every snapshot
pub fn noop_notifier() -> RateLimitNotifier {
    Arc::new(|_: &RateLimitSnapshot| {})
}

/// Built-in pacing strategies usable as notification functions
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RateLimitStrategy {
    /// Do nothing
    #[default]
    None,

    /// Spread the remaining budget evenly over the period
    Solo,

    /// Slow down once the remaining budget drops to the number of parallel callers
    Concurrent,
}

impl RateLimitStrategy {
    /// Build the notifier for this strategy
    pub fn notifier(&self, parallelism: u32) -> RateLimitNotifier {
        match self {
            RateLimitStrategy::None => noop_notifier(),
            RateLimitStrategy::Solo => Arc::new(|rl: &RateLimitSnapshot| {
                std::thread::sleep(solo_wait(rl));
            }),
            RateLimitStrategy::Concurrent => Arc::new(move |rl: &RateLimitSnapshot| {
                if let Some(wait) = concurrent_wait(rl, parallelism) {
                    std::thread::sleep(wait);
                }
            }),
        }
    }
}

/// Wait before the next call for a single sequential caller
pub fn solo_wait(rl: &RateLimitSnapshot) -> Duration {
    if rl.remaining < 2 {
        Duration::from_secs(rl.period)
    } else {
        saturating_secs(rl.period as f64 / rl.remaining as f64)
    }
}

/// Wait before the next call when `parallelism` callers share the budget
pub fn concurrent_wait(rl: &RateLimitSnapshot, parallelism: u32) -> Option<Duration> {
    if rl.remaining > u64::from(parallelism) {
        return None;
    }

    // A zero limit would divide by zero; treat it as one request per period
    let limit = rl.limit.max(1) as f64;
    Some(saturating_secs(
        (rl.period as f64 / limit) * f64::from(parallelism),
    ))
}

fn saturating_secs(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

/// Notification target that keeps the most recent snapshot
#[derive(Debug, Default)]
pub struct RateLimitRecorder {
    last: RwLock<Option<RateLimitSnapshot>>,
    calls: AtomicU64,
}

impl RateLimitRecorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Record a snapshot
    pub fn record(&self, snapshot: &RateLimitSnapshot) {
        *self.last.write() = Some(snapshot.clone());
        self.calls.fetch_add(1, Ordering::Relaxed);
    }

    /// The most recently recorded snapshot
    pub fn last(&self) -> Option<RateLimitSnapshot> {
        self.last.read().clone()
    }

    /// Number of snapshots recorded so far
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    /// A notifier feeding this recorder
    pub fn notifier(self: &Arc<Self>) -> RateLimitNotifier {
        let recorder = Arc::clone(self);
        Arc::new(move |rl: &RateLimitSnapshot| recorder.record(rl))
    }
}
