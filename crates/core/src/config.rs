//! Runtime settings read from `KWARN_*` environment variables.

#![forbid(unsafe_code)]

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_QUERY_LIMIT: u32 = 1000;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5000;
pub const MIN_POLL_INTERVAL_MS: u64 = 250;

/// Retry behaviour handed to the transport as-is.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per request, including the first one.
    pub attempts: u32,
    pub backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self { Self { attempts: 3, backoff_ms: 500 } }
}

impl RetryPolicy {
    pub fn backoff(&self) -> Duration { Duration::from_millis(self.backoff_ms) }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
    /// Upper bound on events returned by one query.
    pub query_limit: u32,
    pub poll_interval_ms: u64,
    pub retry: RetryPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            query_limit: DEFAULT_QUERY_LIMIT,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            retry: RetryPolicy::default(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Build settings from an arbitrary key lookup; unparsable or out-of-range values fall
    /// back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Self::default();
        let query_limit = lookup("KWARN_QUERY_LIMIT")
            .and_then(|s| s.trim().parse::<u32>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(d.query_limit);
        let poll_interval_ms = lookup("KWARN_POLL_INTERVAL_MS")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map(|v| v.max(MIN_POLL_INTERVAL_MS))
            .unwrap_or(d.poll_interval_ms);
        let attempts = lookup("KWARN_RETRY_ATTEMPTS")
            .and_then(|s| s.trim().parse::<u32>().ok())
            .map(|v| v.max(1))
            .unwrap_or(d.retry.attempts);
        let backoff_ms = lookup("KWARN_RETRY_BACKOFF_MS")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .unwrap_or(d.retry.backoff_ms);
        Self { query_limit, poll_interval_ms, retry: RetryPolicy { attempts, backoff_ms } }
    }

    pub fn poll_interval(&self) -> Duration { Duration::from_millis(self.poll_interval_ms) }

    /// Apply the same bounds as `from_lookup` to hand-built settings: a zero limit falls
    /// back to the default, the interval and attempt count are raised to their minimums.
    pub fn sanitized(self) -> Self {
        let query_limit = if self.query_limit == 0 { DEFAULT_QUERY_LIMIT } else { self.query_limit };
        Self {
            query_limit,
            poll_interval_ms: self.poll_interval_ms.max(MIN_POLL_INTERVAL_MS),
            retry: RetryPolicy { attempts: self.retry.attempts.max(1), ..self.retry },
        }
    }
}
