//! Per-symbol request rate limiter
//!
//! Sliding one-second window of admitted request instants, kept per symbol.
//! Rejection is immediate; nothing waits.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::Serialize;
use tracing::debug;

/// Rate limiter that admits at most `requests_per_second` requests per
/// symbol within any trailing one-second window.
///
/// An admission recorded at `t` counts against requests in `[t, t + 1s)`.
/// Expired admissions of every symbol are pruned on each `admit` call, so
/// idle symbols do not accumulate state.
#[derive(Debug)]
pub struct RateLimiter {
    /// Admitted request instants per symbol, oldest first
    requests: DashMap<String, VecDeque<DateTime<Utc>>>,
    requests_per_second: u32,
    window: Duration,
    admitted: AtomicU64,
    rejected: AtomicU64,
}

impl RateLimiter {
    /// Create a limiter with the given per-symbol budget
    pub fn new(requests_per_second: u32) -> Self {
        Self {
            requests: DashMap::new(),
            requests_per_second,
            window: Duration::seconds(1),
            admitted: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
        }
    }

    /// Admit or reject a request for `symbol` at `now`.
    ///
    /// A rejected request is not recorded and does not consume budget.
    pub fn admit(&self, symbol: &str, now: DateTime<Utc>) -> bool {
        self.prune_expired(now);

        if self.requests_per_second == 0 {
            self.rejected.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        // The entry guard holds the shard lock, so check-and-record is atomic
        let mut recent = self.requests.entry(symbol.to_string()).or_default();
        expire(&mut recent, now, self.window);

        if recent.len() >= self.requests_per_second as usize {
            drop(recent);
            self.rejected.fetch_add(1, Ordering::Relaxed);
            debug!(
                "[RATE_LIMITER] {} REJECTED - {} requests in the last second",
                symbol, self.requests_per_second
            );
            return false;
        }

        recent.push_back(now);
        drop(recent);
        self.admitted.fetch_add(1, Ordering::Relaxed);
        true
    }

    fn prune_expired(&self, now: DateTime<Utc>) {
        self.requests.retain(|_, recent| {
            expire(recent, now, self.window);
            !recent.is_empty()
        });
    }

    /// Get statistics about this rate limiter
    pub fn stats(&self) -> RateLimiterStats {
        RateLimiterStats {
            admitted: self.admitted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            tracked_symbols: self.requests.len(),
            requests_per_second: self.requests_per_second,
        }
    }
}

fn expire(recent: &mut VecDeque<DateTime<Utc>>, now: DateTime<Utc>, window: Duration) {
    while let Some(oldest) = recent.front() {
        if now.signed_duration_since(*oldest) >= window {
            recent.pop_front();
        } else {
            break;
        }
    }
}

/// Statistics about rate limiter usage
#[derive(Debug, Clone, Serialize)]
pub struct RateLimiterStats {
    pub admitted: u64,
    pub rejected: u64,
    pub tracked_symbols: usize,
    pub requests_per_second: u32,
}
