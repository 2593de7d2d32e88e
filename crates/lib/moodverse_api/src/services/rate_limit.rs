//! Sliding-window rate limiter keyed by client address.
//!
//! Each key keeps the instants of its admitted requests inside the trailing
//! window. Updates happen under the map's per-key entry lock, so concurrent
//! bursts from one client are counted exactly.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;

/// How often [`SlidingWindowLimiter::spawn_cleanup_task`] evicts idle keys.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Maximum number of requests admitted within a trailing window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub max_requests: usize,
    pub window: Duration,
}

/// Every route: 100 requests per 15 minutes.
pub const GENERAL_POLICY: RateLimitPolicy = RateLimitPolicy {
    max_requests: 100,
    window: Duration::from_secs(15 * 60),
};

/// Portrait generation: 20 requests per hour.
pub const PORTRAIT_POLICY: RateLimitPolicy = RateLimitPolicy {
    max_requests: 20,
    window: Duration::from_secs(60 * 60),
};

/// Outcome of a single admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: usize,
    pub remaining: usize,
    /// Time until the oldest counted request leaves the window.
    pub reset: Duration,
}

pub struct SlidingWindowLimiter {
    policy: RateLimitPolicy,
    hits: DashMap<String, VecDeque<Instant>>,
}

impl SlidingWindowLimiter {
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self {
            policy,
            hits: DashMap::new(),
        }
    }

    /// Record a request for `key` now, unless the window is already full.
    pub fn check(&self, key: &str) -> RateLimitDecision {
        self.check_at(key, Instant::now())
    }

    /// Same as [`check`](Self::check) with an explicit clock reading.
    /// Rejected requests are not recorded.
    pub fn check_at(&self, key: &str, now: Instant) -> RateLimitDecision {
        let RateLimitPolicy {
            max_requests,
            window,
        } = self.policy;

        let mut entry = self.hits.entry(key.to_owned()).or_default();
        let log = entry.value_mut();
        while log
            .front()
            .is_some_and(|&t| now.saturating_duration_since(t) >= window)
        {
            log.pop_front();
        }

        let allowed = log.len() < max_requests;
        if allowed {
            log.push_back(now);
        }

        let reset = log
            .front()
            .map(|&oldest| window.saturating_sub(now.saturating_duration_since(oldest)))
            .unwrap_or(window);

        RateLimitDecision {
            allowed,
            limit: max_requests,
            remaining: max_requests.saturating_sub(log.len()),
            reset,
        }
    }

    /// Evict keys whose most recent request has left the window.
    pub fn cleanup(&self) {
        self.cleanup_at(Instant::now());
    }

    pub fn cleanup_at(&self, now: Instant) {
        let window = self.policy.window;
        self.hits.retain(|_, log| {
            log.back()
                .is_some_and(|&t| now.saturating_duration_since(t) < window)
        });
    }

    /// Number of client keys currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.hits.len()
    }

    /// Spawn a periodic cleanup task.
    pub fn spawn_cleanup_task(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let limiter = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
            loop {
                interval.tick().await;
                limiter.cleanup();
                debug!(clients = limiter.tracked_clients(), "rate limiter cleanup");
            }
        })
    }
}
