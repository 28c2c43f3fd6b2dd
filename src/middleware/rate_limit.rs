//! Per-key rate limiting middleware.
//!
//! Each API key gets a fixed hourly window tracked in process memory. The
//! first request in a window (or the first after the previous window has
//! lapsed) starts a fresh counter; once the counter reaches the key's hourly
//! limit, further requests in that window are rejected with 429.
//!
//! The store is process-local. When the gateway runs as several instances,
//! each keeps independent counters and the effective global limit becomes
//! instances times limit; a deployment needing a hard guarantee must move
//! the counter to a shared atomic store.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::auth::AuthContext;

/// Length of one rate window.
const WINDOW: Duration = Duration::from_secs(60 * 60);

/// How often stale windows are swept out of the map.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Counter state for one API key.
#[derive(Debug, Clone)]
struct RateWindow {
    /// Requests admitted in the current window
    count: i32,

    /// Instant at which the window lapses and the counter restarts
    reset_at: Instant,
}

/// Outcome of one admission check.
#[derive(Debug, Clone)]
pub struct RateDecision {
    /// Whether the request is admitted
    pub allowed: bool,

    /// Requests left in the current window after this one
    pub remaining: i32,

    /// The limit the decision was made against
    pub limit: i32,

    /// Seconds until the window resets; surfaced as `Retry-After` on 429
    pub retry_after_secs: u64,
}

/// Fixed-window request counter, one window per API key id.
///
/// Admission and increment happen under a single write lock, so two
/// concurrent requests for the same key cannot both observe `count ==
/// limit - 1` and slip through.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    windows: Arc<RwLock<HashMap<Uuid, RateWindow>>>,
    last_cleanup: Arc<RwLock<Instant>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            windows: Arc::new(RwLock::new(HashMap::new())),
            last_cleanup: Arc::new(RwLock::new(Instant::now())),
        }
    }

    /// Admit or reject one request for `key_id` under `limit` requests/hour.
    pub async fn check_and_record(&self, key_id: Uuid, limit: i32) -> RateDecision {
        let now = Instant::now();
        self.maybe_cleanup(now).await;
        self.check_and_record_at(key_id, limit, now).await
    }

    /// Window arithmetic against an explicit clock reading.
    ///
    /// A window is live until `now` moves strictly past its reset instant;
    /// at that point the next request starts a fresh window with count 1.
    async fn check_and_record_at(&self, key_id: Uuid, limit: i32, now: Instant) -> RateDecision {
        let mut windows = self.windows.write().await;

        match windows.get_mut(&key_id) {
            Some(window) if now <= window.reset_at => {
                let retry_after_secs = seconds_until(window.reset_at, now);

                if window.count >= limit {
                    // Rejected requests do not consume the counter
                    RateDecision {
                        allowed: false,
                        remaining: 0,
                        limit,
                        retry_after_secs,
                    }
                } else {
                    window.count += 1;
                    RateDecision {
                        allowed: true,
                        remaining: (limit - window.count).max(0),
                        limit,
                        retry_after_secs,
                    }
                }
            }
            _ => {
                // No window yet, or the previous one has lapsed
                windows.insert(
                    key_id,
                    RateWindow {
                        count: 1,
                        reset_at: now + WINDOW,
                    },
                );

                RateDecision {
                    allowed: true,
                    remaining: (limit - 1).max(0),
                    limit,
                    retry_after_secs: WINDOW.as_secs(),
                }
            }
        }
    }

    /// Drop lapsed windows, at most once per `CLEANUP_INTERVAL`.
    ///
    /// Piggybacks on regular checks so no background task is needed; the map
    /// only ever holds keys seen within the last hour plus the sweep slack.
    async fn maybe_cleanup(&self, now: Instant) {
        let due = {
            let last = self.last_cleanup.read().await;
            last.elapsed() >= CLEANUP_INTERVAL
        };

        if due {
            let mut last = self.last_cleanup.write().await;
            *last = Instant::now();

            let mut windows = self.windows.write().await;
            windows.retain(|_, window| now <= window.reset_at);
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

/// Whole seconds until `reset_at`, clamped to the window length and never
/// reported as zero.
fn seconds_until(reset_at: Instant, now: Instant) -> u64 {
    reset_at
        .saturating_duration_since(now)
        .as_secs()
        .clamp(1, WINDOW.as_secs())
}

/// Rate limiting middleware function.
///
/// Runs after authentication: the key's identity and hourly budget are read
/// from the [`AuthContext`] the auth layer placed in the request extensions.
/// Rejection answers 429 without invoking the handler.
pub async fn rate_limit_middleware(
    State(limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth = request
        .extensions()
        .get::<AuthContext>()
        .cloned()
        .ok_or(ApiError::Internal)?;

    let decision = limiter
        .check_and_record(auth.api_key_id, auth.rate_limit_per_hour)
        .await;

    if !decision.allowed {
        return Err(ApiError::RateLimited {
            retry_after_secs: decision.retry_after_secs,
        });
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_request_is_admitted() {
        let limiter = RateLimiter::new();
        let key = Uuid::new_v4();

        let decision = limiter.check_and_record(key, 10).await;

        assert!(decision.allowed);
        assert_eq!(decision.remaining, 9);
        assert_eq!(decision.limit, 10);
    }

    #[tokio::test]
    async fn request_over_limit_is_rejected() {
        let limiter = RateLimiter::new();
        let key = Uuid::new_v4();

        assert!(limiter.check_and_record(key, 2).await.allowed);
        assert!(limiter.check_and_record(key, 2).await.allowed);

        let decision = limiter.check_and_record(key, 2).await;
        assert!(!decision.allowed);
        assert_eq!(decision.remaining, 0);
    }

    #[tokio::test]
    async fn rejected_requests_do_not_consume_the_counter() {
        let limiter = RateLimiter::new();
        let key = Uuid::new_v4();

        limiter.check_and_record(key, 1).await;

        // Repeated rejections keep count at the limit rather than pushing it
        // past, so the next window is unaffected by the burst.
        for _ in 0..5 {
            assert!(!limiter.check_and_record(key, 1).await.allowed);
        }

        let windows = limiter.windows.read().await;
        assert_eq!(windows.get(&key).unwrap().count, 1);
    }

    #[tokio::test]
    async fn keys_are_counted_independently() {
        let limiter = RateLimiter::new();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        assert!(limiter.check_and_record(first, 1).await.allowed);
        assert!(!limiter.check_and_record(first, 1).await.allowed);

        assert!(limiter.check_and_record(second, 1).await.allowed);
    }

    #[tokio::test]
    async fn lapsed_window_restarts_the_counter_at_one() {
        let limiter = RateLimiter::new();
        let key = Uuid::new_v4();
        let start = Instant::now();

        assert!(limiter.check_and_record_at(key, 2, start).await.allowed);
        assert!(limiter.check_and_record_at(key, 2, start).await.allowed);
        assert!(!limiter.check_and_record_at(key, 2, start).await.allowed);

        // Just past the reset instant: fresh window, admitted again
        let later = start + WINDOW + Duration::from_secs(1);
        let decision = limiter.check_and_record_at(key, 2, later).await;
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 1);

        let windows = limiter.windows.read().await;
        assert_eq!(windows.get(&key).unwrap().count, 1);
    }

    #[tokio::test]
    async fn window_is_still_live_at_its_exact_reset_instant() {
        let limiter = RateLimiter::new();
        let key = Uuid::new_v4();
        let start = Instant::now();

        limiter.check_and_record_at(key, 1, start).await;

        let at_reset = start + WINDOW;
        assert!(!limiter.check_and_record_at(key, 1, at_reset).await.allowed);
    }

    #[tokio::test]
    async fn retry_after_reflects_time_left_in_window() {
        let limiter = RateLimiter::new();
        let key = Uuid::new_v4();
        let start = Instant::now();

        limiter.check_and_record_at(key, 1, start).await;

        let half_in = start + Duration::from_secs(1800);
        let decision = limiter.check_and_record_at(key, 1, half_in).await;

        assert!(!decision.allowed);
        assert!(decision.retry_after_secs <= 1800);
        assert!(decision.retry_after_secs >= 1799);
    }
}
