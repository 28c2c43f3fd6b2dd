//! Shared application state.
//!
//! Everything a request may need is bundled here and handed to the router:
//! the database pool and the in-memory rate limiter. Handlers and middleware
//! that only need one of the two extract it directly via `FromRef`.

use axum::extract::FromRef;

use crate::db::DbPool;
use crate::middleware::rate_limit::RateLimiter;

/// State shared by every route and middleware layer.
///
/// Cloning is cheap: the pool and the limiter are both handles around
/// reference-counted internals.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,

    /// Per-key request counters. Process-local: each running instance keeps
    /// its own windows, so the effective global limit scales with the number
    /// of instances.
    pub rate_limiter: RateLimiter,
}

impl AppState {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            rate_limiter: RateLimiter::new(),
        }
    }
}

impl FromRef<AppState> for DbPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for RateLimiter {
    fn from_ref(state: &AppState) -> Self {
        state.rate_limiter.clone()
    }
}
