//! Agrinet Gateway
//!
//! A tenant-scoped API gateway for an agricultural-network platform. It
//! authenticates opaque API keys by SHA-256 digest, enforces per-key hourly
//! rate limits, routes to tenant-isolated resource handlers (farmers,
//! products, dealers) and writes a best-effort audit record for every
//! request it answers.
//!
//! # Request Pipeline
//!
//! 1. CORS preflight short-circuit (handled by the CORS layer)
//! 2. Audit capture (method, path, headers, bodies, timing)
//! 3. API key extraction, digest lookup and validity checks
//! 4. Per-key fixed-window rate limiting
//! 5. Resource routing and tenant-scoped database operations

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
