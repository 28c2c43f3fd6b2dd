//! HTTP middleware components.
//!
//! Middleware are functions that run before route handlers.
//! They can:
//! - Authenticate requests
//! - Log requests
//! - Modify request/response
//! - Short-circuit requests (reject unauthorized)
//!
//! The protected stack layers these in a fixed order: audit logging
//! outermost, then authentication, then rate limiting. A request rejected by
//! an inner layer still passes back through the audit layer on its way out.

/// API key authentication middleware
pub mod auth;
/// Per-key rate limiting middleware
pub mod rate_limit;
/// Audit logging middleware
pub mod request_log;
