//! Business logic services.
//!
//! Services contain logic separated from HTTP handlers: credential
//! issuance and audit trail persistence.

/// API key issuance and revocation
pub mod api_keys;
/// Audit trail persistence
pub mod audit;
