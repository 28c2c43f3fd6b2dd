//! Audit log entry model.
//!
//! Read-side view of the `api_logs` table. The gateway only inserts these
//! rows (see `services::audit`); this struct exists for consumers that read
//! the trail back, including the integration tests.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// One audited gateway request.
///
/// `tenant_id` and `api_key_id` are null for requests rejected before the
/// caller's identity was established (missing or invalid key).
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct ApiLogEntry {
    pub id: Uuid,

    pub tenant_id: Option<Uuid>,

    pub api_key_id: Option<Uuid>,

    /// Request path (no query string)
    pub endpoint: String,

    pub method: String,

    pub status_code: i32,

    /// Request headers with sensitive values redacted
    pub request_headers: Option<serde_json::Value>,

    /// Truncated request body snippet
    pub request_body: Option<String>,

    pub response_headers: Option<serde_json::Value>,

    /// Truncated response body snippet
    pub response_body: Option<String>,

    pub response_time_ms: Option<i32>,

    pub ip_address: Option<String>,

    pub user_agent: Option<String>,

    /// The `error` field of an error response body, when the status is >= 400
    pub error_message: Option<String>,

    pub created_at: DateTime<Utc>,
}
