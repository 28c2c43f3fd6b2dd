//! Audit trail persistence.
//!
//! One row per gateway request. Writes are best-effort: a failed insert is
//! reported to the local log and swallowed, never surfaced to the client.
//! The HTTP response has already been determined by the time this runs.
//!
//! This module also owns the snapshot hygiene applied before storage:
//! credential-bearing headers are redacted and bodies are truncated to a
//! short snippet, so the raw API key never lands in an audit row.

use axum::http::HeaderMap;
use serde_json::json;
use uuid::Uuid;

use crate::db::DbPool;

/// Placeholder stored in place of a sensitive header value.
pub const REDACTED: &str = "[REDACTED]";

/// Longest body snippet kept in an audit row.
pub const MAX_BODY_SNIPPET: usize = 2048;

/// Everything captured about one request/response pair, ready to insert.
///
/// Assembled by the request-log middleware; identity fields are `None` when
/// the request was rejected before authentication completed.
#[derive(Debug)]
pub struct AuditEntry {
    pub tenant_id: Option<Uuid>,
    pub api_key_id: Option<Uuid>,
    pub endpoint: String,
    pub method: String,
    pub status_code: i32,
    pub request_headers: serde_json::Value,
    pub request_body: Option<String>,
    pub response_headers: serde_json::Value,
    pub response_body: Option<String>,
    pub response_time_ms: i32,
    pub ip_address: String,
    pub user_agent: Option<String>,
    pub error_message: Option<String>,
}

/// Persist one audit entry, swallowing any failure.
pub async fn record_request(pool: &DbPool, entry: AuditEntry) {
    if let Err(err) = insert_entry(pool, &entry).await {
        tracing::error!(
            method = %entry.method,
            endpoint = %entry.endpoint,
            "Failed to write audit log entry: {err}"
        );
    }
}

async fn insert_entry(pool: &DbPool, entry: &AuditEntry) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO api_logs (tenant_id, api_key_id, endpoint, method, status_code,
                              request_headers, request_body, response_headers,
                              response_body, response_time_ms, ip_address,
                              user_agent, error_message)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        "#,
    )
    .bind(entry.tenant_id)
    .bind(entry.api_key_id)
    .bind(&entry.endpoint)
    .bind(&entry.method)
    .bind(entry.status_code)
    .bind(&entry.request_headers)
    .bind(&entry.request_body)
    .bind(&entry.response_headers)
    .bind(&entry.response_body)
    .bind(entry.response_time_ms)
    .bind(&entry.ip_address)
    .bind(&entry.user_agent)
    .bind(&entry.error_message)
    .execute(pool)
    .await?;

    Ok(())
}

/// Snapshot headers as a JSON object, masking credential-bearing values.
///
/// Every header is kept (the trail is meant to reproduce the request), but
/// values that could replay as credentials are replaced with [`REDACTED`].
pub fn redact_headers(headers: &HeaderMap) -> serde_json::Value {
    let mut map = serde_json::Map::new();

    for (name, value) in headers {
        let name = name.as_str().to_lowercase();
        let value = if is_sensitive_header(&name) {
            REDACTED.to_string()
        } else {
            value.to_str().unwrap_or("[invalid]").to_string()
        };

        map.insert(name, json!(value));
    }

    serde_json::Value::Object(map)
}

/// Whether a header value could replay as a credential.
fn is_sensitive_header(name: &str) -> bool {
    matches!(
        name,
        "authorization"
            | "x-api-key"
            | "apikey"
            | "cookie"
            | "set-cookie"
            | "x-auth-token"
            | "proxy-authorization"
    )
}

/// Truncate a body string for storage, noting how much was dropped.
pub fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let mut end = max_len;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...[truncated {} bytes]", &s[..end], s.len() - end)
    }
}

/// Loggable snippet of a request or response body. Empty bodies become
/// `None` rather than an empty string.
pub fn body_snippet(bytes: &[u8]) -> Option<String> {
    if bytes.is_empty() {
        return None;
    }

    Some(truncate_for_log(
        &String::from_utf8_lossy(bytes),
        MAX_BODY_SNIPPET,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_headers_are_redacted() {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", "sk_secret12345".parse().unwrap());
        headers.insert("authorization", "Bearer sk_secret12345".parse().unwrap());
        headers.insert("content-type", "application/json".parse().unwrap());
        headers.insert("user-agent", "curl/8.0".parse().unwrap());

        let snapshot = redact_headers(&headers);

        assert_eq!(snapshot["x-api-key"], REDACTED);
        assert_eq!(snapshot["authorization"], REDACTED);
        assert_eq!(snapshot["content-type"], "application/json");
        assert_eq!(snapshot["user-agent"], "curl/8.0");

        // The raw secret must not appear anywhere in the snapshot
        assert!(!snapshot.to_string().contains("sk_secret12345"));
    }

    #[test]
    fn sensitive_header_list_covers_both_key_headers() {
        assert!(is_sensitive_header("authorization"));
        assert!(is_sensitive_header("x-api-key"));
        assert!(is_sensitive_header("apikey"));
        assert!(is_sensitive_header("cookie"));
        assert!(!is_sensitive_header("content-type"));
        assert!(!is_sensitive_header("x-forwarded-for"));
    }

    #[test]
    fn short_bodies_are_kept_verbatim() {
        assert_eq!(truncate_for_log("hello", 10), "hello");
        assert_eq!(truncate_for_log("exactly-10", 10), "exactly-10");
    }

    #[test]
    fn long_bodies_are_truncated_with_a_marker() {
        let long = "x".repeat(MAX_BODY_SNIPPET + 100);
        let truncated = truncate_for_log(&long, MAX_BODY_SNIPPET);

        assert!(truncated.starts_with("xxx"));
        assert!(truncated.contains("[truncated 100 bytes]"));
        assert!(truncated.len() < long.len());
    }

    #[test]
    fn truncation_respects_utf8_boundaries() {
        // Four-byte scorpion emoji straddling the cut point
        let s = format!("{}🦂", "a".repeat(9));
        let truncated = truncate_for_log(&s, 10);

        assert!(truncated.starts_with(&"a".repeat(9)));
        assert!(truncated.contains("[truncated"));
    }

    #[test]
    fn empty_body_has_no_snippet() {
        assert_eq!(body_snippet(b""), None);
        assert_eq!(body_snippet(b"{}").as_deref(), Some("{}"));
    }
}

