//! Audit logging middleware.
//!
//! Outermost layer of the protected stack: snapshots the request, runs the
//! rest of the pipeline, snapshots the response, then writes exactly one
//! `api_logs` row before the response leaves the gateway. The write is
//! best-effort: a failed insert is reported locally and the response is
//! returned unchanged.
//!
//! Requests rejected deeper in the stack (401, 429, 404) are audited too,
//! with whatever caller identity was established by then. CORS preflight
//! never reaches this layer; the CORS layer answers it outside.

use std::time::Instant;

use axum::{
    body::{Body, to_bytes},
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::db::DbPool;
use crate::error::ApiError;
use crate::middleware::auth::AuthContext;
use crate::services::audit::{self, AuditEntry};

/// Largest request body the gateway will buffer. Larger payloads are
/// rejected before reaching any handler.
const MAX_REQUEST_BODY: usize = 1024 * 1024;

/// Request/response audit middleware function.
///
/// # Flow
///
/// 1. Capture method, path, redacted headers, caller address
/// 2. Buffer the request body (a snippet is kept for the log; the full
///    bytes continue down the stack untouched)
/// 3. Run the inner stack (auth → rate limit → handler)
/// 4. Buffer the response and rebuild it byte-for-byte
/// 5. Insert the audit row, swallowing any failure
pub async fn request_log_middleware(
    State(pool): State<DbPool>,
    request: Request,
    next: Next,
) -> Response {
    let started = Instant::now();

    let method = request.method().to_string();
    let endpoint = request.uri().path().to_string();
    let request_headers = audit::redact_headers(request.headers());
    let ip_address = client_address(request.headers());
    let user_agent = request
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    // Buffer the request body so a snippet survives for the audit row
    let (parts, body) = request.into_parts();
    let (inner_request, request_body) = match to_bytes(body, MAX_REQUEST_BODY).await {
        Ok(bytes) => {
            let snippet = audit::body_snippet(&bytes);
            (Some(Request::from_parts(parts, Body::from(bytes))), snippet)
        }
        Err(_) => (None, None),
    };

    let response = match inner_request {
        Some(request) => next.run(request).await,
        None => ApiError::InvalidRequest("Unable to read request body".to_string()).into_response(),
    };

    // Buffer the response; the bytes are re-wrapped unchanged afterwards
    let (parts, body) = response.into_parts();
    let response_bytes = to_bytes(body, usize::MAX).await.unwrap_or_default();
    let response_body = audit::body_snippet(&response_bytes);
    let status_code = parts.status.as_u16() as i32;
    let response_headers = audit::redact_headers(&parts.headers);

    // Identity established by the auth layer, if the request got that far
    let auth = parts.extensions.get::<AuthContext>();
    let error_message = if parts.status.is_client_error() || parts.status.is_server_error() {
        error_field(&response_bytes)
    } else {
        None
    };

    let entry = AuditEntry {
        tenant_id: auth.map(|a| a.tenant_id),
        api_key_id: auth.map(|a| a.api_key_id),
        endpoint,
        method,
        status_code,
        request_headers,
        request_body,
        response_headers,
        response_body,
        response_time_ms: elapsed_ms(started),
        ip_address,
        user_agent,
        error_message,
    };

    // Awaited so the row exists before the response is sent; failures are
    // swallowed inside and never alter the response
    audit::record_request(&pool, entry).await;

    Response::from_parts(parts, Body::from(response_bytes))
}

/// Caller address as reported by the fronting proxy, or "unknown".
fn client_address(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// The `error` string of a JSON error body, when there is one.
fn error_field(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("error")?.as_str().map(String::from))
}

fn elapsed_ms(started: Instant) -> i32 {
    i32::try_from(started.elapsed().as_millis()).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_address_prefers_forwarded_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.7".parse().unwrap());

        assert_eq!(client_address(&headers), "203.0.113.7");
    }

    #[test]
    fn client_address_defaults_to_unknown() {
        assert_eq!(client_address(&HeaderMap::new()), "unknown");
    }

    #[test]
    fn error_field_is_read_from_json_bodies() {
        assert_eq!(
            error_field(br#"{"error":"Farmer not found"}"#).as_deref(),
            Some("Farmer not found")
        );
        assert_eq!(error_field(br#"{"id":"abc"}"#), None);
        assert_eq!(error_field(b"not json"), None);
    }
}
