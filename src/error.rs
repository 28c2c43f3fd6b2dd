//! Error types and HTTP error response handling.
//!
//! This module defines all gateway errors and how they are converted into
//! HTTP responses. Every error leaves the gateway as JSON of the form
//! `{"error": "<message>"}`; clients never see plain-text bodies, stack
//! traces, or internal identifiers.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use sqlx::error::ErrorKind;

/// Gateway-wide error type.
///
/// Each variant maps to a specific HTTP status code and client-facing
/// message.
///
/// # Error Categories
///
/// - **Authentication**: missing or invalid API keys → 401
/// - **Quota**: rate limit exhausted → 429, with a `Retry-After` header
/// - **Routing**: unknown endpoints → 404, unsupported methods → 405
/// - **Resources**: record absent (or owned by another tenant) → 404
/// - **Validation**: malformed request data, constraint violations → 400
/// - **Database**: constraint-class errors → 400 with the driver message,
///   anything else → 500 with a generic message
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Database operation failed.
    ///
    /// Wraps any sqlx::Error via `#[from]`. Constraint violations surface as
    /// 400 with the store's message; other database errors become a generic
    /// 500 so internals never leak to clients.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// No API key was presented (or it was empty).
    #[error("API key required")]
    ApiKeyRequired,

    /// A key was presented but no active, unexpired record matches its digest.
    #[error("Invalid API key")]
    InvalidApiKey,

    /// The key's hourly request budget is exhausted.
    ///
    /// `retry_after_secs` is the time until the key's window resets and is
    /// surfaced as a `Retry-After` header.
    #[error("Rate limit exceeded")]
    RateLimited { retry_after_secs: u64 },

    /// Farmer id absent for this tenant.
    #[error("Farmer not found")]
    FarmerNotFound,

    /// Product id absent for this tenant.
    #[error("Product not found")]
    ProductNotFound,

    /// Dealer id absent for this tenant.
    #[error("Dealer not found")]
    DealerNotFound,

    /// The request path matches no known resource.
    #[error("Endpoint not found")]
    EndpointNotFound,

    /// The resource exists but does not support the request method.
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Request body or parameters are invalid. The String carries the
    /// client-facing detail.
    #[error("{0}")]
    InvalidRequest(String),

    /// Unexpected internal failure with no safer classification.
    #[error("Internal server error")]
    Internal,
}

/// Constraint-class database errors are the caller's fault and map to 400.
fn is_constraint_violation(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::UniqueViolation
            | ErrorKind::ForeignKeyViolation
            | ErrorKind::NotNullViolation
            | ErrorKind::CheckViolation
    )
}

/// Convert ApiError into an HTTP response.
///
/// Handlers and middleware return `Result<T, ApiError>` and have errors
/// converted automatically.
///
/// # Response Format
///
/// ```json
/// { "error": "Human-readable error message" }
/// ```
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Map each error variant to (HTTP status, message, Retry-After)
        let (status, message, retry_after) = match &self {
            ApiError::ApiKeyRequired | ApiError::InvalidApiKey => {
                (StatusCode::UNAUTHORIZED, self.to_string(), None)
            }
            ApiError::RateLimited { retry_after_secs } => (
                StatusCode::TOO_MANY_REQUESTS,
                self.to_string(),
                Some(*retry_after_secs),
            ),
            ApiError::FarmerNotFound
            | ApiError::ProductNotFound
            | ApiError::DealerNotFound
            | ApiError::EndpointNotFound => (StatusCode::NOT_FOUND, self.to_string(), None),
            ApiError::MethodNotAllowed => {
                (StatusCode::METHOD_NOT_ALLOWED, self.to_string(), None)
            }
            ApiError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            ApiError::Database(err) => match err.as_database_error() {
                Some(db_err) if is_constraint_violation(db_err.kind()) => {
                    (StatusCode::BAD_REQUEST, db_err.message().to_string(), None)
                }
                _ => {
                    tracing::error!("Database error: {err}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error".to_string(),
                        None,
                    )
                }
            },
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                self.to_string(),
                None,
            ),
        };

        let body = Json(json!({ "error": message }));
        let mut response = (status, body).into_response();

        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn missing_key_maps_to_401_with_flat_error_body() {
        let response = ApiError::ApiKeyRequired.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "API key required" })
        );
    }

    #[tokio::test]
    async fn invalid_key_maps_to_401() {
        let response = ApiError::InvalidApiKey.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "Invalid API key" })
        );
    }

    #[tokio::test]
    async fn rate_limited_sets_retry_after_header() {
        let response = ApiError::RateLimited {
            retry_after_secs: 1800,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response.headers().get(header::RETRY_AFTER).unwrap(),
            "1800"
        );
        assert_eq!(
            body_json(response).await,
            json!({ "error": "Rate limit exceeded" })
        );
    }

    #[tokio::test]
    async fn routing_errors_map_to_404_and_405() {
        let not_found = ApiError::EndpointNotFound.into_response();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(not_found).await,
            json!({ "error": "Endpoint not found" })
        );

        let bad_method = ApiError::MethodNotAllowed.into_response();
        assert_eq!(bad_method.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn invalid_request_carries_its_message() {
        let response = ApiError::InvalidRequest("Farmer ID required".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "Farmer ID required" })
        );
    }

    #[tokio::test]
    async fn non_constraint_database_errors_hide_details() {
        let response = ApiError::Database(sqlx::Error::RowNotFound).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "Internal server error" })
        );
    }

    #[test]
    fn constraint_kinds_classify_as_client_errors() {
        assert!(is_constraint_violation(ErrorKind::UniqueViolation));
        assert!(is_constraint_violation(ErrorKind::ForeignKeyViolation));
        assert!(is_constraint_violation(ErrorKind::NotNullViolation));
        assert!(is_constraint_violation(ErrorKind::CheckViolation));
        assert!(!is_constraint_violation(ErrorKind::Other));
    }
}
