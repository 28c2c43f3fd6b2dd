//! API key authentication middleware.
//!
//! This middleware intercepts every protected request to:
//! 1. Extract the API key from the `x-api-key` or `Authorization` header
//! 2. Hash it and look the digest up in the database
//! 3. Check the matched record is active and unexpired
//! 4. Inject the caller's identity into the request
//!
//! Requests without a key are rejected 401 "API key required"; requests
//! whose key matches no usable record are rejected 401 "Invalid API key".

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{db::DbPool, error::ApiError, models::api_key::ApiKey, services::api_keys};

/// Authentication context attached to requests that presented a usable key.
///
/// Inserted into the request's extension map for downstream middleware and
/// handlers, and into the response's extension map so the audit layer
/// (which sits outside this one) can tag its log row with the caller.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// ID of the authenticated API key
    pub api_key_id: Uuid,

    /// Tenant the key belongs to; used to filter every database query
    pub tenant_id: Uuid,

    /// Permission strings granted to the key
    pub permissions: Vec<String>,

    /// Hourly request budget consulted by the rate limiter
    pub rate_limit_per_hour: i32,
}

/// API key authentication middleware function.
///
/// # Flow
///
/// 1. Extract the raw key (`x-api-key` first, then `Authorization: Bearer`)
/// 2. Hash it with SHA-256
/// 3. Fetch the key record whose stored digest matches
/// 4. Reject if the record is missing, inactive, or expired
/// 5. Inject `AuthContext` and call the next handler
///
/// The lookup is the only database access on this path; nothing about the
/// key record is ever written here.
pub async fn auth_middleware(
    State(pool): State<DbPool>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let raw_key = extract_api_key(request.headers())?;
    let key_hash = api_keys::hash_key(&raw_key);

    let record = sqlx::query_as::<_, ApiKey>(
        r#"
        SELECT id, tenant_id, key_name, api_key_prefix, permissions,
               rate_limit_per_hour, is_active, expires_at, last_used_at,
               created_at, updated_at
        FROM api_keys
        WHERE api_key_hash = $1
        "#,
    )
    .bind(&key_hash)
    .fetch_optional(&pool)
    .await?
    .ok_or(ApiError::InvalidApiKey)?;

    if !record.is_usable(Utc::now()) {
        return Err(ApiError::InvalidApiKey);
    }

    let auth_context = AuthContext {
        api_key_id: record.id,
        tenant_id: record.tenant_id,
        permissions: record.permissions.0.clone(),
        rate_limit_per_hour: record.rate_limit_per_hour,
    };

    request.extensions_mut().insert(auth_context.clone());

    let mut response = next.run(request).await;

    // The audit layer wraps this one and needs the caller identity even for
    // responses produced further in (including 429s from the rate limiter).
    response.extensions_mut().insert(auth_context);

    Ok(response)
}

/// Pull the raw API key out of the request headers.
///
/// `x-api-key` takes precedence; `Authorization` is consulted second, with a
/// `Bearer ` prefix stripped when present. A missing or empty key is
/// distinguished from an unknown one so the client sees "API key required"
/// rather than "Invalid API key".
fn extract_api_key(headers: &HeaderMap) -> Result<String, ApiError> {
    if let Some(value) = headers.get("x-api-key") {
        let key = value.to_str().map_err(|_| ApiError::InvalidApiKey)?;
        if key.is_empty() {
            return Err(ApiError::ApiKeyRequired);
        }
        return Ok(key.to_string());
    }

    if let Some(value) = headers.get(header::AUTHORIZATION) {
        let value = value.to_str().map_err(|_| ApiError::InvalidApiKey)?;
        let key = value.strip_prefix("Bearer ").unwrap_or(value);
        if key.is_empty() {
            return Err(ApiError::ApiKeyRequired);
        }
        return Ok(key.to_string());
    }

    Err(ApiError::ApiKeyRequired)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_key_from_x_api_key_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", "sk_test12345".parse().unwrap());

        assert_eq!(extract_api_key(&headers).unwrap(), "sk_test12345");
    }

    #[test]
    fn extracts_bearer_token_from_authorization_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer sk_test12345".parse().unwrap());

        assert_eq!(extract_api_key(&headers).unwrap(), "sk_test12345");
    }

    #[test]
    fn x_api_key_takes_precedence_over_authorization() {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", "sk_primary".parse().unwrap());
        headers.insert(header::AUTHORIZATION, "Bearer sk_secondary".parse().unwrap());

        assert_eq!(extract_api_key(&headers).unwrap(), "sk_primary");
    }

    #[test]
    fn authorization_without_bearer_prefix_is_used_verbatim() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "sk_test12345".parse().unwrap());

        assert_eq!(extract_api_key(&headers).unwrap(), "sk_test12345");
    }

    #[test]
    fn missing_key_is_reported_as_required() {
        let headers = HeaderMap::new();

        assert!(matches!(
            extract_api_key(&headers),
            Err(ApiError::ApiKeyRequired)
        ));
    }

    #[test]
    fn empty_key_is_reported_as_required() {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", "".parse().unwrap());

        assert!(matches!(
            extract_api_key(&headers),
            Err(ApiError::ApiKeyRequired)
        ));

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer ".parse().unwrap());

        assert!(matches!(
            extract_api_key(&headers),
            Err(ApiError::ApiKeyRequired)
        ));
    }
}
