//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (JSON body, URL params, etc.)
//! 2. Performs a tenant-scoped database operation
//! 3. Returns HTTP response (JSON, status code)
//!
//! Every query in this module tree filters on the authenticated caller's
//! `tenant_id`. There is no unscoped code path.

use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

/// Dealer management endpoints
pub mod dealers;
/// Farmer management endpoints
pub mod farmers;
/// Public health check endpoint
pub mod health;
/// Product management endpoints
pub mod products;

/// Query parameters accepted by the farmers and products surfaces.
///
/// `id` addresses a single record (GET one, PUT, DELETE); `page`/`limit`
/// control list pagination. All three are optional; which combination is
/// consulted depends on the method.
#[derive(Debug, Default, Deserialize)]
pub struct ResourceQuery {
    pub id: Option<Uuid>,

    pub page: Option<u32>,

    pub limit: Option<u32>,
}

impl ResourceQuery {
    /// `(limit, offset)` for a list query: page defaults to 1, limit to 50,
    /// both clamped to at least 1. The offset saturates so an absurd
    /// page/limit pair yields an empty page instead of an overflow.
    pub fn page_window(&self) -> (i64, i64) {
        let page = i64::from(self.page.unwrap_or(1).max(1));
        let limit = i64::from(self.limit.unwrap_or(50).max(1));

        (limit, (page - 1).saturating_mul(limit))
    }
}

/// Fallback for paths under the protected tree that match no resource.
///
/// Reached only after authentication and rate limiting, so an unknown path
/// hit without a valid key still answers 401, not 404.
pub async fn endpoint_not_found() -> ApiError {
    ApiError::EndpointNotFound
}

/// Fallback for known resources hit with a method they don't support.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults_to_first_page_of_fifty() {
        let query = ResourceQuery::default();
        assert_eq!(query.page_window(), (50, 0));
    }

    #[test]
    fn offset_is_computed_from_page_and_limit() {
        let query = ResourceQuery {
            id: None,
            page: Some(3),
            limit: Some(20),
        };
        assert_eq!(query.page_window(), (20, 40));
    }

    #[test]
    fn page_zero_is_treated_as_page_one() {
        let query = ResourceQuery {
            id: None,
            page: Some(0),
            limit: Some(10),
        };
        assert_eq!(query.page_window(), (10, 0));
    }

    #[test]
    fn limit_zero_is_clamped_to_one() {
        let query = ResourceQuery {
            id: None,
            page: Some(2),
            limit: Some(0),
        };
        assert_eq!(query.page_window(), (1, 1));
    }

    #[test]
    fn maximal_page_and_limit_saturate_instead_of_overflowing() {
        let query = ResourceQuery {
            id: None,
            page: Some(u32::MAX),
            limit: Some(u32::MAX),
        };

        let (limit, offset) = query.page_window();
        assert_eq!(limit, i64::from(u32::MAX));
        assert_eq!(offset, i64::MAX);
    }
}
