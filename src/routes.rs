//! HTTP router assembly.
//!
//! Requests to `/api/v1/*` pass through three middleware layers before any
//! handler runs, outermost first:
//!
//! 1. `request_log` - audits every request/response pair
//! 2. `auth` - resolves the API key to a tenant
//! 3. `rate_limit` - enforces the key's hourly quota
//!
//! The unknown-path (404) and wrong-method (405) fallbacks are registered on
//! the protected router, so they answer only to authenticated callers and
//! are audited like any other endpoint. `/health` sits outside the protected
//! router entirely. CORS is the outermost layer of all: browser preflights
//! are answered before logging or authentication see them.

use crate::{
    handlers::{self, dealers, farmers, health, products},
    middleware::{
        auth::auth_middleware, rate_limit::rate_limit_middleware,
        request_log::request_log_middleware,
    },
    state::AppState,
};
use axum::{
    Router,
    http::{HeaderName, Method, header},
    middleware as axum_middleware,
    routing::get,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Builds the complete application router.
///
/// The returned router is self-contained; integration tests drive it
/// directly with `tower::ServiceExt::oneshot`.
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/api/v1/farmers",
            get(farmers::get_farmers)
                .post(farmers::create_farmer)
                .put(farmers::update_farmer)
                .delete(farmers::delete_farmer)
                .fallback(handlers::method_not_allowed),
        )
        .route(
            "/api/v1/products",
            get(products::get_products)
                .post(products::create_product)
                .put(products::update_product)
                .fallback(handlers::method_not_allowed),
        )
        .route(
            "/api/v1/dealers",
            get(dealers::list_dealers)
                .post(dealers::create_dealer)
                .fallback(handlers::method_not_allowed),
        )
        .route(
            "/api/v1/dealers/{id}",
            get(dealers::get_dealer)
                .put(dealers::update_dealer)
                .patch(dealers::update_dealer)
                .delete(dealers::delete_dealer)
                .fallback(handlers::method_not_allowed),
        )
        .fallback(handlers::endpoint_not_found)
        // .layer (not .route_layer) so the fallbacks above also pass
        // through auditing, authentication, and rate limiting
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            request_log_middleware,
        ));

    Router::new()
        // Public routes (no authentication required)
        .route("/health", get(health::health_check))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}

/// Permissive CORS for browser clients. The header whitelist covers the
/// credential headers dashboards send alongside `content-type`.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            header::CONTENT_TYPE,
            HeaderName::from_static("x-api-key"),
        ])
}
