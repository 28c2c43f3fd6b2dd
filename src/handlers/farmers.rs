//! Farmer management HTTP handlers.
//!
//! This module implements the farmer-related API endpoints:
//! - GET /api/v1/farmers?id=... - Get one farmer
//! - GET /api/v1/farmers?page=&limit= - List farmers (paginated)
//! - POST /api/v1/farmers - Create farmer
//! - PUT /api/v1/farmers?id=... - Update farmer
//! - DELETE /api/v1/farmers?id=... - Delete farmer
//!
//! Single records are addressed by the `id` query parameter rather than a
//! path segment; that is the wire contract external integrations were built
//! against.

use crate::{
    db::DbPool,
    error::ApiError,
    extract::{Json, Query},
    handlers::ResourceQuery,
    middleware::auth::AuthContext,
    models::farmer::{CreateFarmerRequest, Farmer, UpdateFarmerRequest},
};
use axum::{
    Extension,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

const FARMER_COLUMNS: &str = "id, tenant_id, full_name, farmer_code, mobile_number, farm_type, \
     total_land_acres, primary_crops, has_irrigation, is_verified, created_at, updated_at";

/// Get one farmer or a page of farmers.
///
/// # Endpoint
///
/// `GET /api/v1/farmers`
///
/// # Query Parameters
///
/// - `id` - return the single farmer with this id (404 if it does not exist
///   for the caller's tenant)
/// - `page` / `limit` - otherwise, return a page of the tenant's farmers
///   (defaults: page 1, limit 50), newest first
///
/// # Response
///
/// - **200 OK**: one farmer object, or an array of farmers
/// - **404**: `id` given but no matching farmer for this tenant
///
/// # Security Note
///
/// Both queries filter by `tenant_id`, so an `id` belonging to another
/// tenant behaves exactly like an id that does not exist.
pub async fn get_farmers(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ResourceQuery>,
) -> Result<Response, ApiError> {
    if let Some(id) = query.id {
        let farmer = sqlx::query_as::<_, Farmer>(&format!(
            "SELECT {FARMER_COLUMNS} FROM farmers WHERE id = $1 AND tenant_id = $2"
        ))
        .bind(id)
        .bind(auth.tenant_id)
        .fetch_optional(&pool)
        .await?
        .ok_or(ApiError::FarmerNotFound)?;

        return Ok(Json(farmer).into_response());
    }

    let (limit, offset) = query.page_window();

    let farmers = sqlx::query_as::<_, Farmer>(&format!(
        r#"
        SELECT {FARMER_COLUMNS}
        FROM farmers
        WHERE tenant_id = $1
        ORDER BY created_at DESC
        LIMIT $2 OFFSET $3
        "#
    ))
    .bind(auth.tenant_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(&pool)
    .await?;

    Ok(Json(farmers).into_response())
}

/// Create a new farmer.
///
/// # Endpoint
///
/// `POST /api/v1/farmers`
///
/// # Response
///
/// - **201 Created**: the created farmer
/// - **400**: malformed body or constraint violation
///
/// # Security Note
///
/// The record's `tenant_id` is taken from the authenticated key. A
/// `tenant_id` field in the request body is ignored by deserialization, so
/// a caller cannot create records under another tenant.
pub async fn create_farmer(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<CreateFarmerRequest>,
) -> Result<(StatusCode, Json<Farmer>), ApiError> {
    let farmer = sqlx::query_as::<_, Farmer>(&format!(
        r#"
        INSERT INTO farmers (tenant_id, full_name, farmer_code, mobile_number,
                             farm_type, total_land_acres, primary_crops,
                             has_irrigation, is_verified)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING {FARMER_COLUMNS}
        "#
    ))
    // Pin the record to the authenticated caller
    .bind(auth.tenant_id)
    .bind(&request.full_name)
    .bind(&request.farmer_code)
    .bind(&request.mobile_number)
    .bind(&request.farm_type)
    .bind(request.total_land_acres)
    .bind(&request.primary_crops)
    .bind(request.has_irrigation)
    .bind(request.is_verified)
    .fetch_one(&pool)
    .await?;

    Ok((StatusCode::CREATED, Json(farmer)))
}

/// Update an existing farmer.
///
/// # Endpoint
///
/// `PUT /api/v1/farmers?id=...`
///
/// Fields absent from the body keep their current values.
///
/// # Response
///
/// - **200 OK**: the updated farmer
/// - **400**: `{"error": "Farmer ID required"}` when `id` is missing,
///   reported even when the body is absent or malformed
/// - **404**: no farmer with this id for the caller's tenant
pub async fn update_farmer(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ResourceQuery>,
    body: Result<Json<UpdateFarmerRequest>, ApiError>,
) -> Result<Json<Farmer>, ApiError> {
    let id = query
        .id
        .ok_or_else(|| ApiError::InvalidRequest("Farmer ID required".to_string()))?;
    let Json(request) = body?;

    let farmer = sqlx::query_as::<_, Farmer>(&format!(
        r#"
        UPDATE farmers
        SET full_name = COALESCE($3, full_name),
            farmer_code = COALESCE($4, farmer_code),
            mobile_number = COALESCE($5, mobile_number),
            farm_type = COALESCE($6, farm_type),
            total_land_acres = COALESCE($7, total_land_acres),
            primary_crops = COALESCE($8, primary_crops),
            has_irrigation = COALESCE($9, has_irrigation),
            is_verified = COALESCE($10, is_verified),
            updated_at = now()
        WHERE id = $1 AND tenant_id = $2
        RETURNING {FARMER_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(auth.tenant_id)
    .bind(&request.full_name)
    .bind(&request.farmer_code)
    .bind(&request.mobile_number)
    .bind(&request.farm_type)
    .bind(request.total_land_acres)
    .bind(&request.primary_crops)
    .bind(request.has_irrigation)
    .bind(request.is_verified)
    .fetch_optional(&pool)
    .await?
    .ok_or(ApiError::FarmerNotFound)?;

    Ok(Json(farmer))
}

/// Delete a farmer.
///
/// # Endpoint
///
/// `DELETE /api/v1/farmers?id=...`
///
/// # Response
///
/// - **204 No Content**: deleted
/// - **400**: `{"error": "Farmer ID required"}` when `id` is missing
/// - **404**: no farmer with this id for the caller's tenant
pub async fn delete_farmer(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ResourceQuery>,
) -> Result<StatusCode, ApiError> {
    let id = query
        .id
        .ok_or_else(|| ApiError::InvalidRequest("Farmer ID required".to_string()))?;

    let result = sqlx::query("DELETE FROM farmers WHERE id = $1 AND tenant_id = $2")
        .bind(id)
        .bind(auth.tenant_id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::FarmerNotFound);
    }

    Ok(StatusCode::NO_CONTENT)
}
