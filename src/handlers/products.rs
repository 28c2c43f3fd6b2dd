//! Product catalog HTTP handlers.
//!
//! Products support GET (single or paginated list), POST and PUT. There is
//! no DELETE: catalog entries referenced by historical orders are
//! deactivated via `is_active` instead of being removed.

use crate::{
    db::DbPool,
    error::ApiError,
    extract::{Json, Query},
    handlers::ResourceQuery,
    middleware::auth::AuthContext,
    models::product::{CreateProductRequest, Product, UpdateProductRequest},
};
use axum::{
    Extension,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

const PRODUCT_COLUMNS: &str = "id, tenant_id, name, brand, sku, description, price_per_unit, \
     stock_quantity, unit_type, is_active, created_at, updated_at";

/// `GET /api/v1/products` - one product by `?id=`, or a page of them.
pub async fn get_products(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ResourceQuery>,
) -> Result<Response, ApiError> {
    if let Some(id) = query.id {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1 AND tenant_id = $2"
        ))
        .bind(id)
        .bind(auth.tenant_id)
        .fetch_optional(&pool)
        .await?
        .ok_or(ApiError::ProductNotFound)?;

        return Ok(Json(product).into_response());
    }

    let (limit, offset) = query.page_window();

    let products = sqlx::query_as::<_, Product>(&format!(
        r#"
        SELECT {PRODUCT_COLUMNS}
        FROM products
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

    Ok(Json(products).into_response())
}

/// `POST /api/v1/products` - create a product under the caller's tenant.
pub async fn create_product(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let product = sqlx::query_as::<_, Product>(&format!(
        r#"
        INSERT INTO products (tenant_id, name, brand, sku, description,
                              price_per_unit, stock_quantity, unit_type, is_active)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING {PRODUCT_COLUMNS}
        "#
    ))
    .bind(auth.tenant_id)
    .bind(&request.name)
    .bind(&request.brand)
    .bind(&request.sku)
    .bind(&request.description)
    .bind(request.price_per_unit)
    .bind(request.stock_quantity)
    .bind(&request.unit_type)
    .bind(request.is_active)
    .fetch_one(&pool)
    .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

/// `PUT /api/v1/products?id=...` - partial update; absent fields are kept.
/// A missing `id` answers 400 before the body is read.
pub async fn update_product(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ResourceQuery>,
    body: Result<Json<UpdateProductRequest>, ApiError>,
) -> Result<Json<Product>, ApiError> {
    let id = query
        .id
        .ok_or_else(|| ApiError::InvalidRequest("Product ID required".to_string()))?;
    let Json(request) = body?;

    let product = sqlx::query_as::<_, Product>(&format!(
        r#"
        UPDATE products
        SET name = COALESCE($3, name),
            brand = COALESCE($4, brand),
            sku = COALESCE($5, sku),
            description = COALESCE($6, description),
            price_per_unit = COALESCE($7, price_per_unit),
            stock_quantity = COALESCE($8, stock_quantity),
            unit_type = COALESCE($9, unit_type),
            is_active = COALESCE($10, is_active),
            updated_at = now()
        WHERE id = $1 AND tenant_id = $2
        RETURNING {PRODUCT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(auth.tenant_id)
    .bind(&request.name)
    .bind(&request.brand)
    .bind(&request.sku)
    .bind(&request.description)
    .bind(request.price_per_unit)
    .bind(request.stock_quantity)
    .bind(&request.unit_type)
    .bind(request.is_active)
    .fetch_optional(&pool)
    .await?
    .ok_or(ApiError::ProductNotFound)?;

    Ok(Json(product))
}
