//! Dealer network HTTP handlers.
//!
//! Dealers are the distribution partners of a tenant. Unlike farmers and
//! products, single dealers are addressed by path id
//! (`/api/v1/dealers/{id}`), lists return a pagination envelope with a total
//! count, and dealer codes are generated server-side from the tenant slug.

use crate::{
    db::DbPool,
    error::ApiError,
    extract::{Json, Path, Query},
    middleware::auth::AuthContext,
    models::{
        dealer::{CreateDealerRequest, Dealer, DealerListQuery, DealerPage, UpdateDealerRequest},
        tenant::Tenant,
    },
};
use axum::{Extension, extract::State, http::StatusCode};
use serde_json::json;
use uuid::Uuid;

const DEALER_COLUMNS: &str = "id, tenant_id, dealer_code, business_name, contact_person, email, \
     phone, business_type, gst_number, commission_rate, registration_status, is_active, \
     created_at, updated_at";

/// Shared WHERE clause for the list and count queries. `$2` is the optional
/// search term, `$3` the optional registration-status filter.
const DEALER_FILTER: &str = "tenant_id = $1
       AND ($2::text IS NULL
            OR business_name ILIKE '%' || $2 || '%'
            OR contact_person ILIKE '%' || $2 || '%'
            OR dealer_code ILIKE '%' || $2 || '%'
            OR email ILIKE '%' || $2 || '%'
            OR phone ILIKE '%' || $2 || '%')
       AND ($3::text IS NULL OR registration_status = $3)";

/// List dealers with search, filtering, sorting, and pagination.
///
/// # Endpoint
///
/// `GET /api/v1/dealers`
///
/// # Query Parameters
///
/// - `search` - substring match on business name, contact person, dealer
///   code, email, or phone
/// - `status` - exact match on registration status
/// - `sortBy` / `sortOrder` - one of the whitelisted columns, `asc`/`desc`
/// - `page` / `limit` - defaults 1 / 50
///
/// # Response
///
/// **200 OK** with an envelope:
///
/// ```json
/// {"data": [...], "count": 137, "page": 1, "limit": 50, "totalPages": 3}
/// ```
///
/// An unknown `sortBy` column fails query deserialization and answers 400;
/// sort identifiers never reach the SQL as free text.
pub async fn list_dealers(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<DealerListQuery>,
) -> Result<Json<DealerPage>, ApiError> {
    let (page, limit) = query.page_limit();
    let offset = query.offset();

    let count: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM dealers WHERE {DEALER_FILTER}"
    ))
    .bind(auth.tenant_id)
    .bind(query.search.as_deref())
    .bind(query.status.as_deref())
    .fetch_one(&pool)
    .await?;

    let dealers = sqlx::query_as::<_, Dealer>(&format!(
        "SELECT {DEALER_COLUMNS} FROM dealers WHERE {DEALER_FILTER} \
         ORDER BY {column} {order} LIMIT $4 OFFSET $5",
        column = query.sort_by.as_column(),
        order = query.sort_order.as_sql(),
    ))
    .bind(auth.tenant_id)
    .bind(query.search.as_deref())
    .bind(query.status.as_deref())
    .bind(i64::from(limit))
    .bind(offset)
    .fetch_all(&pool)
    .await?;

    let total_pages = (count + i64::from(limit) - 1) / i64::from(limit);

    Ok(Json(DealerPage {
        data: dealers,
        count,
        page,
        limit,
        total_pages,
    }))
}

/// Register a new dealer under the caller's tenant.
///
/// # Endpoint
///
/// `POST /api/v1/dealers`
///
/// The dealer code is generated here, not accepted from the client: the
/// first three letters of the tenant slug, uppercased, then `-DLR-` and a
/// zero-padded sequence one past the highest code already issued for the
/// tenant (`AGR-DLR-000042`). Deleted dealers leave gaps in the sequence;
/// a code is never reissued.
///
/// # Response
///
/// - **201 Created**: the created dealer, including its generated code
/// - **400**: malformed body or constraint violation
pub async fn create_dealer(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<CreateDealerRequest>,
) -> Result<(StatusCode, Json<Dealer>), ApiError> {
    let tenant = sqlx::query_as::<_, Tenant>(
        "SELECT id, name, slug, status, created_at, updated_at FROM tenants WHERE id = $1",
    )
    .bind(auth.tenant_id)
    .fetch_one(&pool)
    .await?;

    let last_sequence: i64 = sqlx::query_scalar(
        r#"SELECT COALESCE(MAX(substring(dealer_code FROM '\d+$')::bigint), 0)
           FROM dealers WHERE tenant_id = $1"#,
    )
    .bind(auth.tenant_id)
    .fetch_one(&pool)
    .await?;

    let dealer_code = new_dealer_code(&tenant.slug, last_sequence + 1);

    let dealer = sqlx::query_as::<_, Dealer>(&format!(
        r#"
        INSERT INTO dealers (tenant_id, dealer_code, business_name, contact_person,
                             email, phone, business_type, gst_number, commission_rate,
                             registration_status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING {DEALER_COLUMNS}
        "#
    ))
    .bind(auth.tenant_id)
    .bind(&dealer_code)
    .bind(&request.business_name)
    .bind(&request.contact_person)
    .bind(&request.email)
    .bind(&request.phone)
    .bind(&request.business_type)
    .bind(&request.gst_number)
    .bind(request.commission_rate)
    .bind(request.registration_status.as_deref().unwrap_or("pending"))
    .fetch_one(&pool)
    .await?;

    Ok((StatusCode::CREATED, Json(dealer)))
}

/// `GET /api/v1/dealers/{id}` - fetch one dealer, 404 if not in the
/// caller's tenant.
pub async fn get_dealer(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Dealer>, ApiError> {
    let dealer = sqlx::query_as::<_, Dealer>(&format!(
        "SELECT {DEALER_COLUMNS} FROM dealers WHERE id = $1 AND tenant_id = $2"
    ))
    .bind(id)
    .bind(auth.tenant_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(ApiError::DealerNotFound)?;

    Ok(Json(dealer))
}

/// `PUT /api/v1/dealers/{id}` - partial update. The dealer code and tenant
/// binding have no request fields and cannot be changed.
pub async fn update_dealer(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateDealerRequest>,
) -> Result<Json<Dealer>, ApiError> {
    let dealer = sqlx::query_as::<_, Dealer>(&format!(
        r#"
        UPDATE dealers
        SET business_name = COALESCE($3, business_name),
            contact_person = COALESCE($4, contact_person),
            email = COALESCE($5, email),
            phone = COALESCE($6, phone),
            business_type = COALESCE($7, business_type),
            gst_number = COALESCE($8, gst_number),
            commission_rate = COALESCE($9, commission_rate),
            registration_status = COALESCE($10, registration_status),
            is_active = COALESCE($11, is_active),
            updated_at = now()
        WHERE id = $1 AND tenant_id = $2
        RETURNING {DEALER_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(auth.tenant_id)
    .bind(&request.business_name)
    .bind(&request.contact_person)
    .bind(&request.email)
    .bind(&request.phone)
    .bind(&request.business_type)
    .bind(&request.gst_number)
    .bind(request.commission_rate)
    .bind(&request.registration_status)
    .bind(request.is_active)
    .fetch_optional(&pool)
    .await?
    .ok_or(ApiError::DealerNotFound)?;

    Ok(Json(dealer))
}

/// `DELETE /api/v1/dealers/{id}` - remove a dealer.
///
/// Answers `{"success": true, "message": "Dealer deleted successfully"}` on
/// success, 404 when the id does not exist for the caller's tenant.
pub async fn delete_dealer(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let result = sqlx::query("DELETE FROM dealers WHERE id = $1 AND tenant_id = $2")
        .bind(id)
        .bind(auth.tenant_id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::DealerNotFound);
    }

    Ok(Json(json!({
        "success": true,
        "message": "Dealer deleted successfully"
    })))
}

/// Builds the next dealer code for a tenant: `<SLUG>-DLR-<sequence>` with
/// the slug truncated to three letters and uppercased, and the sequence
/// zero-padded to six digits.
fn new_dealer_code(slug: &str, sequence: i64) -> String {
    let prefix: String = slug.chars().take(3).collect::<String>().to_uppercase();
    format!("{prefix}-DLR-{sequence:06}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dealer_code_uses_uppercased_slug_prefix() {
        assert_eq!(new_dealer_code("agrinet", 1), "AGR-DLR-000001");
        assert_eq!(new_dealer_code("greenfields", 42), "GRE-DLR-000042");
    }

    #[test]
    fn dealer_code_handles_short_slugs() {
        assert_eq!(new_dealer_code("go", 7), "GO-DLR-000007");
    }

    #[test]
    fn dealer_code_sequence_widens_past_six_digits() {
        assert_eq!(new_dealer_code("agrinet", 1_234_567), "AGR-DLR-1234567");
    }
}
