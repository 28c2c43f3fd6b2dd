//! Product data model and API request types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a product record from the database.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Product {
    pub id: Uuid,

    pub tenant_id: Uuid,

    pub name: String,

    pub brand: Option<String>,

    pub sku: Option<String>,

    pub description: Option<String>,

    pub price_per_unit: Option<f64>,

    pub stock_quantity: i32,

    pub unit_type: Option<String>,

    pub is_active: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Request body for creating a product. As with farmers, the caller's tenant
/// is attached server-side and cannot be supplied in the body.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,

    pub brand: Option<String>,

    pub sku: Option<String>,

    pub description: Option<String>,

    pub price_per_unit: Option<f64>,

    #[serde(default)]
    pub stock_quantity: i32,

    pub unit_type: Option<String>,

    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Request body for updating a product. Absent fields keep their current
/// values.
#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,

    pub brand: Option<String>,

    pub sku: Option<String>,

    pub description: Option<String>,

    pub price_per_unit: Option<f64>,

    pub stock_quantity: Option<i32>,

    pub unit_type: Option<String>,

    pub is_active: Option<bool>,
}
