//! Farmer data model and API request types.
//!
//! This module defines:
//! - `Farmer`: database entity, serialized as-is in responses
//! - `CreateFarmerRequest`: request body for POST
//! - `UpdateFarmerRequest`: request body for PUT (all fields optional)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a farmer record from the database.
///
/// Maps to the `farmers` table. Rows are serialized directly into API
/// responses: there is no tenant-private column to hide, and `tenant_id`
/// in a response always equals the caller's own tenant.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Farmer {
    pub id: Uuid,

    /// Tenant that owns this record; every query filters on it
    pub tenant_id: Uuid,

    pub full_name: String,

    pub farmer_code: Option<String>,

    pub mobile_number: Option<String>,

    pub farm_type: Option<String>,

    pub total_land_acres: Option<f64>,

    pub primary_crops: Option<Vec<String>>,

    pub has_irrigation: bool,

    pub is_verified: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Request body for creating a farmer.
///
/// There is no `tenant_id` field: the authenticated caller's tenant is
/// attached server-side, and a `tenant_id` key in the JSON body is ignored
/// by deserialization. Clients cannot create records under another tenant.
#[derive(Debug, Deserialize)]
pub struct CreateFarmerRequest {
    pub full_name: String,

    pub farmer_code: Option<String>,

    pub mobile_number: Option<String>,

    pub farm_type: Option<String>,

    pub total_land_acres: Option<f64>,

    pub primary_crops: Option<Vec<String>>,

    #[serde(default)]
    pub has_irrigation: bool,

    #[serde(default)]
    pub is_verified: bool,
}

/// Request body for updating a farmer. Absent fields keep their current
/// values.
#[derive(Debug, Deserialize)]
pub struct UpdateFarmerRequest {
    pub full_name: Option<String>,

    pub farmer_code: Option<String>,

    pub mobile_number: Option<String>,

    pub farm_type: Option<String>,

    pub total_land_acres: Option<f64>,

    pub primary_crops: Option<Vec<String>>,

    pub has_irrigation: Option<bool>,

    pub is_verified: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_request_ignores_a_tenant_id_in_the_body() {
        let request: CreateFarmerRequest = serde_json::from_value(json!({
            "full_name": "Raj",
            "tenant_id": "11111111-1111-1111-1111-111111111111"
        }))
        .unwrap();

        // The type has no tenant field to smuggle a value through.
        assert_eq!(request.full_name, "Raj");
    }

    #[test]
    fn update_request_accepts_an_empty_body() {
        let request: UpdateFarmerRequest = serde_json::from_value(json!({})).unwrap();
        assert!(request.full_name.is_none());
        assert!(request.is_verified.is_none());
    }
}
