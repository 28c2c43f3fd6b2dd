//! Dealer data model, request types, and list-query options.
//!
//! The dealers surface is richer than farmers/products: lists support text
//! search, a status filter, and sorting, and return a pagination envelope
//! with a total count.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a dealer record from the database.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Dealer {
    pub id: Uuid,

    pub tenant_id: Uuid,

    /// Generated per tenant as `<SLUG>-DLR-<sequence>`; never client-supplied
    pub dealer_code: String,

    pub business_name: String,

    pub contact_person: String,

    pub email: String,

    pub phone: String,

    pub business_type: Option<String>,

    pub gst_number: Option<String>,

    pub commission_rate: Option<f64>,

    pub registration_status: String,

    pub is_active: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Request body for creating a dealer. `dealer_code` and `tenant_id` are
/// always generated/attached server-side.
#[derive(Debug, Deserialize)]
pub struct CreateDealerRequest {
    pub business_name: String,

    pub contact_person: String,

    pub email: String,

    pub phone: String,

    pub business_type: Option<String>,

    pub gst_number: Option<String>,

    pub commission_rate: Option<f64>,

    /// Defaults to "pending" when absent
    pub registration_status: Option<String>,
}

/// Request body for updating a dealer. Absent fields keep their current
/// values; `dealer_code`, `tenant_id`, and `created_at` have no
/// corresponding fields and therefore can never be changed through the API.
#[derive(Debug, Deserialize)]
pub struct UpdateDealerRequest {
    pub business_name: Option<String>,

    pub contact_person: Option<String>,

    pub email: Option<String>,

    pub phone: Option<String>,

    pub business_type: Option<String>,

    pub gst_number: Option<String>,

    pub commission_rate: Option<f64>,

    pub registration_status: Option<String>,

    pub is_active: Option<bool>,
}

/// Columns a dealer list may be sorted by.
///
/// The closed enum is the whitelist: a query string naming any other column
/// fails deserialization with a 400 before reaching SQL.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DealerSortBy {
    BusinessName,
    ContactPerson,
    DealerCode,
    RegistrationStatus,
    CommissionRate,
    #[default]
    CreatedAt,
    UpdatedAt,
}

impl DealerSortBy {
    pub fn as_column(self) -> &'static str {
        match self {
            DealerSortBy::BusinessName => "business_name",
            DealerSortBy::ContactPerson => "contact_person",
            DealerSortBy::DealerCode => "dealer_code",
            DealerSortBy::RegistrationStatus => "registration_status",
            DealerSortBy::CommissionRate => "commission_rate",
            DealerSortBy::CreatedAt => "created_at",
            DealerSortBy::UpdatedAt => "updated_at",
        }
    }
}

/// Sort direction for dealer lists.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Query parameters accepted by the dealer list endpoint.
///
/// Parameter names are camelCase on the wire (`sortBy`, `sortOrder`).
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealerListQuery {
    /// Case-insensitive substring match on business name, contact person,
    /// dealer code, email, or phone
    pub search: Option<String>,

    /// Exact match on `registration_status`
    pub status: Option<String>,

    pub page: Option<u32>,

    pub limit: Option<u32>,

    #[serde(default)]
    pub sort_by: DealerSortBy,

    #[serde(default)]
    pub sort_order: SortOrder,
}

impl DealerListQuery {
    /// Normalized `(page, limit)` with defaults applied. Zero values are
    /// clamped to 1 so offset math and `totalPages` stay well-defined.
    pub fn page_limit(&self) -> (u32, u32) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self.limit.unwrap_or(50).max(1);
        (page, limit)
    }

    /// Row offset for the current page, saturating so maximal page/limit
    /// values land past the last row instead of overflowing.
    pub fn offset(&self) -> i64 {
        let (page, limit) = self.page_limit();
        i64::from(page - 1).saturating_mul(i64::from(limit))
    }
}

/// Paginated dealer list response.
#[derive(Debug, Serialize)]
pub struct DealerPage {
    pub data: Vec<Dealer>,

    /// Total matching rows across all pages
    pub count: i64,

    pub page: u32,

    pub limit: u32,

    #[serde(rename = "totalPages")]
    pub total_pages: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_columns_parse_from_snake_case() {
        let sort: DealerSortBy = serde_json::from_str("\"business_name\"").unwrap();
        assert_eq!(sort, DealerSortBy::BusinessName);
        assert_eq!(sort.as_column(), "business_name");
    }

    #[test]
    fn unknown_sort_column_is_rejected() {
        assert!(serde_json::from_str::<DealerSortBy>("\"password\"").is_err());
        assert!(serde_json::from_str::<DealerSortBy>("\"created_at; DROP TABLE dealers\"").is_err());
    }

    #[test]
    fn sort_order_defaults_to_descending() {
        assert_eq!(SortOrder::default(), SortOrder::Desc);
        assert_eq!(SortOrder::default().as_sql(), "DESC");

        let asc: SortOrder = serde_json::from_str("\"asc\"").unwrap();
        assert_eq!(asc.as_sql(), "ASC");
    }

    #[test]
    fn default_sort_column_is_created_at() {
        assert_eq!(DealerSortBy::default(), DealerSortBy::CreatedAt);
    }

    #[test]
    fn list_query_uses_camel_case_parameter_names() {
        let query: DealerListQuery = serde_json::from_str(
            r#"{"search": "agro", "status": "approved", "sortBy": "business_name", "sortOrder": "asc"}"#,
        )
        .unwrap();

        assert_eq!(query.search.as_deref(), Some("agro"));
        assert_eq!(query.status.as_deref(), Some("approved"));
        assert_eq!(query.sort_by, DealerSortBy::BusinessName);
        assert_eq!(query.sort_order, SortOrder::Asc);
    }

    #[test]
    fn list_query_defaults_and_clamps_pagination() {
        let query = DealerListQuery::default();
        assert_eq!(query.page_limit(), (1, 50));
        assert_eq!(query.sort_by, DealerSortBy::CreatedAt);
        assert_eq!(query.sort_order, SortOrder::Desc);

        let zeroed = DealerListQuery {
            page: Some(0),
            limit: Some(0),
            ..DealerListQuery::default()
        };
        assert_eq!(zeroed.page_limit(), (1, 1));
    }

    #[test]
    fn list_query_offset_saturates_for_maximal_pages() {
        let query = DealerListQuery {
            page: Some(3),
            limit: Some(20),
            ..DealerListQuery::default()
        };
        assert_eq!(query.offset(), 40);

        let maximal = DealerListQuery {
            page: Some(u32::MAX),
            limit: Some(u32::MAX),
            ..DealerListQuery::default()
        };
        assert_eq!(maximal.offset(), i64::MAX);
    }
}
