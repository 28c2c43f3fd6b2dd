//! Tenant organization model.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A tenant organization. Every other resource in the system belongs to
/// exactly one tenant.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Tenant {
    pub id: Uuid,

    pub name: String,

    /// URL-safe short name, unique across tenants. The first letters feed
    /// generated codes such as dealer codes.
    pub slug: String,

    pub status: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}
