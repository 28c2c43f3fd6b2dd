//! API key model for authentication.
//!
//! API keys authenticate tenants calling the gateway. Only the SHA-256
//! digest of the secret is stored; the raw secret is shown once at issuance
//! and never persisted.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use uuid::Uuid;

/// Represents an API key record from the database.
///
/// # Database Table
///
/// Maps to the `api_keys` table. The `api_key_hash` column itself is never
/// selected into this struct: authentication looks a record up *by* the
/// digest and only needs the attached metadata afterwards.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ApiKey {
    /// Unique identifier for this API key
    pub id: Uuid,

    /// Tenant that owns this key. Every query made on behalf of the key is
    /// filtered to this tenant.
    pub tenant_id: Uuid,

    /// Human-readable label chosen at issuance
    pub key_name: String,

    /// First characters of the secret, kept for display in admin tooling
    pub api_key_prefix: String,

    /// Permission strings granted to the key (e.g. "read", "write", "delete")
    pub permissions: Json<Vec<String>>,

    /// Hourly request budget for this key
    pub rate_limit_per_hour: i32,

    /// Whether this key is currently active.
    ///
    /// Deactivation revokes access without deleting the record.
    pub is_active: bool,

    /// Optional expiry. A key past this instant is rejected even though its
    /// digest still matches.
    pub expires_at: Option<DateTime<Utc>>,

    /// Last time an administrator-facing surface recorded use of the key.
    /// The gateway itself never writes this column.
    pub last_used_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl ApiKey {
    /// Whether the key's expiry timestamp, if any, has passed.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at < now)
    }

    /// Whether the key may authenticate a request right now: it must be
    /// active and not expired.
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.is_active && !self.is_expired(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn key(is_active: bool, expires_at: Option<DateTime<Utc>>) -> ApiKey {
        ApiKey {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            key_name: "test key".to_string(),
            api_key_prefix: "sk_abcde".to_string(),
            permissions: Json(vec!["read".to_string(), "write".to_string()]),
            rate_limit_per_hour: 1000,
            is_active,
            expires_at,
            last_used_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn active_key_without_expiry_is_usable() {
        let now = Utc::now();
        assert!(key(true, None).is_usable(now));
    }

    #[test]
    fn inactive_key_is_not_usable() {
        let now = Utc::now();
        assert!(!key(false, None).is_usable(now));
    }

    #[test]
    fn expired_key_is_not_usable() {
        let now = Utc::now();
        let expired = key(true, Some(now - Duration::hours(1)));
        assert!(expired.is_expired(now));
        assert!(!expired.is_usable(now));
    }

    #[test]
    fn future_expiry_keeps_key_usable() {
        let now = Utc::now();
        let fresh = key(true, Some(now + Duration::hours(1)));
        assert!(!fresh.is_expired(now));
        assert!(fresh.is_usable(now));
    }

    #[test]
    fn inactive_and_expired_is_still_rejected() {
        let now = Utc::now();
        assert!(!key(false, Some(now - Duration::hours(1))).is_usable(now));
    }
}
