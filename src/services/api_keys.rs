//! API key issuance and revocation.
//!
//! This is the administrative side of authentication: generating a secret,
//! storing its digest, and flipping keys inactive. The gateway's request
//! path only ever reads `api_keys` rows; the one place the raw secret exists
//! is the [`IssuedApiKey`] returned here, and it is never persisted.

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distr::Alphanumeric;
use sha2::{Digest, Sha256};
use sqlx::types::Json;
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::ApiError;
use crate::models::api_key::ApiKey;

/// Length of the random portion of a generated secret.
const SECRET_LEN: usize = 32;

/// Characters of the secret kept as a display prefix.
const PREFIX_LEN: usize = 8;

/// A freshly issued key. `secret` is shown exactly once; only its digest is
/// stored.
#[derive(Debug)]
pub struct IssuedApiKey {
    pub record: ApiKey,
    pub secret: String,
}

/// Compute the stored digest of a raw API key.
///
/// SHA-256, hex encoded (64 characters). The same digest is computed during
/// authentication, so lookup is by digest equality and the raw secret never
/// touches the database.
pub fn hash_key(raw_key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw_key.as_bytes());

    hex::encode(hasher.finalize())
}

/// Generate a new random secret of the form `sk_<32 alphanumerics>`.
pub fn generate_secret() -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SECRET_LEN)
        .map(char::from)
        .collect();

    format!("sk_{suffix}")
}

/// Issue a new API key for a tenant.
///
/// # Process
///
/// 1. Generate a random secret
/// 2. Store its SHA-256 digest plus the requested metadata
/// 3. Return the stored record together with the secret (only time it's shown)
///
/// `rate_limit_per_hour` falls back to 1000 when not specified.
pub async fn issue_key(
    pool: &DbPool,
    tenant_id: Uuid,
    key_name: &str,
    permissions: Vec<String>,
    rate_limit_per_hour: Option<i32>,
    expires_at: Option<DateTime<Utc>>,
) -> Result<IssuedApiKey, ApiError> {
    let secret = generate_secret();
    let key_hash = hash_key(&secret);
    let prefix: String = secret.chars().take(PREFIX_LEN).collect();

    let record = sqlx::query_as::<_, ApiKey>(
        r#"
        INSERT INTO api_keys (tenant_id, key_name, api_key_hash, api_key_prefix,
                              permissions, rate_limit_per_hour, expires_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, tenant_id, key_name, api_key_prefix, permissions,
                  rate_limit_per_hour, is_active, expires_at, last_used_at,
                  created_at, updated_at
        "#,
    )
    .bind(tenant_id)
    .bind(key_name)
    .bind(&key_hash)
    .bind(&prefix)
    .bind(Json(permissions))
    .bind(rate_limit_per_hour.unwrap_or(1000))
    .bind(expires_at)
    .fetch_one(pool)
    .await?;

    Ok(IssuedApiKey { record, secret })
}

/// Revoke an API key (soft delete: `is_active = false`).
///
/// Returns `true` if a key was deactivated, `false` if no such key exists.
pub async fn revoke_key(pool: &DbPool, key_id: Uuid) -> Result<bool, ApiError> {
    let result = sqlx::query(
        "UPDATE api_keys SET is_active = false, updated_at = now() WHERE id = $1",
    )
    .bind(key_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_deterministic() {
        assert_eq!(hash_key("sk_example"), hash_key("sk_example"));
    }

    #[test]
    fn different_secrets_have_different_digests() {
        assert_ne!(hash_key("sk_one"), hash_key("sk_two"));
    }

    #[test]
    fn digest_is_64_hex_characters() {
        let digest = hash_key(&generate_secret());
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn digest_matches_known_sha256_vector() {
        // SHA-256 of the empty string
        assert_eq!(
            hash_key(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn generated_secrets_are_prefixed_and_unique() {
        let a = generate_secret();
        let b = generate_secret();

        assert!(a.starts_with("sk_"));
        assert_eq!(a.len(), 3 + SECRET_LEN);
        assert_ne!(a, b);
    }

    #[test]
    fn display_prefix_is_the_first_eight_characters() {
        let secret = "sk_abcdefghij".to_string();
        let prefix: String = secret.chars().take(PREFIX_LEN).collect();
        assert_eq!(prefix, "sk_abcde");
    }
}
