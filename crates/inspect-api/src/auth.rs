//! Opaque token authentication.
//!
//! Every endpoint except registration and login requires
//! `Authorization: Token <key>`. The [`AuthUser`] extractor resolves the key
//! against `auth_tokens` and rejects the request with 401 otherwise.

use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::ApiError;
use crate::AppState;

/// The authenticated caller, resolved from the token header.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub first_name: String,
}

/// Pull the raw key out of an `Authorization: Token <key>` header.
pub fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get("Authorization")?.to_str().ok()?;
    let key = value.strip_prefix("Token ")?.trim();
    if key.is_empty() {
        None
    } else {
        Some(key)
    }
}

/// Look a token key up and return its user, or None for an unknown key.
pub async fn resolve_token(pool: &SqlitePool, key: &str) -> Result<Option<AuthUser>, sqlx::Error> {
    sqlx::query_as::<_, (i64, String, String)>(
        "SELECT u.id, u.username, u.first_name
         FROM auth_tokens t JOIN users u ON u.id = t.user_id
         WHERE t.key = ?",
    )
    .bind(key)
    .fetch_optional(pool)
    .await
    .map(|row| {
        row.map(|(id, username, first_name)| AuthUser {
            id,
            username,
            first_name,
        })
    })
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let key = token_from_headers(&parts.headers)
            .ok_or_else(|| ApiError::unauthorized("authentication credentials were not provided"))?;
        resolve_token(&state.db, key)
            .await?
            .ok_or_else(|| ApiError::unauthorized("invalid token"))
    }
}

/// Mint a fresh opaque token key: 64 hex chars from hashed random UUIDs.
pub fn new_token_key() -> String {
    let mut hasher = Sha256::new();
    hasher.update(Uuid::new_v4().as_bytes());
    hasher.update(Uuid::new_v4().as_bytes());
    hex::encode(hasher.finalize())
}

pub fn new_salt() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Salted password hash. The salt is stored per user next to the hash.
pub fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn verify_password(salt: &str, password: &str, expected_hash: &str) -> bool {
    hash_password(salt, password) == expected_hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_header_parsing() {
        let mut headers = HeaderMap::new();
        assert!(token_from_headers(&headers).is_none());

        headers.insert("Authorization", "Token abc123".parse().unwrap());
        assert_eq!(token_from_headers(&headers), Some("abc123"));

        headers.insert("Authorization", "Bearer abc123".parse().unwrap());
        assert!(token_from_headers(&headers).is_none());

        headers.insert("Authorization", "Token ".parse().unwrap());
        assert!(token_from_headers(&headers).is_none());
    }

    #[test]
    fn token_keys_are_unique_hex() {
        let a = new_token_key();
        let b = new_token_key();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn password_hash_depends_on_salt() {
        let salt_a = new_salt();
        let salt_b = new_salt();
        let hash = hash_password(&salt_a, "hunter2");
        assert!(verify_password(&salt_a, "hunter2", &hash));
        assert!(!verify_password(&salt_a, "hunter3", &hash));
        assert!(!verify_password(&salt_b, "hunter2", &hash));
    }
}
