use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::PgPool;

use crate::error::AppError;

/// Caller role, stored as lowercase text on the users table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Company,
    User,
}

/// Verified caller identity. Extracting it from a request resolves the
/// Bearer token through the sessions table; handlers that take an `AuthUser`
/// argument are therefore authenticated endpoints.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i32,
    pub role: Role,
    pub company_id: Option<i32>,
}

impl AuthUser {
    /// Gate a handler to the given roles.
    pub fn require_role(&self, allowed: &[Role]) -> Result<(), AppError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    PgPool: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let pool = PgPool::from_ref(state);

        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::Unauthorized)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AppError::Unauthorized)?;

        let row: Option<(i32, Role, Option<i32>)> = sqlx::query_as(
            "SELECT u.id, u.role, u.company_id FROM sessions s \
             JOIN users u ON u.id = s.user_id \
             WHERE s.token_hash = $1 AND u.is_active \
               AND (s.expires_at IS NULL OR s.expires_at > NOW())",
        )
        .bind(hash_secret(token))
        .fetch_optional(&pool)
        .await?;

        let (id, role, company_id) = row.ok_or(AppError::Unauthorized)?;
        Ok(AuthUser {
            id,
            role,
            company_id,
        })
    }
}

/// Hash a password or raw session token for storage/lookup.
pub fn hash_secret(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generate a new random session token.
pub fn generate_token() -> String {
    use rand::Rng;
    let bytes: [u8; 32] = rand::rng().random();
    hex::encode(bytes)
}

/// Store a new session for the user and return the raw bearer token.
/// A zero TTL produces a session with no expiry.
pub async fn create_session(
    pool: &PgPool,
    user_id: i32,
    ttl_hours: i64,
) -> Result<String, AppError> {
    let raw_token = generate_token();
    let expires_at = (ttl_hours > 0).then(|| Utc::now() + Duration::hours(ttl_hours));

    sqlx::query("INSERT INTO sessions (user_id, token_hash, expires_at) VALUES ($1, $2, $3)")
        .bind(user_id)
        .bind(hash_secret(&raw_token))
        .bind(expires_at)
        .execute(pool)
        .await?;

    Ok(raw_token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_stable_and_hex_encoded() {
        let h = hash_secret("secret");
        assert_eq!(h, hash_secret("secret"));
        assert_eq!(h.len(), 64);
        assert_ne!(h, hash_secret("Secret"));
    }

    #[test]
    fn generated_tokens_are_unique() {
        assert_ne!(generate_token(), generate_token());
    }

    #[test]
    fn role_gate_rejects_outsiders() {
        let caller = AuthUser {
            id: 1,
            role: Role::User,
            company_id: None,
        };
        assert!(caller.require_role(&[Role::User, Role::Admin]).is_ok());
        assert!(matches!(
            caller.require_role(&[Role::Admin]),
            Err(AppError::Forbidden)
        ));
    }
}
