use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// JWT claims carried by a session token
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
}

/// Signing material for session tokens
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SessionKeys {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Signs a token for `user_id` that expires after the configured TTL
    pub fn issue(&self, user_id: i64) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (now + self.ttl).timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Failed to sign session token: {}", e)))
    }

    /// Checks signature and expiry, returning the session the token stands for
    pub fn verify(&self, token: &str) -> AppResult<Session> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default()).map_err(|e| {
            tracing::debug!(error = %e, "Session token rejected");
            AppError::Unauthorized("Invalid or expired session".to_string())
        })?;

        let user_id = data
            .claims
            .sub
            .parse()
            .map_err(|_| AppError::Unauthorized("Malformed session subject".to_string()))?;

        Ok(Session { user_id })
    }
}

/// Authenticated caller of a request
///
/// Extracted from an `Authorization: Bearer <token>` header; handlers that take a
/// `Session` reject anonymous requests with 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub user_id: i64,
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Session
where
    SessionKeys: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AppError::Unauthorized("Missing session token".to_string()))?;

        SessionKeys::from_ref(state).verify(token)
    }
}
