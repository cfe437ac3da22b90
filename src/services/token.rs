//! Signed bearer tokens.
//!
//! Tokens are stateless HS256 JWTs; nothing is stored server-side, so logging
//! out is the client discarding its token.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::config::SecurityConfig;
use crate::db::{User, format_timestamp};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: i32,
    pub email: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: String,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token has expired")]
    Expired,

    #[error("Invalid token: {0}")]
    Invalid(String),

    #[error("Failed to sign token: {0}")]
    Signing(String),
}

#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    #[must_use]
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
            ttl,
        }
    }

    /// Builds an issuer from config, falling back to a random per-process
    /// secret when none is configured.
    #[must_use]
    pub fn from_config(security: &SecurityConfig) -> Self {
        let ttl = Duration::hours(i64::try_from(security.jwt_expiry_hours).unwrap_or(24));

        if security.jwt_secret.is_empty() {
            warn!("No JWT secret configured; using an ephemeral one. Tokens will not survive a restart");
            let secret: [u8; 32] = rand::rng().random();
            return Self::new(&secret, ttl);
        }

        Self::new(security.jwt_secret.as_bytes(), ttl)
    }

    pub fn issue(&self, user: &User) -> Result<IssuedToken, TokenError> {
        let now = Utc::now();
        let expires = now + self.ttl;

        let claims = Claims {
            user_id: user.id,
            email: user.email.clone(),
            role: user.role.clone(),
            iat: now.timestamp(),
            exp: expires.timestamp(),
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        Ok(IssuedToken {
            token,
            expires_at: format_timestamp(expires),
        })
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> User {
        User {
            id: 7,
            email: "owner@example.com".to_string(),
            role: "admin".to_string(),
            created_at: "2026-01-01T00:00:00.000000Z".to_string(),
            last_login: None,
            is_active: true,
        }
    }

    #[test]
    fn test_issue_and_verify() {
        let issuer = TokenIssuer::new(b"0123456789abcdef0123456789abcdef", Duration::hours(24));
        let issued = issuer.issue(&test_user()).unwrap();

        let claims = issuer.verify(&issued.token).unwrap();
        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.email, "owner@example.com");
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn test_claims_use_camel_case() {
        let issuer = TokenIssuer::new(b"0123456789abcdef0123456789abcdef", Duration::hours(1));
        let issued = issuer.issue(&test_user()).unwrap();
        let claims = issuer.verify(&issued.token).unwrap();

        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["userId"], 7);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        // Past the default 60s validation leeway.
        let issuer = TokenIssuer::new(b"0123456789abcdef0123456789abcdef", Duration::minutes(-5));
        let issued = issuer.issue(&test_user()).unwrap();

        assert!(matches!(issuer.verify(&issued.token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let issuer = TokenIssuer::new(b"0123456789abcdef0123456789abcdef", Duration::hours(1));
        let other = TokenIssuer::new(b"fedcba9876543210fedcba9876543210", Duration::hours(1));
        let issued = issuer.issue(&test_user()).unwrap();

        assert!(matches!(other.verify(&issued.token), Err(TokenError::Invalid(_))));
        assert!(matches!(issuer.verify("not.a.token"), Err(TokenError::Invalid(_))));
    }
}
