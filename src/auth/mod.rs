use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;
use crate::database::models::{Role, User, UserId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: UserId,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

impl Claims {
    pub fn new(user: &User, issued_at: DateTime<Utc>, lifetime: Duration) -> Self {
        Self {
            sub: user.id,
            role: user.role,
            exp: (issued_at + lifetime).timestamp(),
            iat: issued_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT secret")]
    InvalidSecret,

    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),
}

/// HS256 signing material plus the access token lifetime
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime: Duration,
}

impl JwtKeys {
    pub fn new(secret: &str, lifetime: Duration) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::InvalidSecret);
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            lifetime,
        })
    }

    pub fn from_config(security: &SecurityConfig) -> Result<Self, JwtError> {
        Self::new(
            &security.jwt_secret,
            Duration::minutes(security.jwt_expiry_minutes),
        )
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    pub fn generate(&self, user: &User, issued_at: DateTime<Utc>) -> Result<String, JwtError> {
        let claims = Claims::new(user, issued_at, self.lifetime);
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| JwtError::TokenGeneration(e.to_string()))
    }

    /// Signature and expiry are checked against the wall clock
    pub fn validate(&self, token: &str) -> Result<Claims, JwtError> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| JwtError::InvalidToken(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        let now = Utc::now();
        User {
            id: 7,
            email: "ada@example.com".into(),
            username: "ada".into(),
            password_hash: "x".into(),
            role: Role::Administrator,
            refresh_token_hash: None,
            refresh_token_expires_at: None,
            created_at: now,
            modified_at: now,
        }
    }

    #[test]
    fn issued_tokens_validate_with_the_same_secret() {
        let keys = JwtKeys::new("secret", Duration::minutes(5)).unwrap();
        let token = keys.generate(&user(), Utc::now()).unwrap();
        let claims = keys.validate(&token).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.role, Role::Administrator);

        let other = JwtKeys::new("other", Duration::minutes(5)).unwrap();
        assert!(matches!(other.validate(&token), Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let keys = JwtKeys::new("secret", Duration::minutes(5)).unwrap();
        let token = keys
            .generate(&user(), Utc::now() - Duration::hours(2))
            .unwrap();
        assert!(keys.validate(&token).is_err());
    }

    #[test]
    fn empty_secret_is_refused() {
        assert!(matches!(
            JwtKeys::new("", Duration::minutes(5)),
            Err(JwtError::InvalidSecret)
        ));
    }
}
