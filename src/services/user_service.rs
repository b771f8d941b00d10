use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::auth::JwtKeys;
use crate::database::models::{NewUser, Role, User, UserId, UserResponse};
use crate::database::store::{StoreError, UserStore};
use crate::services::error::{ServiceError, ServiceResult, ValidationError};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(
        email(message = "must be a valid email address"),
        length(max = 100, message = "must be at most 100 characters")
    )]
    pub email: String,

    #[validate(length(min = 1, max = 30, message = "must be between 1 and 30 characters"))]
    pub username: String,

    #[validate(length(min = 1, message = "must not be empty"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub email: String,

    #[validate(length(min = 1, message = "must not be empty"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Issued on login and refresh
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub refresh_token: String,
    pub user: UserResponse,
}

const CREDENTIALS_REJECTED: &str = "Invalid email or password";

/// Collapse derive-level errors into the first offending field
fn first_field_error(errors: validator::ValidationErrors) -> ValidationError {
    const FIELDS: [&str; 3] = ["email", "username", "password"];

    let mut offending: Vec<(String, String)> = errors
        .field_errors()
        .iter()
        .map(|(field, errs)| {
            let reason = errs
                .first()
                .and_then(|e| e.message.as_ref())
                .map(|m| m.to_string())
                .unwrap_or_else(|| "is invalid".to_string());
            (field.to_string(), reason)
        })
        .collect();
    offending.sort();

    match offending.into_iter().next() {
        Some((name, reason)) => {
            let field = FIELDS.iter().copied().find(|f| *f == name).unwrap_or("request");
            ValidationError::new(field, reason)
        }
        None => ValidationError::new("request", "is invalid"),
    }
}

fn hash_password(password: &str) -> ServiceResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| ServiceError::Unexpected(format!("password hashing failed: {}", e)))
}

fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            error!("Stored password hash is unreadable: {}", e);
            false
        }
    }
}

fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Accounts, sessions and refresh-token rotation
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
    keys: Arc<JwtKeys>,
    refresh_lifetime: Duration,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>, keys: Arc<JwtKeys>, refresh_lifetime: Duration) -> Self {
        Self { users, keys, refresh_lifetime }
    }

    pub fn keys(&self) -> &JwtKeys {
        &self.keys
    }

    pub async fn register(&self, request: RegisterRequest, now: DateTime<Utc>) -> ServiceResult<User> {
        request.validate().map_err(first_field_error)?;
        let email = request.email.trim().to_lowercase();

        if self.users.get_by_email(&email).await?.is_some() {
            return Err(ServiceError::Conflict(format!("Email '{}' is already registered", email)));
        }

        let new_user = NewUser {
            email,
            username: request.username.trim().to_string(),
            password_hash: hash_password(&request.password)?,
            role: Role::default(),
            created_at: now,
        };
        let user = self.users.add(&new_user).await.map_err(|e| match e {
            StoreError::Conflict(_) => {
                ServiceError::Conflict(format!("Email '{}' is already registered", new_user.email))
            }
            other => other.into(),
        })?;
        info!("Registered user {} ({})", user.id, user.email);
        Ok(user)
    }

    /// Unknown email and wrong password are indistinguishable to the caller
    pub async fn login(&self, request: LoginRequest, now: DateTime<Utc>) -> ServiceResult<TokenPair> {
        request.validate().map_err(first_field_error)?;
        let email = request.email.trim().to_lowercase();

        let Some(user) = self.users.get_by_email(&email).await? else {
            warn!("Login failed for unknown email");
            return Err(ServiceError::unauthorized(CREDENTIALS_REJECTED));
        };
        if !verify_password(&request.password, &user.password_hash) {
            warn!("Login failed for user {}", user.id);
            return Err(ServiceError::unauthorized(CREDENTIALS_REJECTED));
        }

        let pair = self.issue_tokens(user, now).await?;
        info!("User {} logged in", pair.user.id);
        Ok(pair)
    }

    /// Exchange a live refresh token for a new pair; the old token stops working
    pub async fn refresh(&self, refresh_token: &str, now: DateTime<Utc>) -> ServiceResult<TokenPair> {
        let Some(user) = self.users.get_by_refresh_token(&hash_token(refresh_token)).await? else {
            return Err(ServiceError::unauthorized("Invalid refresh token"));
        };
        let live = user.refresh_token_expires_at.is_some_and(|expires| expires > now);
        if !live {
            warn!("Expired refresh token presented for user {}", user.id);
            return Err(ServiceError::unauthorized("Refresh token has expired"));
        }
        self.issue_tokens(user, now).await
    }

    pub async fn logout(&self, user_id: UserId, now: DateTime<Utc>) -> ServiceResult<()> {
        let mut user = self.profile(user_id).await?;
        user.refresh_token_hash = None;
        user.refresh_token_expires_at = None;
        user.modified_at = now;
        if !self.users.update(user_id, &user).await? {
            return Err(ServiceError::NotFound("user"));
        }
        info!("User {} logged out", user_id);
        Ok(())
    }

    pub async fn profile(&self, user_id: UserId) -> ServiceResult<User> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or(ServiceError::NotFound("user"))
    }

    /// Users may delete themselves; administrators may delete anyone.
    /// Owned maps and celestial objects go with the account.
    pub async fn delete(&self, target_id: UserId, requesting_user: UserId, role: Role) -> ServiceResult<()> {
        if target_id != requesting_user && role != Role::Administrator {
            warn!("User {} denied delete of user {}", requesting_user, target_id);
            return Err(ServiceError::forbidden("You may only delete your own account"));
        }
        if !self.users.remove(target_id).await? {
            return Err(ServiceError::NotFound("user"));
        }
        info!("Deleted user {} (requested by {})", target_id, requesting_user);
        Ok(())
    }

    async fn issue_tokens(&self, mut user: User, now: DateTime<Utc>) -> ServiceResult<TokenPair> {
        let access_token = self
            .keys
            .generate(&user, now)
            .map_err(|e| ServiceError::Unexpected(e.to_string()))?;
        let refresh_token = Uuid::new_v4().simple().to_string();

        user.refresh_token_hash = Some(hash_token(&refresh_token));
        user.refresh_token_expires_at = Some(now + self.refresh_lifetime);
        user.modified_at = now;
        if !self.users.update(user.id, &user).await? {
            return Err(ServiceError::NotFound("user"));
        }

        Ok(TokenPair {
            access_token,
            token_type: "Bearer",
            expires_in: self.keys.lifetime().num_seconds(),
            refresh_token,
            user: user.sanitized(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;

    fn service() -> UserService {
        let keys = JwtKeys::new("test-secret", Duration::minutes(15)).unwrap();
        UserService::new(Arc::new(MemoryStore::new()), Arc::new(keys), Duration::days(7))
    }

    fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.into(),
            username: "ada".into(),
            password: "correct horse".into(),
        }
    }

    fn login_request(email: &str, password: &str) -> LoginRequest {
        LoginRequest { email: email.into(), password: password.into() }
    }

    #[tokio::test]
    async fn register_hashes_password_and_defaults_to_member() {
        let service = service();
        let user = service.register(register_request("Ada@Example.com"), Utc::now()).await.unwrap();
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.role, Role::Member);
        assert_ne!(user.password_hash, "correct horse");
        assert!(user.password_hash.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn register_rejects_duplicates_and_bad_fields() {
        let service = service();
        service.register(register_request("ada@example.com"), Utc::now()).await.unwrap();
        assert!(matches!(
            service.register(register_request("ada@example.com"), Utc::now()).await.unwrap_err(),
            ServiceError::Conflict(_)
        ));

        assert!(matches!(
            service.register(register_request("not-an-email"), Utc::now()).await.unwrap_err(),
            ServiceError::Validation(ValidationError { field: "email", .. })
        ));

        let mut long_name = register_request("bob@example.com");
        long_name.username = "b".repeat(31);
        assert!(matches!(
            service.register(long_name, Utc::now()).await.unwrap_err(),
            ServiceError::Validation(ValidationError { field: "username", .. })
        ));
    }

    #[tokio::test]
    async fn login_issues_tokens_and_hides_which_credential_was_wrong() {
        let service = service();
        let user = service.register(register_request("ada@example.com"), Utc::now()).await.unwrap();

        let pair = service
            .login(login_request("ada@example.com", "correct horse"), Utc::now())
            .await
            .unwrap();
        assert_eq!(service.keys().validate(&pair.access_token).unwrap().sub, user.id);
        assert_eq!(pair.expires_in, 15 * 60);

        let wrong_password = service
            .login(login_request("ada@example.com", "wrong"), Utc::now())
            .await
            .unwrap_err();
        let unknown_email = service
            .login(login_request("nobody@example.com", "correct horse"), Utc::now())
            .await
            .unwrap_err();
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
        assert!(matches!(wrong_password, ServiceError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn refresh_rotates_and_expires() {
        let service = service();
        service.register(register_request("ada@example.com"), Utc::now()).await.unwrap();
        let first = service
            .login(login_request("ada@example.com", "correct horse"), Utc::now())
            .await
            .unwrap();

        let second = service.refresh(&first.refresh_token, Utc::now()).await.unwrap();
        assert_ne!(first.refresh_token, second.refresh_token);
        assert!(service.refresh(&first.refresh_token, Utc::now()).await.is_err());

        let past_expiry = Utc::now() + Duration::days(8);
        assert!(matches!(
            service.refresh(&second.refresh_token, past_expiry).await.unwrap_err(),
            ServiceError::Unauthorized(_)
        ));
    }

    #[tokio::test]
    async fn logout_invalidates_refresh_token() {
        let service = service();
        let user = service.register(register_request("ada@example.com"), Utc::now()).await.unwrap();
        let pair = service
            .login(login_request("ada@example.com", "correct horse"), Utc::now())
            .await
            .unwrap();

        service.logout(user.id, Utc::now()).await.unwrap();
        assert!(service.refresh(&pair.refresh_token, Utc::now()).await.is_err());
    }

    #[tokio::test]
    async fn only_self_or_administrator_may_delete() {
        let service = service();
        let ada = service.register(register_request("ada@example.com"), Utc::now()).await.unwrap();
        let bob = service.register(register_request("bob@example.com"), Utc::now()).await.unwrap();

        assert!(matches!(
            service.delete(ada.id, bob.id, Role::Member).await.unwrap_err(),
            ServiceError::Forbidden(_)
        ));
        service.delete(ada.id, bob.id, Role::Administrator).await.unwrap();
        assert!(matches!(
            service.profile(ada.id).await.unwrap_err(),
            ServiceError::NotFound("user")
        ));

        service.delete(bob.id, bob.id, Role::Member).await.unwrap();
        assert!(matches!(
            service.delete(bob.id, bob.id, Role::Member).await.unwrap_err(),
            ServiceError::NotFound("user")
        ));
    }
}
