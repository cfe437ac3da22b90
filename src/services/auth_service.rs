//! Domain service for authentication and user management.
//!
//! Handles login with lockout, token verification, password changes, and the
//! bootstrap admin account.

use serde::Serialize;
use thiserror::Error;

use crate::config::BootstrapConfig;
use crate::db::User;
use crate::services::token::{Claims, TokenError};

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account temporarily locked due to too many failed attempts")]
    LockedOut { retry_after_minutes: u64 },

    #[error("User not found")]
    UserNotFound,

    #[error("Access token required")]
    MissingToken,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Insufficient permissions")]
    Forbidden,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired | TokenError::Invalid(_) => Self::InvalidToken,
            TokenError::Signing(msg) => Self::Internal(msg),
        }
    }
}

/// User info DTO for responses.
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub id: i32,
    pub email: String,
    pub role: String,
    pub created_at: String,
    pub last_login: Option<String>,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
            last_login: user.last_login,
        }
    }
}

/// Login result containing the signed token and the user it belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub token: String,
    pub expires_at: String,
    pub user: UserInfo,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Runs the lockout check, then the credential check, and issues a token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::LockedOut`] when too many recent attempts failed,
    /// regardless of the supplied password, and [`AuthError::InvalidCredentials`]
    /// for an unknown user, an inactive user, or a wrong password alike.
    async fn login(
        &self,
        email: &str,
        password: &str,
        ip_address: Option<&str>,
    ) -> Result<LoginResult, AuthError>;

    /// Verifies a bearer token and returns its claims.
    fn verify_token(&self, token: &str) -> Result<Claims, AuthError>;

    /// Gets information for a specific user.
    async fn get_user_info(&self, user_id: i32) -> Result<UserInfo, AuthError>;

    /// Changes a user's password.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] if current password is incorrect or new password invalid.
    async fn change_password(
        &self,
        user_id: i32,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError>;

    /// Creates the admin account when no user exists yet. Returns whether one
    /// was created.
    async fn ensure_bootstrap_admin(&self, bootstrap: &BootstrapConfig) -> Result<bool, AuthError>;

    /// Drops login attempts older than the retention period.
    async fn prune_login_attempts(&self) -> Result<u64, AuthError>;
}

/// Trims and lower-cases an email address after a basic shape check.
pub fn normalize_email(raw: &str) -> Result<String, AuthError> {
    let email = raw.trim().to_lowercase();

    let valid = email.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty()
            && !domain.contains('@')
            && domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
    }) && !email.chars().any(char::is_whitespace);

    if valid {
        Ok(email)
    } else {
        Err(AuthError::Validation(
            "A valid email address is required".to_string(),
        ))
    }
}
