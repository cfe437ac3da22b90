//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tracing::{info, warn};

use crate::config::{BootstrapConfig, DEFAULT_ADMIN_PASSWORD, SecurityConfig};
use crate::constants::auth::ADMIN_ROLE;
use crate::db::Store;
use crate::db::repositories::user::{hash_password, verify_password};
use crate::services::auth_service::{
    AuthError, AuthService, LoginResult, UserInfo, normalize_email,
};
use crate::services::token::{Claims, TokenIssuer};

pub struct SeaOrmAuthService {
    store: Store,
    tokens: TokenIssuer,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, tokens: TokenIssuer, security: SecurityConfig) -> Self {
        Self {
            store,
            tokens,
            security,
        }
    }

    fn lockout_window(&self) -> Duration {
        Duration::seconds(
            i64::try_from(self.security.auth_throttle.window_seconds).unwrap_or(i64::MAX),
        )
    }

    async fn record_failure(&self, email: &str, ip_address: Option<&str>) -> Result<(), AuthError> {
        metrics::counter!("auth_login_attempts_total", "outcome" => "failure").increment(1);
        self.store
            .record_login_attempt(email, ip_address, false)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn login(
        &self,
        email: &str,
        password: &str,
        ip_address: Option<&str>,
    ) -> Result<LoginResult, AuthError> {
        let email = normalize_email(email)?;
        if password.is_empty() {
            return Err(AuthError::Validation("Password is required".to_string()));
        }

        // Locked accounts are rejected before the password is looked at.
        let window = self.lockout_window();
        let failures = self
            .store
            .count_failed_logins_since(&email, Utc::now() - window)
            .await?;

        if failures >= u64::from(self.security.auth_throttle.max_attempts) {
            warn!(%email, failures, "Login rejected: account locked out");
            metrics::counter!("auth_login_attempts_total", "outcome" => "locked_out").increment(1);
            return Err(AuthError::LockedOut {
                retry_after_minutes: u64::try_from(window.num_minutes()).unwrap_or(0).max(1),
            });
        }

        let Some((user, password_hash)) = self.store.get_user_by_email_with_password(&email).await?
        else {
            self.record_failure(&email, ip_address).await?;
            return Err(AuthError::InvalidCredentials);
        };

        let password_ok = user.is_active
            && verify_password(password, &password_hash)
                .await
                .unwrap_or_else(|e| {
                    warn!(user_id = user.id, "Password check failed: {e:#}");
                    false
                });

        if !password_ok {
            self.record_failure(&email, ip_address).await?;
            return Err(AuthError::InvalidCredentials);
        }

        self.store.touch_user_last_login(user.id).await?;
        self.store
            .record_login_attempt(&email, ip_address, true)
            .await?;
        metrics::counter!("auth_login_attempts_total", "outcome" => "success").increment(1);

        let issued = self.tokens.issue(&user)?;
        info!(user_id = user.id, "User logged in");

        let user = self
            .store
            .get_user_by_id(user.id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(LoginResult {
            token: issued.token,
            expires_at: issued.expires_at,
            user: UserInfo::from(user),
        })
    }

    fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        Ok(self.tokens.verify(token)?)
    }

    async fn get_user_info(&self, user_id: i32) -> Result<UserInfo, AuthError> {
        let user = self
            .store
            .get_user_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(UserInfo::from(user))
    }

    async fn change_password(
        &self,
        user_id: i32,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        if current_password.is_empty() {
            return Err(AuthError::Validation(
                "Current password is required".to_string(),
            ));
        }

        let min_length = self.security.min_password_length;
        if new_password.chars().count() < min_length {
            return Err(AuthError::Validation(format!(
                "New password must be at least {min_length} characters"
            )));
        }

        if current_password == new_password {
            return Err(AuthError::Validation(
                "New password must be different from current password".to_string(),
            ));
        }

        let password_hash = self
            .store
            .get_user_password_hash(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !verify_password(current_password, &password_hash).await? {
            return Err(AuthError::Validation(
                "Current password is incorrect".to_string(),
            ));
        }

        let new_hash = hash_password(new_password, self.security.bcrypt_cost).await?;
        self.store
            .update_user_password_hash(user_id, &new_hash)
            .await?;

        info!(user_id, "Password changed");
        Ok(())
    }

    async fn ensure_bootstrap_admin(&self, bootstrap: &BootstrapConfig) -> Result<bool, AuthError> {
        if self.store.count_users().await? > 0 {
            return Ok(false);
        }

        let email = normalize_email(&bootstrap.admin_email)?;

        if bootstrap.admin_password == DEFAULT_ADMIN_PASSWORD {
            warn!("Bootstrapping admin with the default password. Change it immediately!");
        }

        let password_hash =
            hash_password(&bootstrap.admin_password, self.security.bcrypt_cost).await?;
        let user = self
            .store
            .create_user(&email, &password_hash, ADMIN_ROLE)
            .await?;

        info!(user_id = user.id, %email, "Default admin user created");
        Ok(true)
    }

    async fn prune_login_attempts(&self) -> Result<u64, AuthError> {
        let retention = Duration::days(i64::from(self.security.auth_throttle.retention_days));
        let pruned = self.store.prune_login_attempts(Utc::now() - retention).await?;

        if pruned > 0 {
            info!(pruned, "Pruned old login attempts");
        }
        Ok(pruned)
    }
}
