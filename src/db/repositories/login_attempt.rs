use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, Set};

use crate::db::{format_timestamp, now_timestamp};
use crate::entities::{login_attempts, prelude::*};

pub struct LoginAttemptRepository {
    conn: DatabaseConnection,
}

impl LoginAttemptRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn record(&self, email: &str, ip_address: Option<&str>, success: bool) -> Result<()> {
        let active_model = login_attempts::ActiveModel {
            email: Set(email.to_string()),
            ip_address: Set(ip_address.map(ToString::to_string)),
            attempted_at: Set(now_timestamp()),
            success: Set(success),
            ..Default::default()
        };

        LoginAttempts::insert(active_model)
            .exec(&self.conn)
            .await
            .context("Failed to record login attempt")?;

        Ok(())
    }

    /// Failed attempts for `email` at or after `since`.
    pub async fn count_failures_since(&self, email: &str, since: DateTime<Utc>) -> Result<u64> {
        LoginAttempts::find()
            .filter(login_attempts::Column::Email.eq(email))
            .filter(login_attempts::Column::Success.eq(false))
            .filter(login_attempts::Column::AttemptedAt.gte(format_timestamp(since)))
            .count(&self.conn)
            .await
            .context("Failed to count recent login failures")
    }

    pub async fn prune_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = LoginAttempts::delete_many()
            .filter(login_attempts::Column::AttemptedAt.lt(format_timestamp(cutoff)))
            .exec(&self.conn)
            .await
            .context("Failed to prune login attempts")?;

        Ok(result.rows_affected)
    }
}
