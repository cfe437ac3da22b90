use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use crate::entities::website_content::Model as ContentEntry;
pub use repositories::content::{ContentMap, SectionCount};
pub use repositories::user::User;

/// Renders a fixed-width UTC timestamp. Every stored timestamp goes through
/// here so that lexical order matches chronological order.
#[must_use]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[must_use]
pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if let Some(path_str) = sqlite_file_path(db_url) {
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn content_repo(&self) -> repositories::content::ContentRepository {
        repositories::content::ContentRepository::new(self.conn.clone())
    }

    fn login_attempt_repo(&self) -> repositories::login_attempt::LoginAttemptRepository {
        repositories::login_attempt::LoginAttemptRepository::new(self.conn.clone())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    // ------------------------------------------------------------------
    // Content
    // ------------------------------------------------------------------

    pub async fn get_content_section(&self, section: &str) -> Result<ContentMap> {
        self.content_repo().get_section(section).await
    }

    pub async fn get_all_content(&self) -> Result<BTreeMap<String, ContentMap>> {
        self.content_repo().get_all().await
    }

    pub async fn list_content_sections(&self) -> Result<Vec<String>> {
        self.content_repo().list_sections().await
    }

    pub async fn upsert_content(
        &self,
        section: &str,
        field: &str,
        value: Option<&str>,
    ) -> Result<()> {
        self.content_repo().upsert(section, field, value).await
    }

    pub async fn bulk_upsert_content(
        &self,
        section: &str,
        fields: &BTreeMap<String, Option<String>>,
    ) -> usize {
        self.content_repo().bulk_upsert(section, fields).await
    }

    pub async fn content_section_counts(&self) -> Result<Vec<SectionCount>> {
        self.content_repo().section_counts().await
    }

    pub async fn recent_content_updates(&self, limit: u64) -> Result<Vec<ContentEntry>> {
        self.content_repo().recent_updates(limit).await
    }

    pub async fn search_content(&self, term: &str) -> Result<Vec<ContentEntry>> {
        self.content_repo().search(term).await
    }

    pub async fn seed_content(&self, entries: &[(&str, &str, &str)]) -> Result<usize> {
        self.content_repo().insert_if_absent(entries).await
    }

    pub async fn count_content_rows(&self, section: &str, field: &str) -> Result<u64> {
        self.content_repo().count_rows(section, field).await
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    pub async fn get_user_by_id(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_email_with_password(
        &self,
        email: &str,
    ) -> Result<Option<(User, String)>> {
        self.user_repo().get_by_email_with_password(email).await
    }

    pub async fn get_user_password_hash(&self, id: i32) -> Result<Option<String>> {
        self.user_repo().get_password_hash(id).await
    }

    pub async fn count_users(&self) -> Result<u64> {
        self.user_repo().count().await
    }

    pub async fn create_user(&self, email: &str, password_hash: &str, role: &str) -> Result<User> {
        self.user_repo().create(email, password_hash, role).await
    }

    pub async fn update_user_password_hash(&self, id: i32, password_hash: &str) -> Result<()> {
        self.user_repo().update_password_hash(id, password_hash).await
    }

    pub async fn touch_user_last_login(&self, id: i32) -> Result<()> {
        self.user_repo().touch_last_login(id).await
    }

    // ------------------------------------------------------------------
    // Login attempts
    // ------------------------------------------------------------------

    pub async fn record_login_attempt(
        &self,
        email: &str,
        ip_address: Option<&str>,
        success: bool,
    ) -> Result<()> {
        self.login_attempt_repo()
            .record(email, ip_address, success)
            .await
    }

    pub async fn count_failed_logins_since(&self, email: &str, since: DateTime<Utc>) -> Result<u64> {
        self.login_attempt_repo()
            .count_failures_since(email, since)
            .await
    }

    pub async fn prune_login_attempts(&self, older_than: DateTime<Utc>) -> Result<u64> {
        self.login_attempt_repo().prune_before(older_than).await
    }
}

/// Returns the on-disk path for file-backed SQLite URLs.
fn sqlite_file_path(db_url: &str) -> Option<&str> {
    let rest = db_url
        .strip_prefix("sqlite://")
        .or_else(|| db_url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or(rest);

    if path.is_empty() || path.starts_with(":memory:") {
        None
    } else {
        Some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_sqlite_file_path() {
        assert_eq!(sqlite_file_path("sqlite:data/site.db"), Some("data/site.db"));
        assert_eq!(
            sqlite_file_path("sqlite://data/site.db?mode=rwc"),
            Some("data/site.db")
        );
        assert_eq!(sqlite_file_path("sqlite::memory:"), None);
        assert_eq!(sqlite_file_path("postgres://localhost/site"), None);
    }

    #[test]
    fn test_timestamps_sort_lexically() {
        let early = Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap();
        let late = early + chrono::Duration::milliseconds(1500);

        let a = format_timestamp(early);
        let b = format_timestamp(late);

        assert_eq!(a, "2026-01-01T09:00:00.000000Z");
        assert_eq!(a.len(), b.len());
        assert!(a < b);
    }
}
