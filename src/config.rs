use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

const BCRYPT_COST_RANGE: std::ops::RangeInclusive<u32> = 4..=31;
const MAX_JWT_EXPIRY_HOURS: u64 = 24 * 365;
const MAX_LOCKOUT_WINDOW_SECONDS: u64 = 24 * 60 * 60;
const MAX_ATTEMPT_RETENTION_DAYS: u32 = 10 * 365;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub security: SecurityConfig,

    pub bootstrap: BootstrapConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_url: String,

    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:data/brewpress.db".to_string(),
            log_level: "info".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            bind_address: "0.0.0.0".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// HMAC secret for signing tokens. Left empty, a random one is generated
    /// at startup and every token dies with the process.
    pub jwt_secret: String,

    pub jwt_expiry_hours: u64,

    /// bcrypt work factor for new password hashes.
    pub bcrypt_cost: u32,

    pub min_password_length: usize,

    /// Login lockout policy.
    pub auth_throttle: AuthThrottleConfig,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_expiry_hours: 24,
            bcrypt_cost: 12,
            min_password_length: 8,
            auth_throttle: AuthThrottleConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthThrottleConfig {
    /// Failed attempts inside the window that lock the account.
    pub max_attempts: u32,

    /// Trailing window for counting failures.
    pub window_seconds: u64,

    /// Attempts older than this are pruned at startup.
    pub retention_days: u32,
}

impl Default for AuthThrottleConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window_seconds: 15 * 60,
            retention_days: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    pub admin_email: String,

    pub admin_password: String,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            admin_email: "admin@example.com".to_string(),
            admin_password: DEFAULT_ADMIN_PASSWORD.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            server: ServerConfig::default(),
            security: SecurityConfig::default(),
            bootstrap: BootstrapConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Config {
    /// Loads `.env`, the first config file found, then applies environment
    /// overrides on top.
    pub fn load() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            info!("Loaded environment from: {}", path.display());
        }

        let mut config = Self::load_file()?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        for path in Self::config_paths() {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(&path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Overrides file values with whatever `lookup` returns for the known
    /// environment keys.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL") {
            self.general.database_url = url;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.general.log_level = level;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .parse()
                .with_context(|| format!("PORT is not a valid port: {port}"))?;
        }
        if let Some(secret) = lookup("JWT_SECRET") {
            self.security.jwt_secret = secret;
        }
        if let Some(hours) = lookup("JWT_EXPIRES_IN_HOURS") {
            self.security.jwt_expiry_hours = hours
                .parse()
                .with_context(|| format!("JWT_EXPIRES_IN_HOURS is not a number: {hours}"))?;
        }
        if let Some(rounds) = lookup("BCRYPT_ROUNDS") {
            self.security.bcrypt_cost = rounds
                .parse()
                .with_context(|| format!("BCRYPT_ROUNDS is not a number: {rounds}"))?;
        }
        if let Some(email) = lookup("ADMIN_EMAIL") {
            self.bootstrap.admin_email = email;
        }
        if let Some(password) = lookup("ADMIN_PASSWORD") {
            self.bootstrap.admin_password = password;
        }
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("brewpress").join("config.toml"));
        }

        paths
    }

    pub fn validate(&self) -> Result<()> {
        let security = &self.security;

        if !BCRYPT_COST_RANGE.contains(&security.bcrypt_cost) {
            anyhow::bail!(
                "bcrypt cost must be between {} and {}, got {}",
                BCRYPT_COST_RANGE.start(),
                BCRYPT_COST_RANGE.end(),
                security.bcrypt_cost
            );
        }

        if !security.jwt_secret.is_empty() && security.jwt_secret.len() < 16 {
            anyhow::bail!("JWT secret must be at least 16 bytes");
        }

        if !(1..=MAX_JWT_EXPIRY_HOURS).contains(&security.jwt_expiry_hours) {
            anyhow::bail!(
                "JWT expiry must be between 1 and {MAX_JWT_EXPIRY_HOURS} hours, got {}",
                security.jwt_expiry_hours
            );
        }

        let throttle = &security.auth_throttle;
        if throttle.max_attempts == 0 || throttle.window_seconds == 0 {
            anyhow::bail!("Login lockout needs a positive attempt limit and window");
        }

        if throttle.window_seconds > MAX_LOCKOUT_WINDOW_SECONDS {
            anyhow::bail!(
                "Login lockout window cannot exceed {MAX_LOCKOUT_WINDOW_SECONDS} seconds, got {}",
                throttle.window_seconds
            );
        }

        if throttle.retention_days > MAX_ATTEMPT_RETENTION_DAYS {
            anyhow::bail!(
                "Login attempt retention cannot exceed {MAX_ATTEMPT_RETENTION_DAYS} days, got {}",
                throttle.retention_days
            );
        }

        if self.bootstrap.admin_email.trim().is_empty() {
            anyhow::bail!("Bootstrap admin email cannot be empty");
        }

        Ok(())
    }
}
