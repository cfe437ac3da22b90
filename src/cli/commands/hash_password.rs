//! Hash-password command handler

use crate::config::Config;
use crate::db::repositories::user::hash_password;

pub async fn cmd_hash_password(config: &Config, password: &str) -> anyhow::Result<()> {
    if password.chars().count() < config.security.min_password_length {
        anyhow::bail!(
            "Password must be at least {} characters",
            config.security.min_password_length
        );
    }

    let hash = hash_password(password, config.security.bcrypt_cost).await?;
    println!("{hash}");
    Ok(())
}
