//! Init command handler

use crate::config::{Config, DEFAULT_ADMIN_PASSWORD};
use crate::constants::DEFAULT_CONTENT;
use crate::state::SharedState;

pub async fn cmd_init(config: Config) -> anyhow::Result<()> {
    let bootstrap = config.bootstrap.clone();
    let state = SharedState::new(config).await?;

    println!("Database ready.");

    if state.auth_service.ensure_bootstrap_admin(&bootstrap).await? {
        println!("Created admin user: {}", bootstrap.admin_email);
        if bootstrap.admin_password == DEFAULT_ADMIN_PASSWORD {
            println!("  Password: {DEFAULT_ADMIN_PASSWORD}");
            println!("  Change it after the first login!");
        }
    } else {
        println!("Users already exist, skipping admin creation.");
    }

    let seeded = state.store.seed_content(DEFAULT_CONTENT).await?;
    println!(
        "Seeded {seeded} of {} default content fields (existing values kept).",
        DEFAULT_CONTENT.len()
    );

    Ok(())
}
