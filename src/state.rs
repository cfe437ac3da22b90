use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, ContentService, SeaOrmAuthService, SeaOrmContentService, TokenIssuer,
};

/// Services shared by the HTTP server and the CLI commands.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub auth_service: Arc<dyn AuthService>,

    pub content_service: Arc<dyn ContentService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_url,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        Ok(Self::with_store(config, store))
    }

    #[must_use]
    pub fn with_store(config: Config, store: Store) -> Self {
        let tokens = TokenIssuer::from_config(&config.security);

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            tokens,
            config.security.clone(),
        )) as Arc<dyn AuthService>;

        let content_service =
            Arc::new(SeaOrmContentService::new(store.clone())) as Arc<dyn ContentService>;

        Self {
            config: Arc::new(config),
            store,
            auth_service,
            content_service,
        }
    }
}
