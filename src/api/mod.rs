use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::Store;
use crate::services::{AuthService, ContentService};
use crate::state::SharedState;

mod admin;
pub mod auth;
mod error;
mod observability;
mod system;
mod types;
mod website;

pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &Store {
        &self.shared.store
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<dyn AuthService> {
        &self.shared.auth_service
    }

    #[must_use]
    pub fn content_service(&self) -> &Arc<dyn ContentService> {
        &self.shared.content_service
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub fn router(state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .merge(create_admin_router(state.clone()))
        .merge(create_account_router(state.clone()))
        .route("/auth/login", post(auth::login))
        .route("/website/content", get(website::get_content))
        .route("/website/content/{section}", get(website::get_section))
        .route("/website/images", get(website::get_images))
        .route("/website/search", get(website::search))
        .route("/health", get(system::health))
        .with_state(state);

    Router::new()
        .nest("/api", api_router)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
}

/// Routes for any signed-in user.
fn create_account_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::get_current_user))
        .route("/auth/change-password", post(auth::change_password))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}

/// Routes for the `admin` role. The last `route_layer` runs first.
fn create_admin_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/admin/content",
            get(admin::get_all_content).put(admin::update_all_content),
        )
        .route(
            "/admin/content/{section}",
            get(admin::get_section_content).put(admin::update_section_content),
        )
        .route("/admin/sections", get(admin::list_sections))
        .route("/admin/export", get(admin::export_content))
        .route("/admin/import", post(admin::import_content))
        .route("/admin/dashboard", get(admin::get_dashboard))
        .route("/admin/images", get(admin::list_images))
        .route(
            "/admin/images/section/{section}",
            get(admin::list_section_images),
        )
        .route(
            "/admin/images/{filename}",
            put(admin::update_image).delete(admin::delete_image),
        )
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn(auth::require_admin))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
