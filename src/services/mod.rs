pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, LoginResult, UserInfo};
pub use auth_service_impl::SeaOrmAuthService;

pub mod content_service;
pub mod content_service_impl;
pub use content_service::{
    ContentDocument, ContentError, ContentService, DashboardStats, ImageRecord, ImageUpdate,
    SearchResults, WriteSummary,
};
pub use content_service_impl::SeaOrmContentService;

pub mod token;
pub use token::{Claims, TokenIssuer};
