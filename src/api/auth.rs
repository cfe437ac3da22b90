use axum::{
    Extension, Json,
    extract::{ConnectInfo, Request, State, rejection::JsonRejection},
    http::{Extensions, HeaderMap, header},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::constants::auth::ADMIN_ROLE;
use crate::services::{AuthError, Claims, LoginResult, UserInfo};

// ============================================================================
// Request Types
// ============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(alias = "currentPassword")]
    pub current_password: String,
    #[serde(alias = "newPassword")]
    pub new_password: String,
}

// ============================================================================
// Middleware
// ============================================================================

/// Requires `Authorization: Bearer <token>` and stores the verified
/// [`Claims`] in the request extensions.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers()).ok_or(AuthError::MissingToken)?;
    let claims = state.auth_service().verify_token(token)?;

    tracing::Span::current().record("user_id", claims.user_id);
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

/// Must run inside [`auth_middleware`].
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let claims = request
        .extensions()
        .get::<Claims>()
        .ok_or(AuthError::MissingToken)?;

    if claims.role != ADMIN_ROLE {
        tracing::warn!(user_id = claims.user_id, role = %claims.role, "Admin route refused");
        return Err(AuthError::Forbidden.into());
    }

    Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// First `X-Forwarded-For` hop, falling back to the peer address.
fn client_ip(headers: &HeaderMap, extensions: &Extensions) -> Option<String> {
    if let Some(forwarded) = headers.get("x-forwarded-for")
        && let Ok(value) = forwarded.to_str()
        && let Some(first) = value.split(',').next().map(str::trim)
        && !first.is_empty()
    {
        return Some(first.to_string());
    }

    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/login
/// Exchange email and password for a bearer token
pub async fn login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    extensions: Extensions,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<LoginResult>>, ApiError> {
    let Json(payload) = payload?;
    let ip_address = client_ip(&headers, &extensions);

    let result = state
        .auth_service()
        .login(&payload.email, &payload.password, ip_address.as_deref())
        .await?;

    Ok(Json(ApiResponse::success(result)))
}

/// POST /auth/logout
/// Tokens are stateless; the client drops its copy
pub async fn logout(Extension(claims): Extension<Claims>) -> Json<ApiResponse<MessageResponse>> {
    tracing::info!(user_id = claims.user_id, "User logged out");
    Json(ApiResponse::success(MessageResponse::new(
        "Logout successful",
    )))
}

/// GET /auth/me
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<UserInfo>>, ApiError> {
    let user = state.auth_service().get_user_info(claims.user_id).await?;
    Ok(Json(ApiResponse::success(user)))
}

/// POST /auth/change-password
/// Change password (requires current password verification)
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let Json(payload) = payload?;

    state
        .auth_service()
        .change_password(
            claims.user_id,
            &payload.current_password,
            &payload.new_password,
        )
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Password changed successfully",
    ))))
}
