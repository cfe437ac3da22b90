//! Admin content endpoints.
//!
//! Every route here sits behind the bearer token check and the admin role
//! check. Content writes accept a nested section → field → value object and
//! report how many fields landed.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::header,
    response::IntoResponse,
};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::constants::export::FILENAME;
use crate::db::ContentMap;
use crate::services::{
    ContentDocument, DashboardStats, ImageRecord, ImageUpdate, WriteSummary,
};

/// `GET /api/admin/content`
pub async fn get_all_content(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<BTreeMap<String, ContentMap>>>, ApiError> {
    let content = state.content_service().get_all().await?;
    Ok(Json(ApiResponse::success(content)))
}

/// `GET /api/admin/sections`
pub async fn list_sections(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<String>>>, ApiError> {
    let sections = state.content_service().list_sections().await?;
    Ok(Json(ApiResponse::success(sections)))
}

/// `PUT /api/admin/content`
///
/// The body is `{ "<section>": { "<field>": <value> } }`. A `null` value
/// clears the field.
pub async fn update_all_content(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<Json<ApiResponse<WriteSummary>>, ApiError> {
    let Json(content) = payload?;
    let summary = state.content_service().update_sections(&content).await?;
    Ok(Json(ApiResponse::success(summary)))
}

/// `GET /api/admin/content/{section}`
///
/// Unlike the public read, an unknown section is an empty object.
pub async fn get_section_content(
    State(state): State<Arc<AppState>>,
    Path(section): Path<String>,
) -> Result<Json<ApiResponse<ContentMap>>, ApiError> {
    let fields = state.content_service().get_section(&section).await?;
    Ok(Json(ApiResponse::success(fields)))
}

/// `PUT /api/admin/content/{section}`
pub async fn update_section_content(
    State(state): State<Arc<AppState>>,
    Path(section): Path<String>,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<Json<ApiResponse<WriteSummary>>, ApiError> {
    let Json(fields) = payload?;
    let summary = state
        .content_service()
        .update_section(&section, &fields)
        .await?;
    Ok(Json(ApiResponse::success(summary)))
}

/// `GET /api/admin/export`
///
/// Returns the bare document, not the response envelope, so the download can
/// be posted straight back to the import endpoint.
pub async fn export_content(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let document = state.content_service().export().await?;

    Ok((
        [(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{FILENAME}\""),
        )],
        Json(document),
    ))
}

/// `POST /api/admin/import`
pub async fn import_content(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ContentDocument>, JsonRejection>,
) -> Result<Json<ApiResponse<WriteSummary>>, ApiError> {
    let Json(document) = payload?;
    let summary = state.content_service().import(&document).await?;
    Ok(Json(ApiResponse::success(summary)))
}

/// `GET /api/admin/dashboard`
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<DashboardStats>>, ApiError> {
    let stats = state.content_service().dashboard().await?;
    Ok(Json(ApiResponse::success(stats)))
}

// ============================================================================
// Image metadata
// ============================================================================

/// `GET /api/admin/images`
pub async fn list_images(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<ImageRecord>>>, ApiError> {
    let images = state.content_service().list_images(None).await?;
    Ok(Json(ApiResponse::success(images)))
}

/// `GET /api/admin/images/section/{section}`
pub async fn list_section_images(
    State(state): State<Arc<AppState>>,
    Path(section): Path<String>,
) -> Result<Json<ApiResponse<Vec<ImageRecord>>>, ApiError> {
    let images = state.content_service().list_images(Some(&section)).await?;
    Ok(Json(ApiResponse::success(images)))
}

/// `PUT /api/admin/images/{filename}`
pub async fn update_image(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
    payload: Result<Json<ImageUpdate>, JsonRejection>,
) -> Result<Json<ApiResponse<ImageRecord>>, ApiError> {
    let Json(update) = payload?;
    let record = state
        .content_service()
        .update_image(&filename, &update)
        .await?;
    Ok(Json(ApiResponse::success(record)))
}

/// `DELETE /api/admin/images/{filename}`
pub async fn delete_image(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.content_service().delete_image(&filename).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(format!(
        "Image '{filename}' deleted"
    )))))
}
