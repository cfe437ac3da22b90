//! Public read-only website endpoints.
//!
//! Reads degrade instead of failing: if the store cannot be reached, the
//! whole-site read answers with an empty object and a single section reads
//! as not found.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::warn;

use super::{ApiError, ApiResponse, AppState, SearchQuery, SectionQuery};
use crate::constants::IMAGES_SECTION;
use crate::db::ContentMap;
use crate::services::{ImageRecord, SearchResults};

/// `GET /api/website/content`
///
/// Text sections are returned as field maps; the images section is returned
/// as a list of parsed image records.
pub async fn get_content(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<Map<String, Value>>> {
    let service = state.content_service();

    let mut sections = match service.get_all().await {
        Ok(sections) => sections,
        Err(e) => {
            warn!(error = %e, "Serving empty website content");
            return Json(ApiResponse::success(Map::new()));
        }
    };

    let mut content: Map<String, Value> = Map::new();
    let has_images = sections.remove(IMAGES_SECTION).is_some();

    for (section, fields) in sections {
        content.insert(section, section_value(fields));
    }

    if has_images {
        match service.list_images(None).await {
            Ok(images) => {
                content.insert(
                    IMAGES_SECTION.to_string(),
                    serde_json::to_value(images).unwrap_or(Value::Array(Vec::new())),
                );
            }
            Err(e) => warn!(error = %e, "Leaving images out of website content"),
        }
    }

    Json(ApiResponse::success(content))
}

/// `GET /api/website/content/{section}`
pub async fn get_section(
    State(state): State<Arc<AppState>>,
    Path(section): Path<String>,
) -> Result<Json<ApiResponse<ContentMap>>, ApiError> {
    let fields = match state.content_service().get_section(&section).await {
        Ok(fields) => fields,
        Err(e) => {
            warn!(%section, error = %e, "Section read failed");
            ContentMap::new()
        }
    };

    if fields.is_empty() {
        return Err(ApiError::not_found("Section", section));
    }

    Ok(Json(ApiResponse::success(fields)))
}

/// `GET /api/website/images?section=`
pub async fn get_images(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SectionQuery>,
) -> Result<Json<ApiResponse<Vec<ImageRecord>>>, ApiError> {
    let images = state
        .content_service()
        .list_images(query.section.as_deref())
        .await?;
    Ok(Json(ApiResponse::success(images)))
}

/// `GET /api/website/search?q=`
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<SearchResults>>, ApiError> {
    let results = state.content_service().search(&query.q).await?;
    Ok(Json(ApiResponse::success(results)))
}

fn section_value(fields: ContentMap) -> Value {
    Value::Object(
        fields
            .into_iter()
            .map(|(field, value)| (field, Value::String(value)))
            .collect(),
    )
}
