//! Domain service for editable website content.
//!
//! Content lives in a flat (section, field) → value table. Writes are
//! best-effort per field: a failing field is skipped and the rest of the
//! batch still lands.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::db::ContentMap;

/// Errors specific to content operations.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for ContentError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for ContentError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

/// Whole-store snapshot, also accepted back by import.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    pub content: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct WriteSummary {
    /// Fields written.
    pub updated: usize,

    /// Fields that failed and were skipped.
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionStat {
    pub section: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentUpdate {
    pub section: String,
    pub field: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_content: u64,
    pub sections: Vec<SectionStat>,
    pub recent_updates: Vec<RecentUpdate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub field: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub query: String,
    pub results: BTreeMap<String, Vec<SearchHit>>,
    pub total_results: usize,
}

/// Metadata for an uploaded image, stored as JSON under the images section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    pub filename: String,

    #[serde(default)]
    pub original_name: String,

    #[serde(default)]
    pub path: String,

    #[serde(default)]
    pub size: u64,

    #[serde(default)]
    pub mimetype: String,

    #[serde(default)]
    pub uploaded_at: String,

    #[serde(default = "default_image_section")]
    pub section: String,

    #[serde(default = "default_image_field")]
    pub field: String,
}

fn default_image_section() -> String {
    "general".to_string()
}

fn default_image_field() -> String {
    "image".to_string()
}

/// Reassignment of an image to another section or field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageUpdate {
    pub section: Option<String>,
    pub field: Option<String>,
}

/// Domain service trait for website content.
#[async_trait::async_trait]
pub trait ContentService: Send + Sync {
    /// Field → value for one section; empty when the section does not exist.
    async fn get_section(&self, section: &str) -> Result<ContentMap, ContentError>;

    /// Every section with at least one value.
    async fn get_all(&self) -> Result<BTreeMap<String, ContentMap>, ContentError>;

    /// Sorted names of sections with at least one value.
    async fn list_sections(&self) -> Result<Vec<String>, ContentError>;

    /// Upserts every field of one section. Fields with an empty or overlong
    /// name are skipped and counted as failed.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Validation`] for an empty or overlong section
    /// name; nothing is written in that case.
    async fn update_section(
        &self,
        section: &str,
        fields: &Map<String, Value>,
    ) -> Result<WriteSummary, ContentError>;

    /// Upserts a nested section → field → value object.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Validation`] if any section is not an object.
    async fn update_sections(&self, content: &Map<String, Value>)
    -> Result<WriteSummary, ContentError>;

    async fn export(&self) -> Result<ContentDocument, ContentError>;

    /// Replays a document through the same path as [`Self::update_sections`].
    async fn import(&self, document: &ContentDocument) -> Result<WriteSummary, ContentError>;

    async fn dashboard(&self) -> Result<DashboardStats, ContentError>;

    async fn search(&self, query: &str) -> Result<SearchResults, ContentError>;

    /// Image records, optionally limited to the section they are assigned to.
    async fn list_images(&self, section: Option<&str>) -> Result<Vec<ImageRecord>, ContentError>;

    /// Reassigns the record whose `filename` matches. The record stays under
    /// the field it was stored under.
    async fn update_image(
        &self,
        filename: &str,
        update: &ImageUpdate,
    ) -> Result<ImageRecord, ContentError>;

    /// Clears the record whose `filename` matches with a null overwrite.
    async fn delete_image(&self, filename: &str) -> Result<(), ContentError>;
}
