//! `SeaORM` implementation of the `ContentService` trait.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::constants::export::FORMAT_VERSION;
use crate::constants::limits::{MAX_KEY_LENGTH, MIN_SEARCH_QUERY_CHARS, RECENT_UPDATES};
use crate::constants::IMAGES_SECTION;
use crate::db::{ContentMap, Store, now_timestamp};
use crate::services::content_service::{
    ContentDocument, ContentError, ContentService, DashboardStats, ImageRecord, ImageUpdate,
    RecentUpdate, SearchHit, SearchResults, SectionStat, WriteSummary,
};

pub struct SeaOrmContentService {
    store: Store,
}

impl SeaOrmContentService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Image records keyed by the field they are stored under.
    async fn load_images(&self) -> Result<BTreeMap<String, ImageRecord>, ContentError> {
        let raw = self.store.get_content_section(IMAGES_SECTION).await?;

        Ok(raw
            .into_iter()
            .filter_map(|(key, json)| match serde_json::from_str::<ImageRecord>(&json) {
                Ok(record) => Some((key, record)),
                Err(e) => {
                    warn!(%key, error = %e, "Ignoring malformed image record");
                    None
                }
            })
            .collect())
    }

    /// Finds the record for `filename` along with the field it is stored
    /// under, which is usually not the filename itself.
    async fn find_image(&self, filename: &str) -> Result<(String, ImageRecord), ContentError> {
        self.load_images()
            .await?
            .into_iter()
            .find(|(_, record)| record.filename == filename)
            .ok_or_else(|| ContentError::NotFound(format!("Image '{filename}'")))
    }

    async fn write_batch(&self, section: &str, batch: &FieldBatch) -> WriteSummary {
        let written = self.store.bulk_upsert_content(section, &batch.leaves).await;
        WriteSummary {
            updated: written,
            failed: batch.leaves.len() - written + batch.rejected,
        }
    }
}

#[async_trait]
impl ContentService for SeaOrmContentService {
    async fn get_section(&self, section: &str) -> Result<ContentMap, ContentError> {
        Ok(self.store.get_content_section(section).await?)
    }

    async fn get_all(&self) -> Result<BTreeMap<String, ContentMap>, ContentError> {
        Ok(self.store.get_all_content().await?)
    }

    async fn list_sections(&self) -> Result<Vec<String>, ContentError> {
        Ok(self.store.list_content_sections().await?)
    }

    async fn update_section(
        &self,
        section: &str,
        fields: &Map<String, Value>,
    ) -> Result<WriteSummary, ContentError> {
        validate_key("section", section)?;
        let batch = collect_leaves(section, fields);
        let summary = self.write_batch(section, &batch).await;

        info!(
            %section,
            updated = summary.updated,
            failed = summary.failed,
            "Content section updated"
        );
        Ok(summary)
    }

    async fn update_sections(
        &self,
        content: &Map<String, Value>,
    ) -> Result<WriteSummary, ContentError> {
        // Structural problems reject the whole document before anything is
        // written.
        let mut batches = Vec::with_capacity(content.len());
        for (section, fields) in content {
            validate_key("section", section)?;
            let Value::Object(fields) = fields else {
                return Err(ContentError::Validation(format!(
                    "Section '{section}' must be an object of field values"
                )));
            };
            batches.push((section, collect_leaves(section, fields)));
        }

        let mut summary = WriteSummary::default();
        for (section, batch) in &batches {
            let written = self.write_batch(section, batch).await;
            summary.updated += written.updated;
            summary.failed += written.failed;
        }

        info!(
            sections = content.len(),
            updated = summary.updated,
            failed = summary.failed,
            "Content updated"
        );
        Ok(summary)
    }

    async fn export(&self) -> Result<ContentDocument, ContentError> {
        let all = self.store.get_all_content().await?;

        let content = all
            .into_iter()
            .map(|(section, fields)| {
                let fields: Map<String, Value> = fields
                    .into_iter()
                    .map(|(field, value)| (field, Value::String(value)))
                    .collect();
                (section, Value::Object(fields))
            })
            .collect();

        Ok(ContentDocument {
            export_date: Some(now_timestamp()),
            version: Some(FORMAT_VERSION.to_string()),
            content,
        })
    }

    async fn import(&self, document: &ContentDocument) -> Result<WriteSummary, ContentError> {
        if let Some(version) = &document.version {
            check_format_version(version)?;
        }

        let summary = self.update_sections(&document.content).await?;
        info!(
            export_date = document.export_date.as_deref().unwrap_or("unknown"),
            updated = summary.updated,
            "Content imported"
        );
        Ok(summary)
    }

    async fn dashboard(&self) -> Result<DashboardStats, ContentError> {
        let counts = self.store.content_section_counts().await?;
        let recent = self.store.recent_content_updates(RECENT_UPDATES).await?;

        Ok(DashboardStats {
            total_content: counts.iter().map(|c| c.count).sum(),
            sections: counts
                .into_iter()
                .map(|c| SectionStat {
                    section: c.section,
                    count: c.count,
                })
                .collect(),
            recent_updates: recent
                .into_iter()
                .map(|entry| RecentUpdate {
                    section: entry.section,
                    field: entry.field,
                    updated_at: entry.updated_at,
                })
                .collect(),
        })
    }

    async fn search(&self, query: &str) -> Result<SearchResults, ContentError> {
        let query = query.trim();
        if query.chars().count() < MIN_SEARCH_QUERY_CHARS {
            return Err(ContentError::Validation(format!(
                "Search query must be at least {MIN_SEARCH_QUERY_CHARS} characters"
            )));
        }

        let hits = self.store.search_content(query).await?;
        let total_results = hits.len();

        let mut results: BTreeMap<String, Vec<SearchHit>> = BTreeMap::new();
        for entry in hits {
            if let Some(value) = entry.value {
                results.entry(entry.section).or_default().push(SearchHit {
                    field: entry.field,
                    value,
                });
            }
        }

        Ok(SearchResults {
            query: query.to_string(),
            results,
            total_results,
        })
    }

    async fn list_images(&self, section: Option<&str>) -> Result<Vec<ImageRecord>, ContentError> {
        let mut images: Vec<ImageRecord> = self
            .load_images()
            .await?
            .into_values()
            .filter(|record| section.is_none_or(|s| record.section == s))
            .collect();

        images.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        Ok(images)
    }

    async fn update_image(
        &self,
        filename: &str,
        update: &ImageUpdate,
    ) -> Result<ImageRecord, ContentError> {
        let (key, mut record) = self.find_image(filename).await?;

        if let Some(section) = &update.section {
            validate_key("section", section)?;
            record.section.clone_from(section);
        }
        if let Some(field) = &update.field {
            validate_key("field", field)?;
            record.field.clone_from(field);
        }

        let json = serde_json::to_string(&record)
            .map_err(|e| ContentError::Internal(format!("Failed to encode image record: {e}")))?;
        self.store
            .upsert_content(IMAGES_SECTION, &key, Some(&json))
            .await?;

        info!(%filename, %key, section = %record.section, field = %record.field, "Image reassigned");
        Ok(record)
    }

    async fn delete_image(&self, filename: &str) -> Result<(), ContentError> {
        let (key, _) = self.find_image(filename).await?;

        self.store.upsert_content(IMAGES_SECTION, &key, None).await?;

        info!(%filename, %key, "Image record deleted");
        Ok(())
    }
}

/// Leaves of one section ready to write, plus the count of fields skipped
/// for an unusable name.
struct FieldBatch {
    leaves: BTreeMap<String, Option<String>>,
    rejected: usize,
}

/// Section and field names must be non-blank and at most
/// `MAX_KEY_LENGTH` bytes.
fn validate_key(kind: &str, key: &str) -> Result<(), ContentError> {
    if key.trim().is_empty() || key.len() > MAX_KEY_LENGTH {
        return Err(ContentError::Validation(format!(
            "Invalid {kind} name: must be 1-{MAX_KEY_LENGTH} characters"
        )));
    }

    Ok(())
}

fn collect_leaves(section: &str, fields: &Map<String, Value>) -> FieldBatch {
    let mut batch = FieldBatch {
        leaves: BTreeMap::new(),
        rejected: 0,
    };

    for (field, value) in fields {
        if let Err(e) = validate_key("field", field) {
            warn!(%section, %field, error = %e, "Skipping content field");
            batch.rejected += 1;
            continue;
        }
        batch.leaves.insert(field.clone(), leaf_to_value(value));
    }

    batch
}

/// Stored form of a JSON leaf. Strings are kept verbatim, null clears the
/// entry, anything else is stored as compact JSON text.
fn leaf_to_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn check_format_version(version: &str) -> Result<(), ContentError> {
    let expected_major = FORMAT_VERSION.split('.').next().unwrap_or_default();
    let major = version.split('.').next().unwrap_or_default();

    if major == expected_major {
        Ok(())
    } else {
        Err(ContentError::Validation(format!(
            "Unsupported export version '{version}', expected {FORMAT_VERSION}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_leaf_to_value() {
        assert_eq!(leaf_to_value(&json!("Dark Roast")), Some("Dark Roast".into()));
        assert_eq!(leaf_to_value(&json!(null)), None);
        assert_eq!(leaf_to_value(&json!(16.5)), Some("16.5".into()));
        assert_eq!(leaf_to_value(&json!(true)), Some("true".into()));
        assert_eq!(
            leaf_to_value(&json!({"a": [1, 2]})),
            Some(r#"{"a":[1,2]}"#.into())
        );
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("section", "hero").is_ok());
        assert!(validate_key("field", "feature1_title").is_ok());
        assert!(validate_key("field", "logo-1700000000.png").is_ok());
        assert!(validate_key("field", "Hours (weekend)").is_ok());
        assert!(validate_key("section", "").is_err());
        assert!(validate_key("section", "   ").is_err());
        assert!(validate_key("field", &"x".repeat(MAX_KEY_LENGTH)).is_ok());
        assert!(validate_key("field", &"x".repeat(MAX_KEY_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_collect_leaves_skips_unusable_field() {
        let fields = json!({"heading": "Hi", "Hours (weekend)": "9-5", "": "x"});
        let Value::Object(mut fields) = fields else {
            unreachable!()
        };
        fields.insert("x".repeat(MAX_KEY_LENGTH + 1), json!("y"));

        let batch = collect_leaves("contact", &fields);
        assert_eq!(batch.rejected, 2);
        assert_eq!(batch.leaves.len(), 2);
        assert_eq!(
            batch.leaves.get("Hours (weekend)"),
            Some(&Some("9-5".to_string()))
        );
    }

    #[test]
    fn test_check_format_version() {
        assert!(check_format_version("1.0.0").is_ok());
        assert!(check_format_version("1.2").is_ok());
        assert!(check_format_version("2.0.0").is_err());
    }
}
