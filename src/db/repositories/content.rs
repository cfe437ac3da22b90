use std::collections::BTreeMap;

use anyhow::{Context, Result};
use sea_orm::sea_query::{Expr, Func, LikeExpr, OnConflict};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use tracing::warn;

use crate::constants::IMAGES_SECTION;
use crate::db::now_timestamp;
use crate::entities::{prelude::*, website_content};

/// Field name to value for one section.
pub type ContentMap = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionCount {
    pub section: String,
    pub count: u64,
}

pub struct ContentRepository {
    conn: DatabaseConnection,
}

impl ContentRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_section(&self, section: &str) -> Result<ContentMap> {
        let rows = WebsiteContent::find()
            .filter(website_content::Column::Section.eq(section))
            .filter(website_content::Column::Value.is_not_null())
            .all(&self.conn)
            .await
            .with_context(|| format!("Failed to load content section '{section}'"))?;

        Ok(rows
            .into_iter()
            .filter_map(|row| row.value.map(|value| (row.field, value)))
            .collect())
    }

    pub async fn get_all(&self) -> Result<BTreeMap<String, ContentMap>> {
        let rows = WebsiteContent::find()
            .filter(website_content::Column::Value.is_not_null())
            .all(&self.conn)
            .await
            .context("Failed to load website content")?;

        let mut sections: BTreeMap<String, ContentMap> = BTreeMap::new();
        for row in rows {
            if let Some(value) = row.value {
                sections
                    .entry(row.section)
                    .or_default()
                    .insert(row.field, value);
            }
        }

        Ok(sections)
    }

    pub async fn list_sections(&self) -> Result<Vec<String>> {
        let sections: Vec<String> = WebsiteContent::find()
            .select_only()
            .column(website_content::Column::Section)
            .filter(website_content::Column::Value.is_not_null())
            .distinct()
            .order_by_asc(website_content::Column::Section)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to list content sections")?;

        Ok(sections)
    }

    /// Insert or replace the value stored under `(section, field)`.
    /// A `None` value clears the entry.
    pub async fn upsert(&self, section: &str, field: &str, value: Option<&str>) -> Result<()> {
        let active_model = website_content::ActiveModel {
            section: Set(section.to_string()),
            field: Set(field.to_string()),
            value: Set(value.map(ToString::to_string)),
            updated_at: Set(now_timestamp()),
            ..Default::default()
        };

        WebsiteContent::insert(active_model)
            .on_conflict(
                OnConflict::columns([
                    website_content::Column::Section,
                    website_content::Column::Field,
                ])
                .update_columns([
                    website_content::Column::Value,
                    website_content::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await
            .with_context(|| format!("Failed to write content {section}.{field}"))?;

        Ok(())
    }

    /// Writes each field independently. A failing row is logged and skipped;
    /// the return value counts the rows that were written.
    pub async fn bulk_upsert(
        &self,
        section: &str,
        fields: &BTreeMap<String, Option<String>>,
    ) -> usize {
        let mut written = 0;

        for (field, value) in fields {
            match self.upsert(section, field, value.as_deref()).await {
                Ok(()) => written += 1,
                Err(e) => warn!(%section, %field, error = %e, "Skipping content field"),
            }
        }

        written
    }

    pub async fn section_counts(&self) -> Result<Vec<SectionCount>> {
        let rows: Vec<(String, i64)> = WebsiteContent::find()
            .select_only()
            .column(website_content::Column::Section)
            .column_as(website_content::Column::Id.count(), "count")
            .filter(website_content::Column::Value.is_not_null())
            .group_by(website_content::Column::Section)
            .order_by_asc(website_content::Column::Section)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to count content sections")?;

        Ok(rows
            .into_iter()
            .map(|(section, count)| SectionCount {
                section,
                count: u64::try_from(count).unwrap_or(0),
            })
            .collect())
    }

    pub async fn recent_updates(&self, limit: u64) -> Result<Vec<website_content::Model>> {
        WebsiteContent::find()
            .filter(website_content::Column::Value.is_not_null())
            .order_by_desc(website_content::Column::UpdatedAt)
            .order_by_desc(website_content::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("Failed to load recent content updates")
    }

    /// Case-insensitive (ASCII) substring match over text content. `%` and
    /// `_` in the term match literally. Image records are not searched.
    pub async fn search(&self, term: &str) -> Result<Vec<website_content::Model>> {
        let pattern = LikeExpr::new(contains_pattern(term)).escape('\\');

        WebsiteContent::find()
            .filter(website_content::Column::Value.is_not_null())
            .filter(website_content::Column::Section.ne(IMAGES_SECTION))
            .filter(Expr::expr(Func::lower(Expr::col(website_content::Column::Value))).like(pattern))
            .order_by_asc(website_content::Column::Section)
            .order_by_asc(website_content::Column::Field)
            .all(&self.conn)
            .await
            .context("Failed to search website content")
    }

    /// Inserts entries whose key is not taken yet; existing values win.
    pub async fn insert_if_absent(&self, entries: &[(&str, &str, &str)]) -> Result<usize> {
        let mut inserted = 0;

        for (section, field, value) in entries {
            let active_model = website_content::ActiveModel {
                section: Set((*section).to_string()),
                field: Set((*field).to_string()),
                value: Set(Some((*value).to_string())),
                updated_at: Set(now_timestamp()),
                ..Default::default()
            };

            let affected = WebsiteContent::insert(active_model)
                .on_conflict(
                    OnConflict::columns([
                        website_content::Column::Section,
                        website_content::Column::Field,
                    ])
                    .do_nothing()
                    .to_owned(),
                )
                .exec_without_returning(&self.conn)
                .await
                .with_context(|| format!("Failed to seed content {section}.{field}"))?;

            if affected > 0 {
                inserted += 1;
            }
        }

        Ok(inserted)
    }

    pub async fn count_rows(&self, section: &str, field: &str) -> Result<u64> {
        WebsiteContent::find()
            .filter(website_content::Column::Section.eq(section))
            .filter(website_content::Column::Field.eq(field))
            .count(&self.conn)
            .await
            .context("Failed to count content rows")
    }
}

/// `LIKE` pattern matching `term` anywhere, escaped with `\`. Only ASCII is
/// lower-cased, matching `SQLite`'s `lower()`.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c.to_ascii_lowercase());
    }
    pattern.push('%');
    pattern
}
