//! Row representations for the catalog tables.
//!
//! Rows travel as JSON objects; these types pin the column names and give
//! decode failures one place to surface as data corruption.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use widgetvault_core::{CategoryId, Slug, TagId, UserId, Visibility, WidgetId};

use crate::model::{Category, Tag, UserProfile, Widget};

use super::RepositoryError;

// =============================================================================
// Stored rows
// =============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct WidgetRow {
    pub id: WidgetId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    pub code: String,
    pub is_public: bool,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CategoryRow {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TagRow {
    pub id: TagId,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WidgetCategoryRow {
    pub widget_id: WidgetId,
    pub category_id: CategoryId,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WidgetTagRow {
    pub widget_id: WidgetId,
    pub tag_id: TagId,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FavoriteRow {
    pub user_id: UserId,
    pub widget_id: WidgetId,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProfileRow {
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Insert payloads
// =============================================================================

#[derive(Debug, Serialize)]
pub(crate) struct NewWidgetRow<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<&'a str>,
    pub code: &'a str,
    pub is_public: bool,
    pub user_id: UserId,
}

#[derive(Debug, Serialize)]
pub(crate) struct NewWidgetCategoryRow {
    pub widget_id: WidgetId,
    pub category_id: CategoryId,
}

#[derive(Debug, Serialize)]
pub(crate) struct NewWidgetTagRow {
    pub widget_id: WidgetId,
    pub tag_id: TagId,
}

#[derive(Debug, Serialize)]
pub(crate) struct NewFavoriteRow {
    pub user_id: UserId,
    pub widget_id: WidgetId,
}

// =============================================================================
// Row to domain mapping
// =============================================================================

pub(crate) fn map_widget(
    row: WidgetRow,
    category_ids: Vec<CategoryId>,
    tag_ids: Vec<TagId>,
    is_favorite: bool,
) -> Widget {
    Widget {
        id: row.id,
        name: row.name,
        description: row.description.unwrap_or_default(),
        thumbnail_url: row.thumbnail_url,
        code: row.code,
        category_ids,
        tag_ids,
        owner: row.user_id,
        visibility: Visibility::from_public_flag(row.is_public),
        is_favorite,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

pub(crate) fn map_category(
    row: CategoryRow,
    usage_count: usize,
) -> Result<Category, RepositoryError> {
    let slug = Slug::parse(&row.slug).map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid slug on category {}: {e}", row.id))
    })?;
    Ok(Category {
        id: row.id,
        name: row.name,
        slug,
        usage_count,
    })
}

pub(crate) fn map_tag(row: TagRow, usage_count: usize) -> Result<Tag, RepositoryError> {
    let slug = Slug::parse(&row.slug).map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid slug on tag {}: {e}", row.id))
    })?;
    Ok(Tag {
        id: row.id,
        name: row.name,
        slug,
        usage_count,
    })
}

pub(crate) fn map_profile(row: ProfileRow, widget_count: usize) -> UserProfile {
    UserProfile {
        id: row.id,
        name: row.name,
        avatar_url: row.avatar_url,
        bio: row.bio,
        widget_count,
        joined_at: row.created_at,
    }
}
