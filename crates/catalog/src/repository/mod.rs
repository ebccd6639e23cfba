//! Catalog repository.
//!
//! All reads and writes go through the [`TableStore`] port; this module owns
//! the mapping between stored rows and domain types. Relation tables are
//! joined here, so every [`Widget`] handed out already carries its category,
//! tag, and per-viewer favorite state.

mod rows;

pub(crate) use rows::{NewWidgetRow, map_widget};

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use widgetvault_core::{CategoryId, TagId, UserId, WidgetId};

use crate::model::{Category, Tag, UserProfile, Widget, WidgetCollection};
use crate::store::{Filter, Order, Row, StoreError, TableStore, tables};

use rows::{
    CategoryRow, FavoriteRow, NewFavoriteRow, NewWidgetCategoryRow, NewWidgetTagRow, ProfileRow,
    TagRow, WidgetCategoryRow, WidgetRow, WidgetTagRow,
};

// =============================================================================
// Error Types
// =============================================================================

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("data corruption: {0}")]
    DataCorruption(String),
}

// =============================================================================
// CatalogRepository
// =============================================================================

/// Data access for the widget catalog.
#[derive(Clone)]
pub struct CatalogRepository {
    store: Arc<dyn TableStore>,
}

impl CatalogRepository {
    #[must_use]
    pub const fn new(store: Arc<dyn TableStore>) -> Self {
        Self { store }
    }

    // =========================================================================
    // Widget writes
    // =========================================================================

    pub(crate) async fn create_widget_record(
        &self,
        widget: NewWidgetRow<'_>,
    ) -> Result<WidgetRow, RepositoryError> {
        let row = encode_row(&widget)?;
        let stored = self.store.insert(tables::WIDGETS, row).await?;
        decode_row(stored)
    }

    pub(crate) async fn link_category(
        &self,
        widget_id: WidgetId,
        category_id: CategoryId,
    ) -> Result<(), RepositoryError> {
        let row = encode_row(&NewWidgetCategoryRow {
            widget_id,
            category_id,
        })?;
        self.store.insert(tables::WIDGET_CATEGORIES, row).await?;
        Ok(())
    }

    pub(crate) async fn link_tags(
        &self,
        widget_id: WidgetId,
        tag_ids: &[TagId],
    ) -> Result<(), RepositoryError> {
        if tag_ids.is_empty() {
            return Ok(());
        }
        let rows = tag_ids
            .iter()
            .map(|tag_id| {
                encode_row(&NewWidgetTagRow {
                    widget_id,
                    tag_id: *tag_id,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.store.insert_many(tables::WIDGET_TAGS, rows).await?;
        Ok(())
    }

    // =========================================================================
    // Widget reads
    // =========================================================================

    /// Get a single widget by id, with relations resolved for `viewer`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable or a row fails to decode.
    pub async fn get_widget(
        &self,
        id: WidgetId,
        viewer: UserId,
    ) -> Result<Option<Widget>, RepositoryError> {
        let rows = self
            .store
            .select(tables::WIDGETS, Filter::new().eq("id", id.to_string()), None)
            .await?;
        let Some(row) = rows.into_iter().next() else {
            return Ok(None);
        };
        let widgets = self.hydrate(vec![decode_row(row)?], viewer).await?;
        Ok(widgets.into_iter().next())
    }

    /// All widgets owned by `owner`, newest change first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable or a row fails to decode.
    pub async fn list_owned(&self, owner: UserId) -> Result<WidgetCollection, RepositoryError> {
        let rows = self
            .store
            .select(
                tables::WIDGETS,
                Filter::new().eq("user_id", owner.to_string()),
                Some(Order::descending("updated_at")),
            )
            .await?;
        let widgets = self.hydrate(decode_rows(rows)?, owner).await?;
        Ok(WidgetCollection::new(widgets))
    }

    /// All public widgets, newest change first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable or a row fails to decode.
    pub async fn list_public(&self, viewer: UserId) -> Result<WidgetCollection, RepositoryError> {
        let rows = self
            .store
            .select(
                tables::WIDGETS,
                Filter::new().eq("is_public", true),
                Some(Order::descending("updated_at")),
            )
            .await?;
        let widgets = self.hydrate(decode_rows(rows)?, viewer).await?;
        Ok(WidgetCollection::new(widgets))
    }

    /// Everything `viewer` can see: their own widgets plus public ones,
    /// deduplicated, newest change first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable or a row fails to decode.
    pub async fn list_visible(&self, viewer: UserId) -> Result<WidgetCollection, RepositoryError> {
        let owned = self
            .store
            .select(
                tables::WIDGETS,
                Filter::new().eq("user_id", viewer.to_string()),
                None,
            )
            .await?;
        let public = self
            .store
            .select(tables::WIDGETS, Filter::new().eq("is_public", true), None)
            .await?;

        let mut seen = HashSet::new();
        let mut merged: Vec<WidgetRow> = Vec::with_capacity(owned.len() + public.len());
        for row in decode_rows::<WidgetRow>(owned)?
            .into_iter()
            .chain(decode_rows::<WidgetRow>(public)?)
        {
            if seen.insert(row.id) {
                merged.push(row);
            }
        }
        merged.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        let widgets = self.hydrate(merged, viewer).await?;
        Ok(WidgetCollection::new(widgets))
    }

    /// Widgets `viewer` has favorited, newest change first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable or a row fails to decode.
    pub async fn list_favorites(
        &self,
        viewer: UserId,
    ) -> Result<WidgetCollection, RepositoryError> {
        let favorite_rows = self
            .store
            .select(
                tables::FAVORITES,
                Filter::new().eq("user_id", viewer.to_string()),
                None,
            )
            .await?;
        let favorites: Vec<FavoriteRow> = decode_rows(favorite_rows)?;
        if favorites.is_empty() {
            return Ok(WidgetCollection::empty());
        }

        let ids: Vec<String> = favorites
            .iter()
            .map(|favorite| favorite.widget_id.to_string())
            .collect();
        let rows = self
            .store
            .select(
                tables::WIDGETS,
                Filter::new().is_in("id", ids),
                Some(Order::descending("updated_at")),
            )
            .await?;
        let widgets = self.hydrate(decode_rows(rows)?, viewer).await?;
        Ok(WidgetCollection::new(widgets))
    }

    // =========================================================================
    // Taxonomy
    // =========================================================================

    /// All categories, name order, with usage counts from the relation table.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable or a slug fails to parse.
    pub async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = self
            .store
            .select(
                tables::CATEGORIES,
                Filter::new(),
                Some(Order::ascending("name")),
            )
            .await?;
        let categories: Vec<CategoryRow> = decode_rows(rows)?;

        let link_rows = self
            .store
            .select(tables::WIDGET_CATEGORIES, Filter::new(), None)
            .await?;
        let mut counts: HashMap<CategoryId, usize> = HashMap::new();
        for link in decode_rows::<WidgetCategoryRow>(link_rows)? {
            *counts.entry(link.category_id).or_insert(0) += 1;
        }

        categories
            .into_iter()
            .map(|row| {
                let usage_count = counts.get(&row.id).copied().unwrap_or(0);
                rows::map_category(row, usage_count)
            })
            .collect()
    }

    /// All tags, name order, with usage counts from the relation table.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable or a slug fails to parse.
    pub async fn list_tags(&self) -> Result<Vec<Tag>, RepositoryError> {
        let rows = self
            .store
            .select(tables::TAGS, Filter::new(), Some(Order::ascending("name")))
            .await?;
        let tags: Vec<TagRow> = decode_rows(rows)?;

        let link_rows = self
            .store
            .select(tables::WIDGET_TAGS, Filter::new(), None)
            .await?;
        let mut counts: HashMap<TagId, usize> = HashMap::new();
        for link in decode_rows::<WidgetTagRow>(link_rows)? {
            *counts.entry(link.tag_id).or_insert(0) += 1;
        }

        tags.into_iter()
            .map(|row| {
                let usage_count = counts.get(&row.id).copied().unwrap_or(0);
                rows::map_tag(row, usage_count)
            })
            .collect()
    }

    // =========================================================================
    // Favorites
    // =========================================================================

    /// Record that `user` favorited `widget`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store refuses the row (including duplicates).
    pub async fn add_favorite(
        &self,
        user: UserId,
        widget: WidgetId,
    ) -> Result<(), RepositoryError> {
        let row = encode_row(&NewFavoriteRow {
            user_id: user,
            widget_id: widget,
        })?;
        self.store.insert(tables::FAVORITES, row).await?;
        Ok(())
    }

    /// Remove `user`'s favorite on `widget`. Removing an absent favorite is
    /// not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable.
    pub async fn remove_favorite(
        &self,
        user: UserId,
        widget: WidgetId,
    ) -> Result<(), RepositoryError> {
        self.store
            .delete(
                tables::FAVORITES,
                Filter::new()
                    .eq("user_id", user.to_string())
                    .eq("widget_id", widget.to_string()),
            )
            .await?;
        Ok(())
    }

    // =========================================================================
    // Profiles
    // =========================================================================

    /// Get a single profile by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable or a row fails to decode.
    pub async fn get_profile(&self, id: UserId) -> Result<Option<UserProfile>, RepositoryError> {
        let profiles = self.list_profiles(&[id]).await?;
        Ok(profiles.into_iter().next())
    }

    /// Profiles for `ids`, name order, with owned-widget counts.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable or a row fails to decode.
    pub async fn list_profiles(
        &self,
        ids: &[UserId],
    ) -> Result<Vec<UserProfile>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let id_values: Vec<String> = ids.iter().map(ToString::to_string).collect();

        let rows = self
            .store
            .select(
                tables::PROFILES,
                Filter::new().is_in("id", id_values.clone()),
                Some(Order::ascending("name")),
            )
            .await?;
        let profiles: Vec<ProfileRow> = decode_rows(rows)?;

        let widget_rows = self
            .store
            .select(
                tables::WIDGETS,
                Filter::new().is_in("user_id", id_values),
                None,
            )
            .await?;
        let mut counts: HashMap<UserId, usize> = HashMap::new();
        for row in decode_rows::<WidgetRow>(widget_rows)? {
            *counts.entry(row.user_id).or_insert(0) += 1;
        }

        Ok(profiles
            .into_iter()
            .map(|row| {
                let widget_count = counts.get(&row.id).copied().unwrap_or(0);
                rows::map_profile(row, widget_count)
            })
            .collect())
    }

    // =========================================================================
    // Hydration
    // =========================================================================

    /// Attach relation state to widget rows: one select per relation table,
    /// keyed by the widget ids in `rows`, plus the viewer's favorites.
    async fn hydrate(
        &self,
        rows: Vec<WidgetRow>,
        viewer: UserId,
    ) -> Result<Vec<Widget>, RepositoryError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let widget_ids: Vec<String> = rows.iter().map(|row| row.id.to_string()).collect();

        let category_rows = self
            .store
            .select(
                tables::WIDGET_CATEGORIES,
                Filter::new().is_in("widget_id", widget_ids.clone()),
                None,
            )
            .await?;
        let mut categories: HashMap<WidgetId, Vec<CategoryId>> = HashMap::new();
        for link in decode_rows::<WidgetCategoryRow>(category_rows)? {
            categories
                .entry(link.widget_id)
                .or_default()
                .push(link.category_id);
        }

        let tag_rows = self
            .store
            .select(
                tables::WIDGET_TAGS,
                Filter::new().is_in("widget_id", widget_ids.clone()),
                None,
            )
            .await?;
        let mut tags: HashMap<WidgetId, Vec<TagId>> = HashMap::new();
        for link in decode_rows::<WidgetTagRow>(tag_rows)? {
            tags.entry(link.widget_id).or_default().push(link.tag_id);
        }

        let favorite_rows = self
            .store
            .select(
                tables::FAVORITES,
                Filter::new()
                    .eq("user_id", viewer.to_string())
                    .is_in("widget_id", widget_ids),
                None,
            )
            .await?;
        let favorites: HashSet<WidgetId> = decode_rows::<FavoriteRow>(favorite_rows)?
            .into_iter()
            .map(|row| row.widget_id)
            .collect();

        Ok(rows
            .into_iter()
            .map(|row| {
                let id = row.id;
                map_widget(
                    row,
                    categories.remove(&id).unwrap_or_default(),
                    tags.remove(&id).unwrap_or_default(),
                    favorites.contains(&id),
                )
            })
            .collect())
    }
}

// =============================================================================
// Row Codecs
// =============================================================================

fn encode_row<T: Serialize>(payload: &T) -> Result<Row, RepositoryError> {
    match serde_json::to_value(payload) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(RepositoryError::DataCorruption(
            "insert payload is not a JSON object".to_string(),
        )),
        Err(e) => Err(RepositoryError::DataCorruption(e.to_string())),
    }
}

fn decode_row<T: DeserializeOwned>(row: Row) -> Result<T, RepositoryError> {
    serde_json::from_value(Value::Object(row))
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid row in store: {e}")))
}

fn decode_rows<T: DeserializeOwned>(rows: Vec<Row>) -> Result<Vec<T>, RepositoryError> {
    rows.into_iter().map(decode_row).collect()
}
