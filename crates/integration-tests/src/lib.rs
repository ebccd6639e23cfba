//! Integration tests for WidgetVault.
//!
//! Flows run against the in-memory table and asset store adapters, so the
//! full stack — repository, creation coordinator, favorites service, view
//! assemblers — is exercised without external services.
//!
//! # Test Categories
//!
//! - `creation_flow` - the widget creation sequence and its partial failures
//! - `catalog_views` - assembler load/view behavior per screen
//! - `favorite_toggle` - two-phase favorite toggling

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use widgetvault_catalog::assets::MemoryAssetStore;
use widgetvault_catalog::creation::CreationCoordinator;
use widgetvault_catalog::favorites::FavoritesService;
use widgetvault_catalog::model::UserProfile;
use widgetvault_catalog::repository::CatalogRepository;
use widgetvault_catalog::session::Session;
use widgetvault_catalog::store::{MemoryTableStore, Row, TableStore, tables};
use widgetvault_core::{CategoryId, TagId, UserId, WidgetId};

/// Initialize tracing for a test run. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Everything a flow test needs, wired over the in-memory adapters.
pub struct TestCatalog {
    pub table_store: Arc<MemoryTableStore>,
    pub asset_store: Arc<MemoryAssetStore>,
    pub repository: CatalogRepository,
    pub coordinator: CreationCoordinator,
    pub favorites: FavoritesService,
}

impl TestCatalog {
    #[must_use]
    pub fn new() -> Self {
        let table_store = Arc::new(MemoryTableStore::new());
        let asset_store = Arc::new(MemoryAssetStore::new());
        let repository = CatalogRepository::new(table_store.clone());
        let coordinator = CreationCoordinator::new(repository.clone(), asset_store.clone());
        let favorites = FavoritesService::new(repository.clone());
        Self {
            table_store,
            asset_store,
            repository,
            coordinator,
            favorites,
        }
    }

    /// Create a profile row and return a signed-in session for it.
    pub async fn seed_user(&self, name: &str) -> Session {
        let row = self
            .table_store
            .insert(tables::PROFILES, row_of(&[("name", json!(name))]))
            .await
            .expect("seed profile");
        Session {
            user: UserProfile {
                id: field(&row, "id"),
                name: name.to_string(),
                avatar_url: None,
                bio: None,
                widget_count: 0,
                joined_at: field(&row, "created_at"),
            },
        }
    }

    pub async fn seed_category(&self, name: &str, slug: &str) -> CategoryId {
        let row = self
            .table_store
            .insert(
                tables::CATEGORIES,
                row_of(&[("name", json!(name)), ("slug", json!(slug))]),
            )
            .await
            .expect("seed category");
        field(&row, "id")
    }

    pub async fn seed_tag(&self, name: &str, slug: &str) -> TagId {
        let row = self
            .table_store
            .insert(
                tables::TAGS,
                row_of(&[("name", json!(name)), ("slug", json!(slug))]),
            )
            .await
            .expect("seed tag");
        field(&row, "id")
    }

    pub async fn seed_widget(&self, seed: &SeedWidget) -> WidgetId {
        let row = self
            .table_store
            .insert(
                tables::WIDGETS,
                row_of(&[
                    ("name", json!(seed.name)),
                    ("description", json!(seed.description)),
                    ("code", json!(seed.code)),
                    ("is_public", json!(seed.is_public)),
                    ("user_id", json!(seed.owner)),
                    ("created_at", json!(seed.updated_at.to_rfc3339())),
                    ("updated_at", json!(seed.updated_at.to_rfc3339())),
                ]),
            )
            .await
            .expect("seed widget");
        field(&row, "id")
    }

    pub async fn link_widget_category(&self, widget: WidgetId, category: CategoryId) {
        self.table_store
            .insert(
                tables::WIDGET_CATEGORIES,
                row_of(&[("widget_id", json!(widget)), ("category_id", json!(category))]),
            )
            .await
            .expect("link category");
    }

    pub async fn link_widget_tag(&self, widget: WidgetId, tag: TagId) {
        self.table_store
            .insert(
                tables::WIDGET_TAGS,
                row_of(&[("widget_id", json!(widget)), ("tag_id", json!(tag))]),
            )
            .await
            .expect("link tag");
    }
}

impl Default for TestCatalog {
    fn default() -> Self {
        Self::new()
    }
}

/// A widget row to seed directly into the store, bypassing the creation
/// flow. Defaults: private, empty description, updated now.
pub struct SeedWidget {
    pub owner: UserId,
    pub name: String,
    pub description: String,
    pub code: String,
    pub is_public: bool,
    pub updated_at: DateTime<Utc>,
}

impl SeedWidget {
    #[must_use]
    pub fn new(owner: UserId, name: &str) -> Self {
        Self {
            owner,
            name: name.to_string(),
            description: String::new(),
            code: "{\"kind\":\"section\"}".to_string(),
            is_public: false,
            updated_at: Utc::now(),
        }
    }
}

fn row_of(entries: &[(&str, Value)]) -> Row {
    entries
        .iter()
        .map(|(key, value)| ((*key).to_string(), value.clone()))
        .collect()
}

fn field<T: serde::de::DeserializeOwned>(row: &Row, key: &str) -> T {
    let value = row.get(key).cloned().expect("field present in stored row");
    serde_json::from_value(value).expect("field decodes")
}
