//! Dashboard: the signed-in user's own widgets plus summary stats.

use chrono::{DateTime, Utc};

use crate::model::{Widget, WidgetCollection};
use crate::query::{self, WidgetQuery};
use crate::repository::{CatalogRepository, RepositoryError};
use crate::session::Session;

/// Loads the dashboard data set.
#[derive(Clone)]
pub struct DashboardAssembler {
    repository: CatalogRepository,
}

/// Immutable dashboard data: the owner's widgets and the taxonomy size.
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub widgets: WidgetCollection,
    pub category_count: usize,
}

/// Summary stats. These always describe the whole snapshot, never the
/// filtered subset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_widgets: usize,
    pub category_count: usize,
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct DashboardView {
    pub widgets: Vec<Widget>,
    pub stats: DashboardStats,
}

impl DashboardAssembler {
    #[must_use]
    pub const fn new(repository: CatalogRepository) -> Self {
        Self { repository }
    }

    /// Load the viewer's widgets and the category count.
    ///
    /// # Errors
    ///
    /// Returns an error if a repository read fails.
    pub async fn load(&self, session: &Session) -> Result<DashboardSnapshot, RepositoryError> {
        let widgets = self.repository.list_owned(session.user_id()).await?;
        let categories = self.repository.list_categories().await?;
        Ok(DashboardSnapshot {
            widgets,
            category_count: categories.len(),
        })
    }
}

impl DashboardSnapshot {
    /// Render the snapshot through `query`.
    #[must_use]
    pub fn view(&self, query: &WidgetQuery) -> DashboardView {
        DashboardView {
            widgets: query::flat_view(&self.widgets, query),
            stats: DashboardStats {
                total_widgets: self.widgets.len(),
                category_count: self.category_count,
                last_updated: self.widgets.iter().map(|widget| widget.updated_at).max(),
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use uuid::Uuid;
    use widgetvault_core::{UserId, Visibility, WidgetId};

    use super::*;

    fn widget(name: &str, updated_at: &str) -> Widget {
        Widget {
            id: WidgetId::new_random(),
            name: name.to_string(),
            description: String::new(),
            thumbnail_url: None,
            code: "{}".to_string(),
            category_ids: vec![],
            tag_ids: vec![],
            owner: UserId::new(Uuid::nil()),
            visibility: Visibility::Private,
            is_favorite: false,
            created_at: updated_at.parse().unwrap(),
            updated_at: updated_at.parse().unwrap(),
        }
    }

    #[test]
    fn test_stats_ignore_the_active_filter() {
        let snapshot = DashboardSnapshot {
            widgets: WidgetCollection::from(vec![
                widget("Hero Banner", "2026-03-01T00:00:00Z"),
                widget("Footer", "2026-03-05T00:00:00Z"),
            ]),
            category_count: 4,
        };

        let query = WidgetQuery {
            text: "hero".to_string(),
            ..WidgetQuery::default()
        };
        let view = snapshot.view(&query);

        assert_eq!(view.widgets.len(), 1);
        assert_eq!(view.stats.total_widgets, 2);
        assert_eq!(view.stats.category_count, 4);
        assert_eq!(
            view.stats.last_updated,
            Some("2026-03-05T00:00:00Z".parse().unwrap())
        );
    }

    #[test]
    fn test_empty_snapshot_has_no_last_updated() {
        let snapshot = DashboardSnapshot {
            widgets: WidgetCollection::empty(),
            category_count: 0,
        };
        let view = snapshot.view(&WidgetQuery::default());
        assert!(view.stats.last_updated.is_none());
        assert_eq!(view.stats.total_widgets, 0);
    }
}
