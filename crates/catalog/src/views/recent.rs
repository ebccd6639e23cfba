//! Recent: the newest widgets from a chosen source, grouped by recency.

use chrono::{DateTime, Utc};

use crate::model::WidgetCollection;
use crate::query::{self, RecencyGroup, WidgetQuery};
use crate::repository::{CatalogRepository, RepositoryError};
use crate::session::Session;

/// Where the recent list draws from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecentSource {
    /// Only the viewer's own widgets.
    #[default]
    OwnedOnly,
    /// The viewer's widgets plus everyone's public ones.
    AllVisible,
}

/// Loads the recent data set.
#[derive(Clone)]
pub struct RecentAssembler {
    repository: CatalogRepository,
    source: RecentSource,
    cap: usize,
}

/// The capped snapshot. The cap applies at load time, before any query: a
/// filter can only narrow the capped list, never pull older widgets back in.
#[derive(Debug, Clone)]
pub struct RecentSnapshot {
    pub widgets: WidgetCollection,
}

impl RecentAssembler {
    pub const DEFAULT_CAP: usize = 10;

    #[must_use]
    pub const fn new(repository: CatalogRepository, source: RecentSource) -> Self {
        Self {
            repository,
            source,
            cap: Self::DEFAULT_CAP,
        }
    }

    #[must_use]
    pub const fn with_cap(
        repository: CatalogRepository,
        source: RecentSource,
        cap: usize,
    ) -> Self {
        Self {
            repository,
            source,
            cap,
        }
    }

    /// Load the most recently updated widgets from the source.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository read fails.
    pub async fn load(&self, session: &Session) -> Result<RecentSnapshot, RepositoryError> {
        let all = match self.source {
            RecentSource::OwnedOnly => self.repository.list_owned(session.user_id()).await?,
            RecentSource::AllVisible => self.repository.list_visible(session.user_id()).await?,
        };
        Ok(RecentSnapshot {
            widgets: query::most_recent(&all, self.cap),
        })
    }
}

impl RecentSnapshot {
    /// Render the snapshot grouped by recency bucket.
    #[must_use]
    pub fn view(&self, query: &WidgetQuery, now: DateTime<Utc>) -> Vec<RecencyGroup> {
        query::grouped_view(&self.widgets, query, now)
    }
}
