//! Community: public widgets plus the people who published them.

use std::collections::HashSet;

use widgetvault_core::UserId;

use crate::model::{UserProfile, Widget, WidgetCollection};
use crate::query::{self, WidgetQuery};
use crate::repository::{CatalogRepository, RepositoryError};
use crate::session::Session;

/// Loads the community data set.
#[derive(Clone)]
pub struct CommunityAssembler {
    repository: CatalogRepository,
}

/// Immutable community data: public widgets and their authors' profiles,
/// name order.
#[derive(Debug, Clone)]
pub struct CommunitySnapshot {
    pub widgets: WidgetCollection,
    pub contributors: Vec<UserProfile>,
}

impl CommunityAssembler {
    #[must_use]
    pub const fn new(repository: CatalogRepository) -> Self {
        Self { repository }
    }

    /// Load public widgets and the distinct contributor profiles.
    ///
    /// # Errors
    ///
    /// Returns an error if a repository read fails.
    pub async fn load(&self, session: &Session) -> Result<CommunitySnapshot, RepositoryError> {
        let widgets = self.repository.list_public(session.user_id()).await?;

        let owners: HashSet<UserId> = widgets.iter().map(|widget| widget.owner).collect();
        let owner_ids: Vec<UserId> = owners.into_iter().collect();
        let contributors = self.repository.list_profiles(&owner_ids).await?;

        Ok(CommunitySnapshot {
            widgets,
            contributors,
        })
    }
}

impl CommunitySnapshot {
    /// Render the snapshot, optionally narrowed to a single author.
    #[must_use]
    pub fn view(&self, query: &WidgetQuery, author: Option<UserId>) -> Vec<Widget> {
        match author {
            Some(author) => {
                let scoped: Vec<Widget> = self
                    .widgets
                    .iter()
                    .filter(|widget| widget.owner == author)
                    .cloned()
                    .collect();
                query::flat_view(&WidgetCollection::from(scoped), query)
            }
            None => query::flat_view(&self.widgets, query),
        }
    }
}
