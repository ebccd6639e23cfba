//! Favorites: everything the viewer has starred.

use crate::model::{Widget, WidgetCollection};
use crate::query::{self, WidgetQuery};
use crate::repository::{CatalogRepository, RepositoryError};
use crate::session::Session;

/// Loads the favorites data set.
#[derive(Clone)]
pub struct FavoritesAssembler {
    repository: CatalogRepository,
}

impl FavoritesAssembler {
    #[must_use]
    pub const fn new(repository: CatalogRepository) -> Self {
        Self { repository }
    }

    /// Load the viewer's favorited widgets.
    ///
    /// A widget unfavorited through the toggle service drops out on the next
    /// load; the snapshot itself is never mutated.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository read fails.
    pub async fn load(&self, session: &Session) -> Result<WidgetCollection, RepositoryError> {
        self.repository.list_favorites(session.user_id()).await
    }
}

/// Render a favorites snapshot through `query`.
#[must_use]
pub fn view(snapshot: &WidgetCollection, query: &WidgetQuery) -> Vec<Widget> {
    query::flat_view(snapshot, query)
}
