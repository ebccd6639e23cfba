//! Optimistic favorite toggling.
//!
//! A toggle runs in two phases: the snapshot flips immediately, then the
//! write follows. If the write fails the flip is reverted and exactly one
//! reversion notice is emitted, so the caller never keeps showing a state
//! the store refused.

use thiserror::Error;
use tracing::warn;
use widgetvault_core::WidgetId;

use crate::model::WidgetCollection;
use crate::repository::{CatalogRepository, RepositoryError};
use crate::session::Session;

// =============================================================================
// Transition state
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TogglePhase {
    /// Snapshot flipped, write not yet attempted.
    Pending,
    /// Write accepted; the flipped state is durable.
    Committed,
    /// Write refused; the flip was undone.
    RolledBack,
}

/// One favorite flip: the widget touched, the value the snapshot now shows,
/// and where the write stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FavoriteTransition {
    pub widget_id: WidgetId,
    pub favorite: bool,
    pub phase: TogglePhase,
}

/// User-facing notices produced by a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    FavoriteSaved { widget_id: WidgetId, favorite: bool },
    FavoriteReverted { widget_id: WidgetId },
}

impl Notice {
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::FavoriteSaved { favorite: true, .. } => "Added to favorites",
            Self::FavoriteSaved {
                favorite: false, ..
            } => "Removed from favorites",
            Self::FavoriteReverted { .. } => "Could not update favorites, change reverted",
        }
    }
}

#[derive(Debug, Error)]
pub enum FavoriteError {
    #[error("favorite persistence failed: {0}")]
    Persist(#[from] RepositoryError),
}

/// Result of a full toggle: the snapshot to adopt, the final transition, and
/// the notices to present.
#[derive(Debug)]
pub struct ToggleOutcome {
    pub snapshot: WidgetCollection,
    pub transition: FavoriteTransition,
    pub notices: Vec<Notice>,
}

// =============================================================================
// Phase steps
// =============================================================================

/// Flip `widget_id` in the snapshot, yielding the new snapshot and a
/// `Pending` transition. Returns `None` when the widget is not in the
/// snapshot.
#[must_use]
pub fn apply_toggle(
    snapshot: &WidgetCollection,
    widget_id: WidgetId,
) -> Option<(WidgetCollection, FavoriteTransition)> {
    let widget = snapshot.get(widget_id)?;
    let favorite = !widget.is_favorite;
    let flipped = snapshot.with_favorite(widget_id, favorite);
    Some((
        flipped,
        FavoriteTransition {
            widget_id,
            favorite,
            phase: TogglePhase::Pending,
        },
    ))
}

/// Undo a pending flip, yielding the restored snapshot, a `RolledBack`
/// transition, and the reversion notice.
#[must_use]
pub fn revert_toggle(
    snapshot: &WidgetCollection,
    transition: &FavoriteTransition,
) -> (WidgetCollection, FavoriteTransition, Notice) {
    let restored = snapshot.with_favorite(transition.widget_id, !transition.favorite);
    (
        restored,
        FavoriteTransition {
            widget_id: transition.widget_id,
            favorite: !transition.favorite,
            phase: TogglePhase::RolledBack,
        },
        Notice::FavoriteReverted {
            widget_id: transition.widget_id,
        },
    )
}

// =============================================================================
// FavoritesService
// =============================================================================

/// Drives the two-phase toggle against the repository.
#[derive(Clone)]
pub struct FavoritesService {
    repository: CatalogRepository,
}

impl FavoritesService {
    #[must_use]
    pub const fn new(repository: CatalogRepository) -> Self {
        Self { repository }
    }

    /// Write a pending transition to the store.
    ///
    /// # Errors
    ///
    /// Returns [`FavoriteError::Persist`] if the repository write fails.
    pub async fn persist(
        &self,
        session: &Session,
        transition: &FavoriteTransition,
    ) -> Result<(), FavoriteError> {
        if transition.favorite {
            self.repository
                .add_favorite(session.user_id(), transition.widget_id)
                .await?;
        } else {
            self.repository
                .remove_favorite(session.user_id(), transition.widget_id)
                .await?;
        }
        Ok(())
    }

    /// Run the full toggle sequence for `widget_id`.
    ///
    /// The returned outcome carries the snapshot to adopt either way: the
    /// flipped one when the write committed, the restored one when it was
    /// rolled back. Returns `None` when the widget is not in the snapshot.
    pub async fn toggle(
        &self,
        session: &Session,
        snapshot: &WidgetCollection,
        widget_id: WidgetId,
    ) -> Option<ToggleOutcome> {
        let (flipped, pending) = apply_toggle(snapshot, widget_id)?;

        match self.persist(session, &pending).await {
            Ok(()) => Some(ToggleOutcome {
                snapshot: flipped,
                transition: FavoriteTransition {
                    phase: TogglePhase::Committed,
                    ..pending
                },
                notices: vec![Notice::FavoriteSaved {
                    widget_id,
                    favorite: pending.favorite,
                }],
            }),
            Err(error) => {
                warn!(widget_id = %widget_id, error = %error, "Favorite write failed, reverting");
                let (restored, rolled_back, notice) = revert_toggle(&flipped, &pending);
                Some(ToggleOutcome {
                    snapshot: restored,
                    transition: rolled_back,
                    notices: vec![notice],
                })
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;
    use widgetvault_core::{UserId, Visibility};

    use crate::model::Widget;

    use super::*;

    fn widget(favorite: bool) -> Widget {
        Widget {
            id: WidgetId::new_random(),
            name: "Hero".to_string(),
            description: String::new(),
            thumbnail_url: None,
            code: "{}".to_string(),
            category_ids: vec![],
            tag_ids: vec![],
            owner: UserId::new(Uuid::nil()),
            visibility: Visibility::Private,
            is_favorite: favorite,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_apply_toggle_flips_and_reports_pending() {
        let target = widget(false);
        let id = target.id;
        let snapshot = WidgetCollection::from(vec![target]);

        let (flipped, transition) = apply_toggle(&snapshot, id).unwrap();
        assert!(flipped.get(id).unwrap().is_favorite);
        assert_eq!(transition.phase, TogglePhase::Pending);
        assert!(transition.favorite);
    }

    #[test]
    fn test_apply_toggle_unknown_widget_returns_none() {
        let snapshot = WidgetCollection::from(vec![widget(false)]);
        assert!(apply_toggle(&snapshot, WidgetId::new_random()).is_none());
    }

    #[test]
    fn test_revert_restores_original_state() {
        let target = widget(true);
        let id = target.id;
        let snapshot = WidgetCollection::from(vec![target]);

        let (flipped, pending) = apply_toggle(&snapshot, id).unwrap();
        let (restored, rolled_back, notice) = revert_toggle(&flipped, &pending);

        assert!(restored.get(id).unwrap().is_favorite);
        assert_eq!(rolled_back.phase, TogglePhase::RolledBack);
        assert_eq!(notice, Notice::FavoriteReverted { widget_id: id });
    }

    #[test]
    fn test_notice_messages() {
        let id = WidgetId::new_random();
        assert_eq!(
            Notice::FavoriteSaved {
                widget_id: id,
                favorite: true
            }
            .message(),
            "Added to favorites"
        );
        assert_eq!(
            Notice::FavoriteSaved {
                widget_id: id,
                favorite: false
            }
            .message(),
            "Removed from favorites"
        );
        assert_eq!(
            Notice::FavoriteReverted { widget_id: id }.message(),
            "Could not update favorites, change reverted"
        );
    }
}
