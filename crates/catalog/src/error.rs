//! Unified error handling.
//!
//! Provides a unified `CatalogError` type embedding callers can match on,
//! plus a user-facing message mapping so internal details never leak into
//! what gets shown.

use thiserror::Error;

use crate::assets::AssetStoreError;
use crate::config::ConfigError;
use crate::creation::CreationError;
use crate::favorites::FavoriteError;
use crate::repository::RepositoryError;
use crate::session::IdentityError;
use crate::store::StoreError;

/// Application-level error type for the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Configuration loading failed.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Session resolution failed.
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    /// Repository operation failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Widget creation failed.
    #[error("Creation error: {0}")]
    Creation(#[from] CreationError),

    /// Favorite persistence failed.
    #[error("Favorite error: {0}")]
    Favorite(#[from] FavoriteError),

    /// Asset store operation failed.
    #[error("Asset error: {0}")]
    Asset(#[from] AssetStoreError),

    /// Table store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl CatalogError {
    /// Message safe to show the user.
    ///
    /// Creation failures name the step that died; everything else collapses
    /// to a generic retry prompt rather than exposing internals.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Creation(err) => match err {
                CreationError::InvalidInput(message) => message.clone(),
                CreationError::AssetUpload(_) => {
                    "Thumbnail upload failed. Your widget was not created.".to_string()
                }
                CreationError::RecordCreate(_) => {
                    "Could not save the widget. Please try again.".to_string()
                }
                CreationError::Relation { kind, .. } => {
                    format!("Widget saved, but {kind} linking failed.")
                }
            },
            Self::Favorite(_) => "Could not update favorites. Your change was reverted.".to_string(),
            Self::Identity(err) => match err {
                IdentityError::NotSignedIn => "Please sign in to continue.".to_string(),
                IdentityError::Unavailable(_) => {
                    "Could not verify your session. Please try again.".to_string()
                }
            },
            Self::Config(_) | Self::Repository(_) | Self::Asset(_) | Self::Store(_) => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }
}

/// Result type alias for `CatalogError`.
pub type Result<T> = std::result::Result<T, CatalogError>;
