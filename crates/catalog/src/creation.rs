//! Widget creation flow.
//!
//! Creation is a multi-step sequence without rollback: validate, upload the
//! thumbnail, insert the widget row, link the category, link the tags. The
//! first failure aborts the remaining steps and completed steps stay in
//! place, so a failed run can leave an unreferenced thumbnail or a widget
//! missing its relations. The error variant tells callers which step died.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, instrument};
use uuid::Uuid;
use widgetvault_core::UserId;

use crate::assets::{AssetRef, AssetStore, AssetStoreError};
use crate::model::{NewWidget, ThumbnailUpload, Widget};
use crate::repository::{CatalogRepository, NewWidgetRow, RepositoryError, map_widget};

// =============================================================================
// Error Types
// =============================================================================

/// Which relation table a failed link step was writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    Category,
    Tag,
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Category => write!(f, "category"),
            Self::Tag => write!(f, "tag"),
        }
    }
}

#[derive(Debug, Error)]
pub enum CreationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("thumbnail upload failed: {0}")]
    AssetUpload(#[from] AssetStoreError),

    #[error("widget record creation failed: {0}")]
    RecordCreate(#[source] RepositoryError),

    #[error("{kind} linking failed after widget creation: {source}")]
    Relation {
        kind: RelationKind,
        #[source]
        source: RepositoryError,
    },
}

// =============================================================================
// CreationCoordinator
// =============================================================================

/// Runs the widget creation sequence against the repository and asset store.
#[derive(Clone)]
pub struct CreationCoordinator {
    repository: CatalogRepository,
    assets: Arc<dyn AssetStore>,
}

impl CreationCoordinator {
    #[must_use]
    pub const fn new(repository: CatalogRepository, assets: Arc<dyn AssetStore>) -> Self {
        Self { repository, assets }
    }

    /// Create a widget for `owner` and return it in canonical form.
    ///
    /// Steps run in order: validate, upload thumbnail, insert record, link
    /// category, link tags. Validation failures happen before anything is
    /// written; later failures leave earlier steps' writes in place.
    ///
    /// # Errors
    ///
    /// Returns [`CreationError::InvalidInput`] for an empty name or code,
    /// and a step-specific variant for the first step that fails.
    #[instrument(skip(self, input), fields(owner = %owner, name = %input.name))]
    pub async fn create_widget(
        &self,
        input: NewWidget,
        owner: UserId,
    ) -> Result<Widget, CreationError> {
        let NewWidget {
            name,
            description,
            thumbnail,
            code,
            visibility,
            category_id,
            tag_ids,
        } = input;

        validate(&name, &code)?;

        let thumbnail_ref = match thumbnail {
            Some(upload) => Some(self.upload_thumbnail(upload).await?),
            None => None,
        };

        let row = self
            .repository
            .create_widget_record(NewWidgetRow {
                name: &name,
                description: if description.is_empty() {
                    None
                } else {
                    Some(&description)
                },
                thumbnail_url: thumbnail_ref.as_ref().map(|asset| asset.public_url.as_str()),
                code: &code,
                is_public: visibility.is_public(),
                user_id: owner,
            })
            .await
            .map_err(CreationError::RecordCreate)?;
        info!(widget_id = %row.id, "Created widget record");

        if let Some(category_id) = category_id {
            self.repository
                .link_category(row.id, category_id)
                .await
                .map_err(|source| CreationError::Relation {
                    kind: RelationKind::Category,
                    source,
                })?;
        }

        if !tag_ids.is_empty() {
            self.repository
                .link_tags(row.id, &tag_ids)
                .await
                .map_err(|source| CreationError::Relation {
                    kind: RelationKind::Tag,
                    source,
                })?;
        }

        Ok(map_widget(
            row,
            category_id.into_iter().collect(),
            tag_ids,
            false,
        ))
    }

    async fn upload_thumbnail(&self, upload: ThumbnailUpload) -> Result<AssetRef, CreationError> {
        let path = thumbnail_path(&upload.file_name);
        let asset = self
            .assets
            .upload(&path, upload.bytes, &upload.content_type)
            .await?;
        info!(path = %asset.path, "Uploaded widget thumbnail");
        Ok(asset)
    }
}

// =============================================================================
// Input handling
// =============================================================================

fn validate(name: &str, code: &str) -> Result<(), CreationError> {
    if name.trim().is_empty() {
        return Err(CreationError::InvalidInput(
            "widget name cannot be empty".to_string(),
        ));
    }
    if code.trim().is_empty() {
        return Err(CreationError::InvalidInput(
            "widget code cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Bucket path for a new thumbnail: a fresh id plus a sanitized extension,
/// so stored names never echo user input.
fn thumbnail_path(file_name: &str) -> String {
    format!(
        "thumbnails/{}.{}",
        Uuid::new_v4(),
        sanitized_extension(file_name)
    )
}

fn sanitized_extension(file_name: &str) -> String {
    let extension = file_name
        .rsplit_once('.')
        .map_or("", |(stem, extension)| {
            if stem.is_empty() { "" } else { extension }
        });
    let cleaned: String = extension
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(16)
        .collect::<String>()
        .to_lowercase();
    if cleaned.is_empty() {
        "bin".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitized_extension_lowercases() {
        assert_eq!(sanitized_extension("photo.PNG"), "png");
    }

    #[test]
    fn test_sanitized_extension_takes_last_segment() {
        assert_eq!(sanitized_extension("archive.tar.gz"), "gz");
    }

    #[test]
    fn test_sanitized_extension_falls_back_to_bin() {
        assert_eq!(sanitized_extension("noext"), "bin");
        assert_eq!(sanitized_extension(".hidden"), "bin");
        assert_eq!(sanitized_extension("trailing."), "bin");
    }

    #[test]
    fn test_sanitized_extension_strips_non_alphanumerics() {
        assert_eq!(sanitized_extension("a.b!c"), "bc");
    }

    #[test]
    fn test_thumbnail_path_shape() {
        let path = thumbnail_path("photo.png");
        let rest = path.strip_prefix("thumbnails/").unwrap();
        let (id, extension) = rest.rsplit_once('.').unwrap();
        assert_eq!(extension, "png");
        assert!(id.parse::<Uuid>().is_ok());
    }

    #[test]
    fn test_thumbnail_paths_are_unique_per_upload() {
        assert_ne!(thumbnail_path("a.png"), thumbnail_path("a.png"));
    }

    #[test]
    fn test_validate_rejects_blank_name_and_code() {
        assert!(matches!(
            validate("  ", "{}"),
            Err(CreationError::InvalidInput(message)) if message.contains("name")
        ));
        assert!(matches!(
            validate("Hero", "\n"),
            Err(CreationError::InvalidInput(message)) if message.contains("code")
        ));
        assert!(validate("Hero", "{}").is_ok());
    }
}
