//! Widget domain types and immutable collection snapshots.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use widgetvault_core::{CategoryId, TagId, UserId, Visibility, WidgetId};

/// A catalogued widget (domain type).
///
/// The `is_favorite` flag is relative to the user the snapshot was loaded
/// for; it comes from the favorites join, not from the widget record itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Widget {
    /// Unique widget ID, assigned by the store on creation.
    pub id: WidgetId,
    /// Display name. Never empty.
    pub name: String,
    /// Free-form description. May be empty.
    pub description: String,
    /// Public URL of the uploaded thumbnail, if one exists.
    pub thumbnail_url: Option<String>,
    /// The widget's code payload, treated as an opaque blob.
    pub code: String,
    /// Categories this widget is linked to.
    pub category_ids: Vec<CategoryId>,
    /// Tags this widget is linked to.
    pub tag_ids: Vec<TagId>,
    /// The user who created the widget. Never changes.
    pub owner: UserId,
    /// Whether the widget appears in community views.
    pub visibility: Visibility,
    /// Whether the loading user has favorited this widget.
    pub is_favorite: bool,
    /// When the widget was created.
    pub created_at: DateTime<Utc>,
    /// When the widget was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new widget.
#[derive(Debug, Clone)]
pub struct NewWidget {
    /// Display name. Must be non-empty after trimming.
    pub name: String,
    /// Free-form description. May be empty.
    pub description: String,
    /// Optional thumbnail to upload before the record is created.
    pub thumbnail: Option<ThumbnailUpload>,
    /// The widget's code payload. Must be non-empty after trimming.
    pub code: String,
    /// Whether the widget appears in community views.
    pub visibility: Visibility,
    /// Category to link the widget to.
    pub category_id: Option<CategoryId>,
    /// Tags to link the widget to.
    pub tag_ids: Vec<TagId>,
}

/// An in-memory thumbnail file pending upload.
#[derive(Clone)]
pub struct ThumbnailUpload {
    /// Original file name; only the extension is kept for the stored path.
    pub file_name: String,
    /// MIME type forwarded to the asset store.
    pub content_type: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ThumbnailUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThumbnailUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("bytes", &format_args!("{} bytes", self.bytes.len()))
            .finish()
    }
}

/// An immutable snapshot of widgets handed to the query engine.
///
/// Mutations (`with_favorite`) produce a new snapshot instead of mutating
/// in place, so a snapshot already handed to a view can never tear.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetCollection {
    widgets: Arc<[Widget]>,
}

impl WidgetCollection {
    /// Create a snapshot from a list of widgets.
    #[must_use]
    pub fn new(widgets: Vec<Widget>) -> Self {
        Self {
            widgets: widgets.into(),
        }
    }

    /// Empty snapshot.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Widget] {
        &self.widgets
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Widget> {
        self.widgets.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Find a widget by ID.
    #[must_use]
    pub fn get(&self, id: WidgetId) -> Option<&Widget> {
        self.widgets.iter().find(|w| w.id == id)
    }

    /// Returns a new snapshot with one widget's favorite flag changed.
    ///
    /// The widget's `updated_at` is untouched; favoriting is a join-table
    /// concern, not a widget mutation. Unknown IDs return an unchanged copy.
    #[must_use]
    pub fn with_favorite(&self, id: WidgetId, favorite: bool) -> Self {
        self.widgets
            .iter()
            .cloned()
            .map(|mut widget| {
                if widget.id == id {
                    widget.is_favorite = favorite;
                }
                widget
            })
            .collect()
    }
}

impl Default for WidgetCollection {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Vec<Widget>> for WidgetCollection {
    fn from(widgets: Vec<Widget>) -> Self {
        Self::new(widgets)
    }
}

impl FromIterator<Widget> for WidgetCollection {
    fn from_iter<I: IntoIterator<Item = Widget>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a WidgetCollection {
    type Item = &'a Widget;
    type IntoIter = std::slice::Iter<'a, Widget>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
