//! Widget visibility.

use serde::{Deserialize, Serialize};

/// Whether a widget is visible to the community or only to its owner.
///
/// Stored as an `is_public` boolean; the enum form keeps match sites
/// exhaustive if more levels (e.g. unlisted) are ever added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Visible to every user in community views.
    Public,
    /// Visible only to the owner.
    #[default]
    Private,
}

impl Visibility {
    /// Returns `true` for [`Visibility::Public`].
    #[must_use]
    pub const fn is_public(self) -> bool {
        matches!(self, Self::Public)
    }

    /// Converts the stored `is_public` flag into a `Visibility`.
    #[must_use]
    pub const fn from_public_flag(is_public: bool) -> Self {
        if is_public { Self::Public } else { Self::Private }
    }
}
