//! Category and tag domain types.
//!
//! Both are flat, globally shared labels. The usage counts are recomputed
//! from the relation tables on every read; stored counters are never trusted.

use widgetvault_core::{CategoryId, Slug, TagId};

/// A widget category. Widgets carry zero or one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: Slug,
    /// Number of widgets linked to this category, derived at read time.
    pub usage_count: usize,
}

/// A widget tag. Widgets carry zero or more tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    pub slug: Slug,
    /// Number of widgets linked to this tag, derived at read time.
    pub usage_count: usize,
}
