//! Query pipeline for widget collections.
//!
//! Filtering, ordering, and grouping are pure functions over an in-memory
//! snapshot; nothing here touches the store. The canonical ordering
//! everywhere is most recently updated first, with ties keeping their
//! snapshot order.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use widgetvault_core::{CategoryId, TagId};

use crate::model::{Widget, WidgetCollection};

// =============================================================================
// Query and view types
// =============================================================================

/// Filter state for a catalog view.
///
/// Text matches name or description, case-insensitively. Within the category
/// and tag axes any selected id matches; across axes all must match. Empty
/// axes pass everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WidgetQuery {
    pub text: String,
    pub categories: HashSet<CategoryId>,
    pub tags: HashSet<TagId>,
}

impl WidgetQuery {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty() && self.categories.is_empty() && self.tags.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Flat,
    ByRecency,
}

/// Recency buckets, newest first. Grouping renders them in this order and
/// omits empty buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecencyBucket {
    Today,
    Yesterday,
    ThisWeek,
    Earlier,
}

impl RecencyBucket {
    pub const ALL: [Self; 4] = [Self::Today, Self::Yesterday, Self::ThisWeek, Self::Earlier];

    /// Bucket for a widget last touched at `updated_at`, as seen at `now`.
    ///
    /// Today and Yesterday are calendar dates in UTC; This Week is a rolling
    /// seven-day window behind them (strictly newer than `now - 7 days`).
    #[must_use]
    pub fn classify(updated_at: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let today = now.date_naive();
        let date = updated_at.date_naive();
        if date == today {
            return Self::Today;
        }
        if Some(date) == today.pred_opt() {
            return Self::Yesterday;
        }
        if updated_at > now - Duration::days(7) {
            return Self::ThisWeek;
        }
        Self::Earlier
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Today => "Today",
            Self::Yesterday => "Yesterday",
            Self::ThisWeek => "This Week",
            Self::Earlier => "Earlier",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecencyGroup {
    pub bucket: RecencyBucket,
    pub widgets: Vec<Widget>,
}

/// A rendered catalog view.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogView {
    Flat(Vec<Widget>),
    Grouped(Vec<RecencyGroup>),
}

impl CatalogView {
    #[must_use]
    pub fn widget_count(&self) -> usize {
        match self {
            Self::Flat(widgets) => widgets.len(),
            Self::Grouped(groups) => groups.iter().map(|group| group.widgets.len()).sum(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.widget_count() == 0
    }
}

// =============================================================================
// Pipeline
// =============================================================================

/// Render `widgets` through `query` in the requested mode.
#[must_use]
pub fn view(
    widgets: &WidgetCollection,
    query: &WidgetQuery,
    mode: ViewMode,
    now: DateTime<Utc>,
) -> CatalogView {
    match mode {
        ViewMode::Flat => CatalogView::Flat(flat_view(widgets, query)),
        ViewMode::ByRecency => CatalogView::Grouped(grouped_view(widgets, query, now)),
    }
}

/// Filtered widgets in canonical order.
#[must_use]
pub fn flat_view(widgets: &WidgetCollection, query: &WidgetQuery) -> Vec<Widget> {
    let mut matched = filter_widgets(widgets.as_slice(), query);
    matched.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    matched
}

/// Filtered widgets grouped by recency bucket, empty buckets omitted.
#[must_use]
pub fn grouped_view(
    widgets: &WidgetCollection,
    query: &WidgetQuery,
    now: DateTime<Utc>,
) -> Vec<RecencyGroup> {
    let mut today = Vec::new();
    let mut yesterday = Vec::new();
    let mut this_week = Vec::new();
    let mut earlier = Vec::new();
    for widget in flat_view(widgets, query) {
        match RecencyBucket::classify(widget.updated_at, now) {
            RecencyBucket::Today => today.push(widget),
            RecencyBucket::Yesterday => yesterday.push(widget),
            RecencyBucket::ThisWeek => this_week.push(widget),
            RecencyBucket::Earlier => earlier.push(widget),
        }
    }

    [
        (RecencyBucket::Today, today),
        (RecencyBucket::Yesterday, yesterday),
        (RecencyBucket::ThisWeek, this_week),
        (RecencyBucket::Earlier, earlier),
    ]
    .into_iter()
    .filter(|(_, bucketed)| !bucketed.is_empty())
    .map(|(bucket, bucketed)| RecencyGroup {
        bucket,
        widgets: bucketed,
    })
    .collect()
}

/// Widgets matching `query`, in snapshot order.
#[must_use]
pub fn filter_widgets(widgets: &[Widget], query: &WidgetQuery) -> Vec<Widget> {
    let needle = normalized_needle(&query.text);
    widgets
        .iter()
        .filter(|widget| matches_query(widget, needle.as_deref(), query))
        .cloned()
        .collect()
}

/// The `cap` most recently updated widgets as a new snapshot.
#[must_use]
pub fn most_recent(widgets: &WidgetCollection, cap: usize) -> WidgetCollection {
    let mut all: Vec<Widget> = widgets.as_slice().to_vec();
    all.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    all.truncate(cap);
    WidgetCollection::new(all)
}

fn normalized_needle(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

fn matches_query(widget: &Widget, needle: Option<&str>, query: &WidgetQuery) -> bool {
    if let Some(needle) = needle
        && !widget.name.to_lowercase().contains(needle)
        && !widget.description.to_lowercase().contains(needle)
    {
        return false;
    }
    if !query.categories.is_empty()
        && !widget
            .category_ids
            .iter()
            .any(|id| query.categories.contains(id))
    {
        return false;
    }
    if !query.tags.is_empty() && !widget.tag_ids.iter().any(|id| query.tags.contains(id)) {
        return false;
    }
    true
}
