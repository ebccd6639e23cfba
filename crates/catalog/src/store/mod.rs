//! Relational store port.
//!
//! The catalog reads and writes rows through this narrow interface; the
//! backing service (a hosted row API in production, an in-memory table map
//! in tests) is an adapter behind the [`TableStore`] trait. Rows travel as
//! JSON objects; the repository layer maps them to typed structs.

mod memory;
mod rest;

pub use memory::{MemoryTableStore, StoreOp};
pub use rest::RestTableStore;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// A stored row as a JSON object.
pub type Row = serde_json::Map<String, Value>;

/// Table names used by the catalog.
pub mod tables {
    pub const WIDGETS: &str = "widgets";
    pub const CATEGORIES: &str = "categories";
    pub const TAGS: &str = "tags";
    pub const WIDGET_CATEGORIES: &str = "widget_categories";
    pub const WIDGET_TAGS: &str = "widget_tags";
    pub const FAVORITES: &str = "favorites";
    pub const PROFILES: &str = "profiles";

    /// Every table the catalog touches.
    pub const ALL: [&str; 7] = [
        WIDGETS,
        CATEGORIES,
        TAGS,
        WIDGET_CATEGORIES,
        WIDGET_TAGS,
        FAVORITES,
        PROFILES,
    ];
}

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store rejected the request.
    #[error("store rejected request ({status}): {message}")]
    Api {
        /// HTTP status code returned by the store.
        status: u16,
        /// Error message extracted from the response body.
        message: String,
    },

    /// Constraint violation (e.g. a duplicate favorite).
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// Response body could not be decoded.
    #[error("response decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The table name is not part of the catalog schema.
    #[error("unknown table: {0}")]
    UnknownTable(String),

    /// A delete with an empty filter was refused.
    #[error("unfiltered delete on {table} refused")]
    UnfilteredDelete {
        /// The table the delete targeted.
        table: String,
    },

    /// The store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// A conjunctive list of row predicates.
///
/// Clauses are ANDed together; an empty filter matches every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<Clause>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Clause {
    Eq { column: String, value: Value },
    In { column: String, values: Vec<Value> },
}

impl Filter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `column` to equal `value`.
    #[must_use]
    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.clauses.push(Clause::Eq {
            column: column.to_string(),
            value: value.into(),
        });
        self
    }

    /// Require `column` to equal one of `values`. An empty list matches
    /// nothing.
    #[must_use]
    pub fn is_in(
        mut self,
        column: &str,
        values: impl IntoIterator<Item = impl Into<Value>>,
    ) -> Self {
        self.clauses.push(Clause::In {
            column: column.to_string(),
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Evaluate the filter against a row.
    #[must_use]
    pub fn matches(&self, row: &Row) -> bool {
        self.clauses.iter().all(|clause| match clause {
            Clause::Eq { column, value } => row.get(column) == Some(value),
            Clause::In { column, values } => {
                row.get(column).is_some_and(|cell| values.contains(cell))
            }
        })
    }

    pub(crate) fn clauses(&self) -> &[Clause] {
        &self.clauses
    }
}

/// Sort direction for a select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Result ordering for a select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub direction: Direction,
}

impl Order {
    #[must_use]
    pub fn ascending(column: &str) -> Self {
        Self {
            column: column.to_string(),
            direction: Direction::Ascending,
        }
    }

    #[must_use]
    pub fn descending(column: &str) -> Self {
        Self {
            column: column.to_string(),
            direction: Direction::Descending,
        }
    }
}

/// Port to the relational store.
///
/// Individual operations are opaque CRUD calls; there is no multi-table
/// transaction primitive. Callers that need all-or-nothing semantics across
/// tables must cope with partial failure themselves (see
/// [`crate::creation::CreationCoordinator`]).
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Insert one row and return it as stored (with server-assigned fields).
    async fn insert(&self, table: &str, row: Row) -> Result<Row, StoreError>;

    /// Insert a batch of rows. The batch is a single statement: either every
    /// row is written or none are.
    async fn insert_many(&self, table: &str, rows: Vec<Row>) -> Result<(), StoreError>;

    /// Select rows matching `filter`, optionally ordered.
    async fn select(
        &self,
        table: &str,
        filter: Filter,
        order: Option<Order>,
    ) -> Result<Vec<Row>, StoreError>;

    /// Delete rows matching `filter`. Deleting zero rows is not an error.
    /// Empty filters are refused.
    async fn delete(&self, table: &str, filter: Filter) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = Filter::new();
        assert!(filter.matches(&row(&[("name", json!("hero"))])));
        assert!(filter.matches(&Row::new()));
    }

    #[test]
    fn test_eq_clause() {
        let filter = Filter::new().eq("name", "hero");
        assert!(filter.matches(&row(&[("name", json!("hero"))])));
        assert!(!filter.matches(&row(&[("name", json!("footer"))])));
        assert!(!filter.matches(&Row::new()));
    }

    #[test]
    fn test_in_clause() {
        let filter = Filter::new().is_in("id", ["a", "b"]);
        assert!(filter.matches(&row(&[("id", json!("a"))])));
        assert!(filter.matches(&row(&[("id", json!("b"))])));
        assert!(!filter.matches(&row(&[("id", json!("c"))])));
    }

    #[test]
    fn test_in_clause_empty_matches_nothing() {
        let filter = Filter::new().is_in("id", Vec::<String>::new());
        assert!(!filter.matches(&row(&[("id", json!("a"))])));
    }

    #[test]
    fn test_clauses_are_conjunctive() {
        let filter = Filter::new().eq("user_id", "u1").eq("widget_id", "w1");
        assert!(filter.matches(&row(&[
            ("user_id", json!("u1")),
            ("widget_id", json!("w1")),
        ])));
        assert!(!filter.matches(&row(&[
            ("user_id", json!("u1")),
            ("widget_id", json!("w2")),
        ])));
    }
}
