//! In-memory table store.
//!
//! Backs tests and single-process embedding. Emulates the hosted store's
//! observable behavior: server-assigned ids and timestamps, non-empty widget
//! fields, and composite uniqueness on the relation tables. Failures can be
//! scripted per operation and table to exercise partial-failure paths.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use uuid::Uuid;

use super::{Direction, Filter, Order, Row, StoreError, TableStore, tables};

/// Tables with a server-assigned surrogate `id`.
const ID_TABLES: [&str; 4] = [
    tables::WIDGETS,
    tables::CATEGORIES,
    tables::TAGS,
    tables::PROFILES,
];

/// Tables that carry an `updated_at` column.
const UPDATED_AT_TABLES: [&str; 2] = [tables::WIDGETS, tables::PROFILES];

/// A store operation, used to script failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    Insert,
    InsertMany,
    Select,
    Delete,
}

/// In-memory [`TableStore`] with scripted fault injection.
pub struct MemoryTableStore {
    tables: RwLock<HashMap<String, Vec<Row>>>,
    failures: Mutex<Vec<(StoreOp, String)>>,
}

impl MemoryTableStore {
    #[must_use]
    pub fn new() -> Self {
        let tables = tables::ALL
            .iter()
            .map(|name| ((*name).to_string(), Vec::new()))
            .collect();
        Self {
            tables: RwLock::new(tables),
            failures: Mutex::new(Vec::new()),
        }
    }

    /// Script the next matching operation on `table` to fail.
    ///
    /// Each call queues exactly one failure; the failure is consumed by the
    /// first matching operation and subsequent calls succeed again.
    pub fn fail_next(&self, op: StoreOp, table: &str) {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((op, table.to_string()));
    }

    /// Number of rows currently stored in `table`.
    #[must_use]
    pub fn row_count(&self, table: &str) -> usize {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(table)
            .map_or(0, Vec::len)
    }

    fn take_failure(&self, op: StoreOp, table: &str) -> Result<(), StoreError> {
        let mut scripted = self.failures.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(pos) = scripted
            .iter()
            .position(|(scripted_op, scripted_table)| *scripted_op == op && scripted_table == table)
        {
            scripted.remove(pos);
            return Err(StoreError::Unavailable(format!(
                "scripted {op:?} failure on {table}"
            )));
        }
        Ok(())
    }
}

impl Default for MemoryTableStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TableStore for MemoryTableStore {
    async fn insert(&self, table: &str, mut row: Row) -> Result<Row, StoreError> {
        self.take_failure(StoreOp::Insert, table)?;

        let mut guard = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let rows = guard
            .get_mut(table)
            .ok_or_else(|| StoreError::UnknownTable(table.to_string()))?;

        validate(table, &row, rows.iter())?;
        apply_server_fields(table, &mut row);
        rows.push(row.clone());
        Ok(row)
    }

    async fn insert_many(&self, table: &str, incoming: Vec<Row>) -> Result<(), StoreError> {
        self.take_failure(StoreOp::InsertMany, table)?;

        let mut guard = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let rows = guard
            .get_mut(table)
            .ok_or_else(|| StoreError::UnknownTable(table.to_string()))?;

        // Single-statement semantics: validate the whole batch (including
        // intra-batch duplicates) before writing anything.
        let mut staged: Vec<Row> = Vec::with_capacity(incoming.len());
        for mut row in incoming {
            validate(table, &row, rows.iter().chain(staged.iter()))?;
            apply_server_fields(table, &mut row);
            staged.push(row);
        }
        rows.append(&mut staged);
        Ok(())
    }

    async fn select(
        &self,
        table: &str,
        filter: Filter,
        order: Option<Order>,
    ) -> Result<Vec<Row>, StoreError> {
        self.take_failure(StoreOp::Select, table)?;

        let guard = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        let rows = guard
            .get(table)
            .ok_or_else(|| StoreError::UnknownTable(table.to_string()))?;

        let mut matched: Vec<Row> = rows
            .iter()
            .filter(|row| filter.matches(row))
            .cloned()
            .collect();

        if let Some(order) = order {
            matched.sort_by(|a, b| {
                let ordering = compare_cells(a.get(&order.column), b.get(&order.column));
                match order.direction {
                    Direction::Ascending => ordering,
                    Direction::Descending => ordering.reverse(),
                }
            });
        }

        Ok(matched)
    }

    async fn delete(&self, table: &str, filter: Filter) -> Result<(), StoreError> {
        self.take_failure(StoreOp::Delete, table)?;

        if filter.is_empty() {
            return Err(StoreError::UnfilteredDelete {
                table: table.to_string(),
            });
        }

        let mut guard = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let rows = guard
            .get_mut(table)
            .ok_or_else(|| StoreError::UnknownTable(table.to_string()))?;

        rows.retain(|row| !filter.matches(row));
        Ok(())
    }
}

// =============================================================================
// Server-side behavior emulation
// =============================================================================

fn apply_server_fields(table: &str, row: &mut Row) {
    if ID_TABLES.contains(&table) && !row.contains_key("id") {
        row.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
    }
    if !row.contains_key("created_at") {
        row.insert("created_at".to_string(), now_value());
    }
    if UPDATED_AT_TABLES.contains(&table) && !row.contains_key("updated_at") {
        row.insert("updated_at".to_string(), now_value());
    }
}

fn now_value() -> Value {
    Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true))
}

fn validate<'a>(
    table: &str,
    row: &Row,
    existing: impl Iterator<Item = &'a Row>,
) -> Result<(), StoreError> {
    match table {
        tables::WIDGETS => {
            require_text(row, "name")?;
            require_text(row, "code")?;
            require_present(row, "user_id")
        }
        tables::CATEGORIES | tables::TAGS => {
            require_text(row, "name")?;
            require_text(row, "slug")
        }
        tables::PROFILES => require_text(row, "name"),
        tables::FAVORITES => require_unique_pair(table, row, existing, "user_id", "widget_id"),
        tables::WIDGET_CATEGORIES => {
            require_unique_pair(table, row, existing, "widget_id", "category_id")
        }
        tables::WIDGET_TAGS => require_unique_pair(table, row, existing, "widget_id", "tag_id"),
        _ => Ok(()),
    }
}

fn require_present(row: &Row, key: &str) -> Result<(), StoreError> {
    if row.get(key).is_none_or(Value::is_null) {
        return Err(StoreError::Constraint(format!("{key} is required")));
    }
    Ok(())
}

fn require_text(row: &Row, key: &str) -> Result<(), StoreError> {
    match row.get(key).and_then(Value::as_str) {
        Some(text) if !text.trim().is_empty() => Ok(()),
        _ => Err(StoreError::Constraint(format!(
            "{key} must be a non-empty string"
        ))),
    }
}

fn require_unique_pair<'a>(
    table: &str,
    row: &Row,
    mut existing: impl Iterator<Item = &'a Row>,
    first: &str,
    second: &str,
) -> Result<(), StoreError> {
    require_present(row, first)?;
    require_present(row, second)?;

    let duplicate = existing
        .any(|stored| stored.get(first) == row.get(first) && stored.get(second) == row.get(second));
    if duplicate {
        return Err(StoreError::Constraint(format!(
            "duplicate ({first}, {second}) in {table}"
        )));
    }
    Ok(())
}

fn compare_cells(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(left), Some(right)) => compare_values(left, right),
    }
}

/// Compare two cells the way the real store's column types would.
///
/// Timestamp strings must compare chronologically, not lexically; RFC 3339
/// values with differing subsecond precision do not sort correctly as text.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::String(left), Value::String(right)) => {
            match (
                DateTime::parse_from_rfc3339(left),
                DateTime::parse_from_rfc3339(right),
            ) {
                (Ok(left_ts), Ok(right_ts)) => left_ts.cmp(&right_ts),
                _ => left.cmp(right),
            }
        }
        (Value::Number(left), Value::Number(right)) => left
            .as_f64()
            .partial_cmp(&right.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::Bool(left), Value::Bool(right)) => left.cmp(right),
        _ => a.to_string().cmp(&b.to_string()),
    }
}
