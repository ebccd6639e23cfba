//! REST table store.
//!
//! Speaks the hosted store's row protocol: tables are addressed as
//! `{base}/{table}`, predicates ride in the query string (`column=eq.value`,
//! `column=in.(a,b)`), and inserts return the stored representation when
//! asked for via the `Prefer` header. Taxonomy reads are cached for 5 minutes.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use secrecy::ExposeSecret;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::config::StoreConfig;

use super::{Clause, Direction, Filter, Order, Row, StoreError, TableStore, tables};

// =============================================================================
// RestTableStore
// =============================================================================

/// Client for the hosted row store.
#[derive(Clone)]
pub struct RestTableStore {
    inner: Arc<RestTableStoreInner>,
}

struct RestTableStoreInner {
    client: reqwest::Client,
    base: String,
    service_key: String,
    cache: Cache<String, Vec<Row>>,
}

impl RestTableStore {
    /// Create a new store client.
    #[must_use]
    pub fn new(config: &StoreConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(64)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(RestTableStoreInner {
                client: reqwest::Client::new(),
                base: config.base_url.as_str().trim_end_matches('/').to_string(),
                service_key: config.service_key.expose_secret().to_string(),
                cache,
            }),
        }
    }

    fn request(&self, method: reqwest::Method, table: &str) -> reqwest::RequestBuilder {
        self.inner
            .client
            .request(method, format!("{}/{table}", self.inner.base))
            .header("apikey", &self.inner.service_key)
            .bearer_auth(&self.inner.service_key)
    }

    fn invalidate_cached(&self, table: &str) {
        if table == tables::CATEGORIES || table == tables::TAGS {
            self.inner.cache.invalidate_all();
        }
    }
}

#[async_trait]
impl TableStore for RestTableStore {
    #[instrument(skip(self, row), fields(table = %table))]
    async fn insert(&self, table: &str, row: Row) -> Result<Row, StoreError> {
        let response = self
            .request(reqwest::Method::POST, table)
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(api_error(status, &text));
        }

        let stored: Vec<Row> = serde_json::from_str(&text)?;
        self.invalidate_cached(table);
        stored.into_iter().next().ok_or_else(|| StoreError::Api {
            status: status.as_u16(),
            message: "insert returned no representation".to_string(),
        })
    }

    #[instrument(skip(self, rows), fields(table = %table, count = rows.len()))]
    async fn insert_many(&self, table: &str, rows: Vec<Row>) -> Result<(), StoreError> {
        if rows.is_empty() {
            return Ok(());
        }

        let response = self
            .request(reqwest::Method::POST, table)
            .header("Prefer", "return=minimal")
            .json(&rows)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(api_error(status, &text));
        }
        self.invalidate_cached(table);
        Ok(())
    }

    #[instrument(skip(self, filter, order), fields(table = %table))]
    async fn select(
        &self,
        table: &str,
        filter: Filter,
        order: Option<Order>,
    ) -> Result<Vec<Row>, StoreError> {
        let cache_key = cacheable_key(table, &filter, order.as_ref());
        if let Some(key) = &cache_key
            && let Some(rows) = self.inner.cache.get(key).await
        {
            debug!("Cache hit for taxonomy select");
            return Ok(rows);
        }

        let mut pairs = filter_pairs(&filter);
        if let Some(order) = &order {
            pairs.push(order_pair(order));
        }

        let response = self
            .request(reqwest::Method::GET, table)
            .query(&pairs)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(api_error(status, &text));
        }

        let rows: Vec<Row> = serde_json::from_str(&text)?;
        if let Some(key) = cache_key {
            self.inner.cache.insert(key, rows.clone()).await;
        }
        Ok(rows)
    }

    #[instrument(skip(self, filter), fields(table = %table))]
    async fn delete(&self, table: &str, filter: Filter) -> Result<(), StoreError> {
        if filter.is_empty() {
            return Err(StoreError::UnfilteredDelete {
                table: table.to_string(),
            });
        }

        let response = self
            .request(reqwest::Method::DELETE, table)
            .query(&filter_pairs(&filter))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(api_error(status, &text));
        }
        self.invalidate_cached(table);
        Ok(())
    }
}

// =============================================================================
// Wire rendering
// =============================================================================

fn filter_pairs(filter: &Filter) -> Vec<(String, String)> {
    filter
        .clauses()
        .iter()
        .map(|clause| match clause {
            Clause::Eq { column, value } => {
                (column.clone(), format!("eq.{}", render_value(value)))
            }
            Clause::In { column, values } => {
                let list = values
                    .iter()
                    .map(render_value)
                    .collect::<Vec<_>>()
                    .join(",");
                (column.clone(), format!("in.({list})"))
            }
        })
        .collect()
}

fn order_pair(order: &Order) -> (String, String) {
    let direction = match order.direction {
        Direction::Ascending => "asc",
        Direction::Descending => "desc",
    };
    ("order".to_string(), format!("{}.{direction}", order.column))
}

/// Render a JSON value as a bare query-string scalar.
fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Selects on the taxonomy tables are cacheable when unfiltered; everything
/// else reflects per-user state and must stay fresh.
fn cacheable_key(table: &str, filter: &Filter, order: Option<&Order>) -> Option<String> {
    if !filter.is_empty() {
        return None;
    }
    if table != tables::CATEGORIES && table != tables::TAGS {
        return None;
    }
    let order_part = order
        .map(order_pair)
        .map_or_else(String::new, |(_, rendered)| rendered);
    Some(format!("{table}:{order_part}"))
}

fn api_error(status: reqwest::StatusCode, body: &str) -> StoreError {
    let message = parse_error_message(body);
    if status == reqwest::StatusCode::CONFLICT {
        return StoreError::Constraint(message);
    }
    StoreError::Api {
        status: status.as_u16(),
        message,
    }
}

/// Extract a readable message from an error body.
///
/// The store reports errors as JSON `{"message": "..."}`; anything else is
/// passed through truncated.
fn parse_error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body)
        && let Some(message) = value.get("message").and_then(Value::as_str)
    {
        return message.to_string();
    }
    let truncated: String = body.chars().take(200).collect();
    if truncated.is_empty() {
        "unknown store error".to_string()
    } else {
        truncated
    }
}
