//! In-memory record store for tests and local development.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError, RwLock};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreError;
use crate::filter::{Filter, Query};
use crate::store::{RecordStore, Row};

/// A [`RecordStore`] over plain in-process maps.
///
/// Mimics the hosted service closely enough for the service crates:
/// inserts mint UUID ids and stamp `created_at`/`updated_at` when the
/// caller left them out, selects support the same filter/order/limit
/// surface, and [`MemoryStore::fail_next`] injects one structured service
/// error so failure paths can be exercised without a network.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Vec<Row>>>,
    fail_next: Mutex<Option<(String, String)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arrange for the next store call to fail with the given service
    /// error. One-shot: the call after it proceeds normally.
    pub fn fail_next(&self, code: impl Into<String>, message: impl Into<String>) {
        *self
            .fail_next
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some((code.into(), message.into()));
    }

    fn take_failure(&self) -> Result<(), StoreError> {
        let armed = self
            .fail_next
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match armed {
            Some((code, message)) => Err(StoreError::Service { code, message }),
            None => Ok(()),
        }
    }
}

/// Sort key for ordering rows: strings order naturally (RFC 3339
/// timestamps included), everything else by its JSON rendering.
fn sort_key(row: &Row, column: &str) -> String {
    match row.get(column) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn select(&self, table: &str, query: Query) -> Result<Vec<Row>, StoreError> {
        self.take_failure()?;
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        let mut rows: Vec<Row> = tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| query.filter.matches(row))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        if let Some(order) = &query.order {
            rows.sort_by_key(|row| sort_key(row, &order.column));
            if order.descending {
                rows.reverse();
            }
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    async fn insert(&self, table: &str, rows: Vec<Row>) -> Result<Vec<Row>, StoreError> {
        self.take_failure()?;
        let now = chrono::Utc::now().to_rfc3339();
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let stored = tables.entry(table.to_string()).or_default();
        let mut inserted = Vec::with_capacity(rows.len());
        for mut row in rows {
            row.entry("id".to_string())
                .or_insert_with(|| Value::String(uuid::Uuid::new_v4().to_string()));
            row.entry("created_at".to_string())
                .or_insert_with(|| Value::String(now.clone()));
            row.entry("updated_at".to_string())
                .or_insert_with(|| Value::String(now.clone()));
            stored.push(row.clone());
            inserted.push(row);
        }
        Ok(inserted)
    }

    async fn update(&self, table: &str, patch: Row, filter: Filter) -> Result<Vec<Row>, StoreError> {
        self.take_failure()?;
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let mut updated = Vec::new();
        if let Some(rows) = tables.get_mut(table) {
            for row in rows.iter_mut().filter(|row| filter.matches(row)) {
                for (column, value) in &patch {
                    row.insert(column.clone(), value.clone());
                }
                updated.push(row.clone());
            }
        }
        Ok(updated)
    }

    async fn delete(&self, table: &str, filter: Filter) -> Result<(), StoreError> {
        self.take_failure()?;
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(rows) = tables.get_mut(table) {
            rows.retain(|row| !filter.matches(row));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;
    use crate::filter::Order;

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    // -- insert --

    #[tokio::test]
    async fn insert_mints_id_and_timestamps() {
        let store = MemoryStore::new();
        let inserted = store
            .insert("posts", vec![row(&[("title", json!("Hello"))])])
            .await
            .unwrap();
        let row = &inserted[0];
        assert!(row.get("id").and_then(Value::as_str).is_some());
        assert!(row.get("created_at").and_then(Value::as_str).is_some());
        assert!(row.get("updated_at").and_then(Value::as_str).is_some());
    }

    #[tokio::test]
    async fn insert_keeps_caller_supplied_fields() {
        let store = MemoryStore::new();
        let inserted = store
            .insert(
                "posts",
                vec![row(&[("id", json!("fixed")), ("created_at", json!("2026-01-01T00:00:00+00:00"))])],
            )
            .await
            .unwrap();
        assert_eq!(inserted[0].get("id"), Some(&json!("fixed")));
        assert_eq!(
            inserted[0].get("created_at"),
            Some(&json!("2026-01-01T00:00:00+00:00"))
        );
    }

    // -- select --

    #[tokio::test]
    async fn select_filters_orders_and_limits() {
        let store = MemoryStore::new();
        for (title, created) in [("a", "2026-01-01"), ("b", "2026-03-01"), ("c", "2026-02-01")] {
            store
                .insert(
                    "posts",
                    vec![row(&[
                        ("title", json!(title)),
                        ("created_at", json!(created)),
                        ("published", json!(true)),
                    ])],
                )
                .await
                .unwrap();
        }
        store
            .insert(
                "posts",
                vec![row(&[("title", json!("draft")), ("published", json!(false))])],
            )
            .await
            .unwrap();

        let rows = store
            .select(
                "posts",
                Query::new()
                    .filter(Filter::new().eq("published", true))
                    .order(Order::desc("created_at"))
                    .limit(2),
            )
            .await
            .unwrap();
        let titles: Vec<_> = rows
            .iter()
            .map(|r| r.get("title").and_then(Value::as_str).unwrap())
            .collect();
        assert_eq!(titles, ["b", "c"]);
    }

    #[tokio::test]
    async fn select_ilike_matches_case_insensitively() {
        let store = MemoryStore::new();
        store
            .insert("superuser", vec![row(&[("email", json!("Ops@Example.com"))])])
            .await
            .unwrap();
        let rows = store
            .select(
                "superuser",
                Query::new().filter(Filter::new().ilike("email", "ops@example.COM")),
            )
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn select_unknown_table_is_empty() {
        let store = MemoryStore::new();
        let rows = store.select("nothing", Query::new()).await.unwrap();
        assert!(rows.is_empty());
    }

    // -- update / delete --

    #[tokio::test]
    async fn update_patches_only_matching_rows() {
        let store = MemoryStore::new();
        store
            .insert(
                "posts",
                vec![
                    row(&[("id", json!("1")), ("published", json!(false))]),
                    row(&[("id", json!("2")), ("published", json!(false))]),
                ],
            )
            .await
            .unwrap();

        let updated = store
            .update(
                "posts",
                row(&[("published", json!(true))]),
                Filter::new().eq("id", "1"),
            )
            .await
            .unwrap();
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].get("published"), Some(&json!(true)));

        let untouched = store
            .select("posts", Query::new().filter(Filter::new().eq("id", "2")))
            .await
            .unwrap();
        assert_eq!(untouched[0].get("published"), Some(&json!(false)));
    }

    #[tokio::test]
    async fn delete_removes_matching_rows() {
        let store = MemoryStore::new();
        store
            .insert(
                "testimonials",
                vec![row(&[("id", json!("1"))]), row(&[("id", json!("2"))])],
            )
            .await
            .unwrap();
        store
            .delete("testimonials", Filter::new().eq("id", "1"))
            .await
            .unwrap();
        let rows = store.select("testimonials", Query::new()).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("id"), Some(&json!("2")));
    }

    // -- fail_next --

    #[tokio::test]
    async fn fail_next_fires_once() {
        let store = MemoryStore::new();
        store.fail_next("42501", "violates row-level security policy");
        let err = store.select("posts", Query::new()).await.unwrap_err();
        assert_matches!(err, StoreError::Service { ref code, .. } if code == "42501");
        assert!(store.select("posts", Query::new()).await.is_ok());
    }
}
