//! Append-only activity trail behind the admin dashboard.
//!
//! Every content mutation records who did what. Appending is best-effort:
//! a failed log write is reported through tracing but never fails the
//! operation that triggered it.

use std::sync::Arc;

use chrono::Utc;
use pressroom_core::types::{RecordId, Timestamp};
use pressroom_store::{tables, Filter, Order, Query, RecordStore, Row, StoreError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Entity type labels stored in the trail.
pub mod entities {
    pub const POST: &str = "post";
    pub const TESTIMONIAL: &str = "testimonial";
}

/// What a trail entry records about the mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    Create,
    Update,
    Delete,
}

impl std::fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        };
        f.write_str(label)
    }
}

/// A stored trail entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: RecordId,
    pub user_email: String,
    pub action: ActivityAction,
    pub entity_type: String,
    #[serde(default)]
    pub entity_id: Option<RecordId>,
    pub details: String,
    pub created_at: Timestamp,
}

/// Writes and reads the `activity_logs` table.
#[derive(Clone)]
pub struct ActivityLogger {
    store: Arc<dyn RecordStore>,
}

impl ActivityLogger {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Append one entry. Failures are logged and swallowed so a broken
    /// trail never blocks the mutation it describes.
    pub async fn append(
        &self,
        user_email: &str,
        action: ActivityAction,
        entity_type: &'static str,
        entity_id: Option<&str>,
        details: String,
    ) {
        let mut row = Row::new();
        row.insert(
            "user_email".to_string(),
            Value::String(user_email.to_string()),
        );
        row.insert("action".to_string(), Value::String(action.to_string()));
        row.insert(
            "entity_type".to_string(),
            Value::String(entity_type.to_string()),
        );
        if let Some(id) = entity_id {
            row.insert("entity_id".to_string(), Value::String(id.to_string()));
        }
        row.insert("details".to_string(), Value::String(details));
        row.insert(
            "created_at".to_string(),
            Value::String(Utc::now().to_rfc3339()),
        );

        if let Err(err) = self.store.insert(tables::ACTIVITY_LOGS, vec![row]).await {
            tracing::warn!(%err, %action, entity_type, "activity log append failed");
        }
    }

    /// Latest entries, newest first, optionally restricted to one entity
    /// type. Rows that do not decode as entries are skipped.
    pub async fn recent(
        &self,
        entity_type: Option<&str>,
        limit: usize,
    ) -> Result<Vec<ActivityEntry>, StoreError> {
        let mut filter = Filter::new();
        if let Some(entity) = entity_type {
            filter = filter.eq("entity_type", entity);
        }
        let query = Query::new()
            .filter(filter)
            .order(Order::desc("created_at"))
            .limit(limit);
        let rows = self.store.select(tables::ACTIVITY_LOGS, query).await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| serde_json::from_value(Value::Object(row)).ok())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use pressroom_store::MemoryStore;

    use super::*;

    fn logger() -> (ActivityLogger, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (ActivityLogger::new(store.clone()), store)
    }

    #[tokio::test]
    async fn append_stores_the_entry_shape() {
        let (logger, store) = logger();
        logger
            .append(
                "ops@example.com",
                ActivityAction::Create,
                entities::POST,
                Some("p-1"),
                "Post created: Launch notes".to_string(),
            )
            .await;

        let rows = store
            .select(tables::ACTIVITY_LOGS, Query::new())
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("action"), Some(&Value::String("create".into())));
        assert_eq!(
            rows[0].get("entity_id"),
            Some(&Value::String("p-1".into()))
        );
        assert!(rows[0].get("user_id").is_none());
    }

    #[tokio::test]
    async fn append_swallows_store_failures() {
        let (logger, store) = logger();
        store.fail_next("57014", "canceling statement due to statement timeout");
        logger
            .append(
                "ops@example.com",
                ActivityAction::Delete,
                entities::POST,
                Some("p-1"),
                "Post deleted: Launch notes".to_string(),
            )
            .await;

        // This select succeeding shows the append consumed the one-shot
        // failure; nothing was stored.
        let rows = store
            .select(tables::ACTIVITY_LOGS, Query::new())
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn recent_filters_by_entity_and_orders_newest_first() {
        let (logger, _store) = logger();
        logger
            .append(
                "ops@example.com",
                ActivityAction::Create,
                entities::POST,
                Some("p-1"),
                "Post created: First".to_string(),
            )
            .await;
        logger
            .append(
                "ops@example.com",
                ActivityAction::Create,
                entities::TESTIMONIAL,
                Some("t-1"),
                "Testimonial created: Claire (Fontaine SARL)".to_string(),
            )
            .await;
        logger
            .append(
                "ops@example.com",
                ActivityAction::Update,
                entities::POST,
                Some("p-1"),
                "Post updated: First".to_string(),
            )
            .await;

        let posts_only = logger.recent(Some(entities::POST), 20).await.unwrap();
        assert_eq!(posts_only.len(), 2);
        assert!(posts_only
            .iter()
            .all(|entry| entry.entity_type == entities::POST));

        let everything = logger.recent(None, 20).await.unwrap();
        assert_eq!(everything.len(), 3);
        assert!(everything[0].created_at >= everything[2].created_at);
    }

    #[tokio::test]
    async fn recent_skips_rows_that_do_not_decode() {
        let (logger, store) = logger();
        let mut alien = Row::new();
        alien.insert("action".to_string(), Value::String("migrate".into()));
        store
            .insert(tables::ACTIVITY_LOGS, vec![alien])
            .await
            .unwrap();
        logger
            .append(
                "ops@example.com",
                ActivityAction::Create,
                entities::POST,
                None,
                "Post created: Second".to_string(),
            )
            .await;

        let entries = logger.recent(None, 20).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].entity_id, None);
    }
}
