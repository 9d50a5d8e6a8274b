//! The record store port.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreError;
use crate::filter::{Filter, Query};

/// A single record, as the store service returns it: column name to JSON
/// value.
pub type Row = serde_json::Map<String, Value>;

/// Table names in the hosted store.
pub mod tables {
    /// Local-credential operators.
    pub const SUPERUSERS: &str = "superuser";
    /// Backend-verified operators.
    pub const ADMINISTRATORS: &str = "administrators";
    /// Blog posts.
    pub const POSTS: &str = "posts";
    /// Customer testimonials.
    pub const TESTIMONIALS: &str = "testimonials";
    /// Append-only activity trail.
    pub const ACTIVITY_LOGS: &str = "activity_logs";
}

/// Access to the hosted table service.
///
/// The service crates only ever talk to the store through this trait, so
/// tests can substitute [`MemoryStore`](crate::memory::MemoryStore) for the
/// HTTP binding. All calls are asynchronous; failures carry the service's
/// structured `{code, message}` when one was reported.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch the rows of `table` matching `query`.
    async fn select(&self, table: &str, query: Query) -> Result<Vec<Row>, StoreError>;

    /// Insert `rows` into `table`, returning the stored rows with their
    /// assigned ids and timestamps.
    async fn insert(&self, table: &str, rows: Vec<Row>) -> Result<Vec<Row>, StoreError>;

    /// Apply `patch` to every row of `table` matching `filter`, returning
    /// the updated rows.
    async fn update(&self, table: &str, patch: Row, filter: Filter) -> Result<Vec<Row>, StoreError>;

    /// Delete the rows of `table` matching `filter`.
    async fn delete(&self, table: &str, filter: Filter) -> Result<(), StoreError>;
}
