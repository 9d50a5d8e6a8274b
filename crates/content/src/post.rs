//! Blog post model and draft validation.

use pressroom_core::types::{RecordId, Timestamp};
use pressroom_core::{CoreError, CoreResult};
use pressroom_store::{Row, StoreError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A stored blog post, as the record store returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: RecordId,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    pub author: String,
    #[serde(default)]
    pub author_image: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    pub published: bool,
    /// Reading-time label the store computes on insert.
    #[serde(default)]
    pub read_time: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Post {
    /// Decode a store row into a post.
    pub fn from_row(row: Row) -> Result<Self, StoreError> {
        Ok(serde_json::from_value(Value::Object(row))?)
    }
}

/// Editable post fields as they arrive from the admin form. Empty strings
/// mean "not provided"; optional columns store NULL in that case.
#[derive(Debug, Clone, Default)]
pub struct PostDraft {
    pub title: String,
    pub description: String,
    pub content: String,
    pub image: String,
    pub author: String,
    pub author_image: String,
    pub category: String,
    pub published: bool,
}

impl PostDraft {
    /// Check the required fields. Runs before any store call.
    pub fn validate(&self) -> CoreResult<()> {
        if self.title.is_empty() {
            return Err(CoreError::Validation("title is required".to_string()));
        }
        if self.author.is_empty() {
            return Err(CoreError::Validation("author is required".to_string()));
        }
        Ok(())
    }

    /// Row for creating a new post. New posts always start unpublished.
    pub fn insert_row(&self, slug: &str) -> Row {
        let mut row = self.base_row(slug);
        row.insert("published".to_string(), Value::Bool(false));
        row
    }

    /// Row for updating an existing post, carrying its published state.
    pub fn update_row(&self, slug: &str) -> Row {
        let mut row = self.base_row(slug);
        row.insert("published".to_string(), Value::Bool(self.published));
        row
    }

    fn base_row(&self, slug: &str) -> Row {
        let mut row = Row::new();
        row.insert("title".to_string(), Value::String(self.title.clone()));
        row.insert("slug".to_string(), Value::String(slug.to_string()));
        row.insert("description".to_string(), nullable(&self.description));
        row.insert("content".to_string(), nullable(&self.content));
        row.insert("image".to_string(), nullable(&self.image));
        row.insert("author".to_string(), Value::String(self.author.clone()));
        row.insert("author_image".to_string(), nullable(&self.author_image));
        row.insert("category".to_string(), nullable(&self.category));
        row
    }
}

fn nullable(value: &str) -> Value {
    if value.is_empty() {
        Value::Null
    } else {
        Value::String(value.to_string())
    }
}
