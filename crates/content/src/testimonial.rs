//! Customer testimonial model and draft validation.

use chrono::Utc;
use pressroom_core::types::{RecordId, Timestamp};
use pressroom_core::{CoreError, CoreResult};
use pressroom_store::{Row, StoreError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A stored testimonial, as the record store returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Testimonial {
    pub id: RecordId,
    pub name: String,
    pub position: String,
    pub company: String,
    #[serde(default)]
    pub image: String,
    pub content: String,
    pub rating: u8,
    pub is_featured: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Testimonial {
    /// Decode a store row into a testimonial.
    pub fn from_row(row: Row) -> Result<Self, StoreError> {
        Ok(serde_json::from_value(Value::Object(row))?)
    }
}

/// Editable testimonial fields as they arrive from the admin form.
///
/// Unlike posts, every column stores the submitted string as-is. The
/// timestamps are stamped here rather than by the store.
#[derive(Debug, Clone, Default)]
pub struct TestimonialDraft {
    pub name: String,
    pub position: String,
    pub company: String,
    pub image: String,
    pub content: String,
    pub rating: u8,
    pub is_featured: bool,
}

impl TestimonialDraft {
    /// Check the required fields. Runs before any store call.
    pub fn validate(&self) -> CoreResult<()> {
        if self.name.is_empty() {
            return Err(CoreError::Validation("name is required".to_string()));
        }
        if self.content.is_empty() {
            return Err(CoreError::Validation("content is required".to_string()));
        }
        Ok(())
    }

    /// Row for creating a new testimonial, stamped with both timestamps.
    pub fn insert_row(&self) -> Row {
        let mut row = self.base_row();
        let now = Utc::now().to_rfc3339();
        row.insert("created_at".to_string(), Value::String(now.clone()));
        row.insert("updated_at".to_string(), Value::String(now));
        row
    }

    /// Row for updating an existing testimonial; only `updated_at` moves.
    pub fn update_row(&self) -> Row {
        let mut row = self.base_row();
        row.insert(
            "updated_at".to_string(),
            Value::String(Utc::now().to_rfc3339()),
        );
        row
    }

    fn base_row(&self) -> Row {
        let mut row = Row::new();
        row.insert("name".to_string(), Value::String(self.name.clone()));
        row.insert("position".to_string(), Value::String(self.position.clone()));
        row.insert("company".to_string(), Value::String(self.company.clone()));
        row.insert("image".to_string(), Value::String(self.image.clone()));
        row.insert("content".to_string(), Value::String(self.content.clone()));
        row.insert("rating".to_string(), Value::from(self.rating));
        row.insert("is_featured".to_string(), Value::Bool(self.is_featured));
        row
    }
}
