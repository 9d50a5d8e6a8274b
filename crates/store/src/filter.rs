//! Filter predicates and query options for record store calls.

use serde_json::Value;

use crate::store::Row;

/// A single column predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Exact equality.
    Eq(String, Value),
    /// Case-insensitive equality, the store's `ilike` without wildcards.
    /// The back office uses it for email lookups.
    ILike(String, String),
}

/// Conjunction of column predicates. An empty filter matches every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    predicates: Vec<Predicate>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `column` to equal `value`.
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.predicates
            .push(Predicate::Eq(column.into(), value.into()));
        self
    }

    /// Require `column` to match `value` case-insensitively.
    pub fn ilike(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.predicates
            .push(Predicate::ILike(column.into(), value.into()));
        self
    }

    /// The predicates in insertion order.
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Whether a row satisfies every predicate.
    pub fn matches(&self, row: &Row) -> bool {
        self.predicates.iter().all(|predicate| match predicate {
            Predicate::Eq(column, value) => row.get(column) == Some(value),
            Predicate::ILike(column, value) => row
                .get(column)
                .and_then(Value::as_str)
                .is_some_and(|s| s.eq_ignore_ascii_case(value)),
        })
    }
}

/// Sort order for a select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub descending: bool,
}

impl Order {
    /// Ascending order on `column`.
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: false,
        }
    }

    /// Descending order on `column`.
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: true,
        }
    }
}

/// A select request: filter plus optional order and row limit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filter: Filter,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order = Some(order);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}
