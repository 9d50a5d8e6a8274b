//! Record store port and bindings.
//!
//! The back office persists everything in an externally hosted table
//! service. This crate defines the [`RecordStore`](store::RecordStore)
//! trait the services program against, a [`MemoryStore`](memory::MemoryStore)
//! for tests, and a [`RestStore`](rest::RestStore) that speaks the
//! service's PostgREST-style HTTP API.

pub mod error;
pub mod filter;
pub mod memory;
pub mod rest;
pub mod store;

pub use error::{StoreError, StoreErrorKind};
pub use filter::{Filter, Order, Predicate, Query};
pub use memory::MemoryStore;
pub use rest::{RestStore, RestStoreConfig};
pub use store::{tables, RecordStore, Row};
