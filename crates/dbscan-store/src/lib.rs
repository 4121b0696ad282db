//! Metadata store adapters for DB Scanner
//!
//! This crate provides the PostgreSQL catalog reader used in production and
//! an in-memory catalog used by tests and local demos.

pub mod inmemory;
pub mod postgres;

// Re-exports
pub use inmemory::{ForeignKey, InMemoryMetadataStore, StoreCall};
pub use postgres::PostgresMetadataStore;
