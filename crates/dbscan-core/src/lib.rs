//! Core traits and types for DB Scanner
//!
//! This crate provides the data model of a table's schema neighborhood, the
//! error taxonomy, the identifier gate and the metadata store boundary.

pub mod config;
pub mod error;
pub mod identifier;
pub mod store;
pub mod types;

// Re-exports
pub use config::{
    DatabaseConfig, DbScanConfig, LogFormat, LogRotation, NeighborhoodConfig,
    ObservabilityConfig, RowCountStrategy, ServerConfig,
};
pub use error::{Error, ErrorKind, Result, StoreError, StoreResult};
pub use identifier::{TableName, is_valid_identifier, validate_identifier};
pub use store::{MetadataStore, StoreOperation};
pub use types::{
    ChildEdge, ColumnDescriptor, ConstraintDescriptor, NeighborhoodResponse, ParentEdge,
    TableDescriptor,
};
