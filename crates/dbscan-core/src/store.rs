//! Metadata store boundary

use crate::error::StoreResult;
use crate::identifier::TableName;
use crate::types::{ChildEdge, ColumnDescriptor, ParentEdge};
use async_trait::async_trait;
use std::fmt;

/// Read-only access to a relational catalog.
///
/// Implementations are shared across concurrent requests and must fail
/// atomically: a call either returns all of its rows or a single error.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Columns of `table` in catalog order; empty when the table is absent.
    async fn fetch_columns(&self, table: &TableName) -> StoreResult<Vec<ColumnDescriptor>>;

    async fn fetch_row_count(&self, table: &TableName) -> StoreResult<u64>;

    /// Foreign keys defined on `table`.
    async fn fetch_parent_edges(&self, table: &TableName) -> StoreResult<Vec<ParentEdge>>;

    /// Foreign keys on other tables that reference `table`.
    async fn fetch_child_edges(&self, table: &TableName) -> StoreResult<Vec<ChildEdge>>;

    /// Cheap connectivity check for readiness probes
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// The four catalog reads, used for logging and test bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    Columns,
    RowCount,
    ParentEdges,
    ChildEdges,
}

impl StoreOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreOperation::Columns => "fetch_columns",
            StoreOperation::RowCount => "fetch_row_count",
            StoreOperation::ParentEdges => "fetch_parent_edges",
            StoreOperation::ChildEdges => "fetch_child_edges",
        }
    }
}

impl fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
