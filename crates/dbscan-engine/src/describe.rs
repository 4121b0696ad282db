//! Table descriptor builder

use dbscan_core::{MetadataStore, Result, StoreOperation, TableDescriptor, TableName};
use dbscan_telemetry::store_call_span;
use std::sync::Arc;
use tracing::Instrument;

/// Builds a [`TableDescriptor`] from the columns and row count of one table.
#[derive(Clone)]
pub struct TableDescriptorBuilder {
    store: Arc<dyn MetadataStore>,
}

impl TableDescriptorBuilder {
    pub fn new(store: Arc<dyn MetadataStore>) -> Self {
        Self { store }
    }

    /// Describe `table`.
    ///
    /// A table the catalog does not know comes back with no columns and zero
    /// rows; its row count is never queried. Store faults are returned as
    /// `Error::StoreUnavailable`.
    pub async fn describe(&self, table: &TableName) -> Result<TableDescriptor> {
        let columns = self
            .store
            .fetch_columns(table)
            .instrument(store_call_span(StoreOperation::Columns, table.as_str()))
            .await?;

        if columns.is_empty() {
            tracing::debug!(table = %table, "Table not present in catalog");
            return Ok(TableDescriptor::missing(table));
        }

        let total_rows = self
            .store
            .fetch_row_count(table)
            .instrument(store_call_span(StoreOperation::RowCount, table.as_str()))
            .await?;

        tracing::debug!(
            table = %table,
            columns = columns.len(),
            total_rows,
            "Described table"
        );

        Ok(TableDescriptor {
            table_name: table.to_string(),
            total_rows,
            columns,
        })
    }
}
