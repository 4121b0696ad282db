//! In-memory catalog
//!
//! Holds tables and foreign keys in memory and answers the four catalog reads
//! from them. Every call is recorded, and failures or latency can be injected
//! per operation and table.

use async_trait::async_trait;
use dbscan_core::{
    ChildEdge, ColumnDescriptor, MetadataStore, ParentEdge, StoreError, StoreOperation,
    StoreResult, TableName,
};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

/// A foreign key between two in-memory tables, one column pair per entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub name: String,
    pub child_table: String,
    pub child_column: String,
    pub referenced_table: String,
    pub referenced_column: String,
}

impl ForeignKey {
    pub fn new(
        name: impl Into<String>,
        (child_table, child_column): (&str, &str),
        (referenced_table, referenced_column): (&str, &str),
    ) -> Self {
        Self {
            name: name.into(),
            child_table: child_table.to_string(),
            child_column: child_column.to_string(),
            referenced_table: referenced_table.to_string(),
            referenced_column: referenced_column.to_string(),
        }
    }
}

/// One recorded adapter call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreCall {
    pub operation: StoreOperation,
    pub table: String,
}

#[derive(Debug, Clone)]
struct InMemoryTable {
    columns: Vec<ColumnDescriptor>,
    row_count: u64,
}

#[derive(Debug, Clone)]
struct InjectedFailure {
    operation: StoreOperation,
    /// None fails the operation for every table
    table: Option<String>,
    error: StoreError,
}

#[derive(Default)]
pub struct InMemoryMetadataStore {
    tables: RwLock<HashMap<String, InMemoryTable>>,
    foreign_keys: RwLock<Vec<ForeignKey>>,
    failures: RwLock<Vec<InjectedFailure>>,
    latencies: RwLock<HashMap<String, Duration>>,
    calls: RwLock<Vec<StoreCall>>,
}

impl InMemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a table
    pub fn add_table(&self, name: &str, columns: Vec<ColumnDescriptor>, row_count: u64) {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        tables.insert(name.to_string(), InMemoryTable { columns, row_count });
    }

    /// Add a foreign key; edges are reported in insertion order
    pub fn add_foreign_key(&self, foreign_key: ForeignKey) {
        self.foreign_keys
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(foreign_key);
    }

    /// Make `operation` fail with `error`, for one table or for all of them
    pub fn fail_on(&self, operation: StoreOperation, table: Option<&str>, error: StoreError) {
        self.failures
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(InjectedFailure {
                operation,
                table: table.map(str::to_string),
                error,
            });
    }

    /// Delay every call that touches `table`
    pub fn set_latency(&self, table: &str, latency: Duration) {
        self.latencies
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(table.to_string(), latency);
    }

    /// All calls seen so far, in the order they were issued
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self, operation: StoreOperation) -> usize {
        self.calls
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|c| c.operation == operation)
            .count()
    }

    pub fn clear_calls(&self) {
        self.calls
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Records the call, applies latency and returns any injected failure
    async fn enter(&self, operation: StoreOperation, table: &TableName) -> StoreResult<()> {
        self.calls
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(StoreCall {
                operation,
                table: table.to_string(),
            });

        let latency = self
            .latencies
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(table.as_str())
            .copied();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let failures = self.failures.read().unwrap_or_else(PoisonError::into_inner);
        let failure = failures.iter().find(|f| {
            f.operation == operation
                && f.table.as_deref().is_none_or(|t| t == table.as_str())
        });
        match failure {
            Some(f) => Err(f.error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl MetadataStore for InMemoryMetadataStore {
    async fn fetch_columns(&self, table: &TableName) -> StoreResult<Vec<ColumnDescriptor>> {
        self.enter(StoreOperation::Columns, table).await?;
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        Ok(tables
            .get(table.as_str())
            .map(|t| t.columns.clone())
            .unwrap_or_default())
    }

    async fn fetch_row_count(&self, table: &TableName) -> StoreResult<u64> {
        self.enter(StoreOperation::RowCount, table).await?;
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        Ok(tables.get(table.as_str()).map_or(0, |t| t.row_count))
    }

    async fn fetch_parent_edges(&self, table: &TableName) -> StoreResult<Vec<ParentEdge>> {
        self.enter(StoreOperation::ParentEdges, table).await?;
        let foreign_keys = self
            .foreign_keys
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(foreign_keys
            .iter()
            .filter(|fk| fk.child_table == table.as_str())
            .map(|fk| ParentEdge {
                constraint_name: fk.name.clone(),
                child_column: fk.child_column.clone(),
                referenced_table: TableName::from_catalog(fk.referenced_table.clone()),
                referenced_column: fk.referenced_column.clone(),
            })
            .collect())
    }

    async fn fetch_child_edges(&self, table: &TableName) -> StoreResult<Vec<ChildEdge>> {
        self.enter(StoreOperation::ChildEdges, table).await?;
        let foreign_keys = self
            .foreign_keys
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(foreign_keys
            .iter()
            .filter(|fk| fk.referenced_table == table.as_str())
            .map(|fk| ChildEdge {
                constraint_name: fk.name.clone(),
                child_table: TableName::from_catalog(fk.child_table.clone()),
                child_column: fk.child_column.clone(),
                referenced_column: fk.referenced_column.clone(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shop() -> InMemoryMetadataStore {
        let store = InMemoryMetadataStore::new();
        store.add_table(
            "customers",
            vec![ColumnDescriptor::new("id", "integer").primary_key()],
            12,
        );
        store.add_table(
            "orders",
            vec![
                ColumnDescriptor::new("id", "integer").primary_key(),
                ColumnDescriptor::new("customer_id", "integer").not_null(),
            ],
            40,
        );
        store.add_foreign_key(ForeignKey::new(
            "fk_orders_customer",
            ("orders", "customer_id"),
            ("customers", "id"),
        ));
        store
    }

    #[tokio::test]
    async fn test_columns_and_counts() {
        let store = shop();
        let orders = TableName::parse("orders").unwrap();

        let columns = store.fetch_columns(&orders).await.unwrap();
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].name, "id");
        assert_eq!(columns[1].name, "customer_id");
        assert_eq!(store.fetch_row_count(&orders).await.unwrap(), 40);

        let ghost = TableName::parse("ghost").unwrap();
        assert!(store.fetch_columns(&ghost).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_edges_in_both_directions() {
        let store = shop();

        let parents = store
            .fetch_parent_edges(&TableName::parse("orders").unwrap())
            .await
            .unwrap();
        assert_eq!(parents.len(), 1);
        assert_eq!(parents[0].referenced_table.as_str(), "customers");

        let children = store
            .fetch_child_edges(&TableName::parse("customers").unwrap())
            .await
            .unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].child_table.as_str(), "orders");
        assert_eq!(children[0].child_column, "customer_id");
    }

    #[tokio::test]
    async fn test_injected_failure_is_scoped() {
        let store = shop();
        store.fail_on(
            StoreOperation::Columns,
            Some("customers"),
            StoreError::Connection("refused".to_string()),
        );

        let err = store
            .fetch_columns(&TableName::parse("customers").unwrap())
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::Connection("refused".to_string()));

        assert!(
            store
                .fetch_columns(&TableName::parse("orders").unwrap())
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_calls_are_recorded() {
        let store = shop();
        let orders = TableName::parse("orders").unwrap();

        store.fetch_columns(&orders).await.unwrap();
        store.fetch_row_count(&orders).await.unwrap();

        assert_eq!(
            store.calls(),
            vec![
                StoreCall {
                    operation: StoreOperation::Columns,
                    table: "orders".to_string(),
                },
                StoreCall {
                    operation: StoreOperation::RowCount,
                    table: "orders".to_string(),
                },
            ]
        );
        assert_eq!(store.call_count(StoreOperation::RowCount), 1);

        store.clear_calls();
        assert!(store.calls().is_empty());
    }
}
