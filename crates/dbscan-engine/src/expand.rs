//! Relationship expander
//!
//! Discovers the foreign keys around a table in both directions and describes
//! every table on the other end.

use crate::describe::TableDescriptorBuilder;
use dbscan_core::{
    ConstraintDescriptor, MetadataStore, NeighborhoodConfig, Result, StoreOperation,
    TableDescriptor, TableName,
};
use dbscan_telemetry::store_call_span;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::Instrument;

/// Parent and child tables of one central table, with their constraints
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionResult {
    pub parents: Vec<TableDescriptor>,
    pub parent_constraints: Vec<ConstraintDescriptor>,
    pub children: Vec<TableDescriptor>,
    pub child_constraints: Vec<ConstraintDescriptor>,
}

#[derive(Clone)]
pub struct RelationshipExpander {
    store: Arc<dyn MetadataStore>,
    describer: TableDescriptorBuilder,
    max_concurrent_fetches: usize,
    dedupe_related_tables: bool,
}

impl RelationshipExpander {
    pub fn new(store: Arc<dyn MetadataStore>, config: &NeighborhoodConfig) -> Self {
        Self {
            describer: TableDescriptorBuilder::new(store.clone()),
            store,
            max_concurrent_fetches: config.max_concurrent_fetches.max(1),
            dedupe_related_tables: config.dedupe_related_tables,
        }
    }

    /// Expand `central` by one hop in both directions.
    ///
    /// Descriptors are listed one per edge, in the order the store returned the
    /// edges; a table referenced by several edges is only fetched once. Any
    /// store fault fails the whole expansion.
    pub async fn expand(&self, central: &TableName) -> Result<ExpansionResult> {
        let (parent_edges, child_edges) = futures::try_join!(
            self.store
                .fetch_parent_edges(central)
                .instrument(store_call_span(StoreOperation::ParentEdges, central.as_str())),
            self.store
                .fetch_child_edges(central)
                .instrument(store_call_span(StoreOperation::ChildEdges, central.as_str())),
        )?;

        tracing::info!(
            table = %central,
            parent_edges = parent_edges.len(),
            child_edges = child_edges.len(),
            "Found foreign keys"
        );

        let parent_tables: Vec<&TableName> =
            parent_edges.iter().map(|e| &e.referenced_table).collect();
        let child_tables: Vec<&TableName> = child_edges.iter().map(|e| &e.child_table).collect();

        let descriptors = self
            .describe_all(
                parent_tables
                    .iter()
                    .chain(child_tables.iter())
                    .map(|t| (*t).clone())
                    .collect(),
            )
            .await?;

        let mut parents = select(&parent_tables, &descriptors);
        let mut children = select(&child_tables, &descriptors);
        if self.dedupe_related_tables {
            dedupe_by_name(&mut parents);
            dedupe_by_name(&mut children);
        }

        Ok(ExpansionResult {
            parents,
            parent_constraints: parent_edges
                .iter()
                .map(|e| e.to_constraint(central))
                .collect(),
            children,
            child_constraints: child_edges
                .iter()
                .map(|e| e.to_constraint(central))
                .collect(),
        })
    }

    /// Describe each distinct table once, at most `max_concurrent_fetches` at a time
    async fn describe_all(
        &self,
        tables: Vec<TableName>,
    ) -> Result<HashMap<TableName, TableDescriptor>> {
        let mut seen = HashSet::new();
        let distinct: Vec<TableName> = tables
            .into_iter()
            .filter(|t| seen.insert(t.clone()))
            .collect();

        let described: Vec<TableDescriptor> = stream::iter(distinct.clone())
            .map(|table| {
                let describer = self.describer.clone();
                async move { describer.describe(&table).await }
            })
            .buffered(self.max_concurrent_fetches)
            .try_collect()
            .await?;

        Ok(distinct.into_iter().zip(described).collect())
    }
}

fn select(
    tables: &[&TableName],
    descriptors: &HashMap<TableName, TableDescriptor>,
) -> Vec<TableDescriptor> {
    tables
        .iter()
        .filter_map(|t| descriptors.get(*t).cloned())
        .collect()
}

fn dedupe_by_name(descriptors: &mut Vec<TableDescriptor>) {
    let mut seen = HashSet::new();
    descriptors.retain(|d| seen.insert(d.table_name.clone()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::shop_catalog;
    use dbscan_core::{ColumnDescriptor, Error, StoreError};
    use dbscan_store::ForeignKey;
    use std::time::Duration;

    fn expander(store: Arc<dyn MetadataStore>) -> RelationshipExpander {
        RelationshipExpander::new(store, &NeighborhoodConfig::default())
    }

    fn names(descriptors: &[TableDescriptor]) -> Vec<&str> {
        descriptors.iter().map(|d| d.table_name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_expand_orders() {
        let store = Arc::new(shop_catalog());
        let result = expander(store)
            .expand(&TableName::parse("orders").unwrap())
            .await
            .unwrap();

        assert_eq!(names(&result.parents), ["customers"]);
        assert_eq!(result.parents[0].total_rows, 12);
        assert_eq!(names(&result.children), ["order_items", "shipments"]);

        assert_eq!(result.parent_constraints.len(), 1);
        assert_eq!(result.parent_constraints[0].child_table, "orders");
        assert_eq!(result.parent_constraints[0].referenced_table, "customers");

        let child_constraints: Vec<_> = result
            .child_constraints
            .iter()
            .map(|c| (c.constraint_name.as_str(), c.child_table.as_str()))
            .collect();
        assert_eq!(
            child_constraints,
            [
                ("fk_order_items_order", "order_items"),
                ("fk_shipments_order", "shipments"),
            ]
        );
        assert!(
            result
                .child_constraints
                .iter()
                .all(|c| c.referenced_table == "orders")
        );
    }

    #[tokio::test]
    async fn test_table_without_relationships() {
        let store = shop_catalog();
        store.add_table("audit_log", vec![ColumnDescriptor::new("id", "bigint")], 0);

        let result = expander(Arc::new(store))
            .expand(&TableName::parse("audit_log").unwrap())
            .await
            .unwrap();

        assert_eq!(result, ExpansionResult::default());
    }

    #[tokio::test]
    async fn test_one_descriptor_per_edge_fetched_once() {
        let store = shop_catalog();
        store.add_foreign_key(ForeignKey::new(
            "fk_orders_referrer",
            ("orders", "referred_by"),
            ("customers", "id"),
        ));
        let store = Arc::new(store);

        let result = expander(store.clone())
            .expand(&TableName::parse("orders").unwrap())
            .await
            .unwrap();

        assert_eq!(names(&result.parents), ["customers", "customers"]);
        assert_eq!(result.parent_constraints.len(), 2);

        let customer_lookups = store
            .calls()
            .iter()
            .filter(|c| c.operation == StoreOperation::Columns && c.table == "customers")
            .count();
        assert_eq!(customer_lookups, 1);
    }

    #[tokio::test]
    async fn test_dedupe_keeps_constraints() {
        let store = shop_catalog();
        store.add_foreign_key(ForeignKey::new(
            "fk_orders_referrer",
            ("orders", "referred_by"),
            ("customers", "id"),
        ));
        let config = NeighborhoodConfig {
            dedupe_related_tables: true,
            ..Default::default()
        };

        let result = RelationshipExpander::new(Arc::new(store), &config)
            .expand(&TableName::parse("orders").unwrap())
            .await
            .unwrap();

        assert_eq!(names(&result.parents), ["customers"]);
        assert_eq!(result.parent_constraints.len(), 2);
    }

    #[tokio::test]
    async fn test_order_follows_edges_not_completion() {
        let store = shop_catalog();
        store.set_latency("order_items", Duration::from_millis(80));

        let result = expander(Arc::new(store))
            .expand(&TableName::parse("orders").unwrap())
            .await
            .unwrap();

        assert_eq!(names(&result.children), ["order_items", "shipments"]);
    }

    #[tokio::test]
    async fn test_related_table_outside_catalog_has_no_columns() {
        let store = shop_catalog();
        store.add_foreign_key(ForeignKey::new(
            "fk_orders_region",
            ("orders", "region_id"),
            ("regions", "id"),
        ));

        let result = expander(Arc::new(store))
            .expand(&TableName::parse("orders").unwrap())
            .await
            .unwrap();

        assert_eq!(names(&result.parents), ["customers", "regions"]);
        assert!(!result.parents[1].exists());
    }

    #[tokio::test]
    async fn test_child_edge_failure_fails_everything() {
        let store = shop_catalog();
        store.fail_on(
            StoreOperation::ChildEdges,
            None,
            StoreError::Connection("reset by peer".to_string()),
        );

        let err = expander(Arc::new(store))
            .expand(&TableName::parse("orders").unwrap())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::StoreUnavailable(StoreError::Connection(_))
        ));
    }

    #[tokio::test]
    async fn test_related_descriptor_failure_fails_everything() {
        let store = shop_catalog();
        store.fail_on(
            StoreOperation::RowCount,
            Some("shipments"),
            StoreError::Query("permission denied".to_string()),
        );

        let err = expander(Arc::new(store))
            .expand(&TableName::parse("orders").unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::StoreUnavailable(StoreError::Query(_))));
    }
}
