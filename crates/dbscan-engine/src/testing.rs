//! Shared test utilities for engine tests

use async_trait::async_trait;
use dbscan_core::{
    ChildEdge, ColumnDescriptor, MetadataStore, ParentEdge, StoreResult, TableName,
};
use dbscan_store::{ForeignKey, InMemoryMetadataStore};
use mockall::mock;

mock! {
    pub Store {}

    #[async_trait]
    impl MetadataStore for Store {
        async fn fetch_columns(&self, table: &TableName) -> StoreResult<Vec<ColumnDescriptor>>;
        async fn fetch_row_count(&self, table: &TableName) -> StoreResult<u64>;
        async fn fetch_parent_edges(&self, table: &TableName) -> StoreResult<Vec<ParentEdge>>;
        async fn fetch_child_edges(&self, table: &TableName) -> StoreResult<Vec<ChildEdge>>;
        async fn ping(&self) -> StoreResult<()>;
    }
}

fn id_column() -> ColumnDescriptor {
    ColumnDescriptor::new("id", "integer").primary_key().identity()
}

/// A small shop schema:
///
/// - `orders.customer_id -> customers.id`
/// - `order_items.order_id -> orders.id`
/// - `shipments.order_id -> orders.id`
pub fn shop_catalog() -> InMemoryMetadataStore {
    let store = InMemoryMetadataStore::new();
    store.add_table(
        "customers",
        vec![
            id_column(),
            ColumnDescriptor::new("email", "character varying")
                .with_max_length(255)
                .not_null(),
        ],
        12,
    );
    store.add_table(
        "orders",
        vec![
            id_column(),
            ColumnDescriptor::new("customer_id", "integer").not_null(),
            ColumnDescriptor::new("placed_at", "timestamp with time zone"),
        ],
        40,
    );
    store.add_table(
        "order_items",
        vec![
            id_column(),
            ColumnDescriptor::new("order_id", "integer").not_null(),
            ColumnDescriptor::new("sku", "character varying").with_max_length(32),
        ],
        95,
    );
    store.add_table(
        "shipments",
        vec![
            id_column(),
            ColumnDescriptor::new("order_id", "integer").not_null(),
        ],
        31,
    );

    store.add_foreign_key(ForeignKey::new(
        "fk_orders_customer",
        ("orders", "customer_id"),
        ("customers", "id"),
    ));
    store.add_foreign_key(ForeignKey::new(
        "fk_order_items_order",
        ("order_items", "order_id"),
        ("orders", "id"),
    ));
    store.add_foreign_key(ForeignKey::new(
        "fk_shipments_order",
        ("shipments", "order_id"),
        ("orders", "id"),
    ));
    store
}
