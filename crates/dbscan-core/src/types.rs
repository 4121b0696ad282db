//! Shared types for schema neighborhoods
//!
//! Field names on the wire are fixed; consumers depend on them.

use crate::identifier::TableName;
use serde::{Deserialize, Serialize};

/// One column of a table, in catalog order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    #[serde(rename = "COLUMN_NAME")]
    pub name: String,
    #[serde(rename = "DATA_TYPE")]
    pub data_type: String,
    /// Absent for non-character types
    #[serde(rename = "CHARACTER_MAXIMUM_LENGTH")]
    pub max_length: Option<i64>,
    #[serde(rename = "PRIMARY_KEY")]
    pub is_primary_key: bool,
    #[serde(rename = "NULLABLE")]
    pub is_nullable: bool,
    #[serde(rename = "IDENTITY")]
    pub is_identity: bool,
}

impl ColumnDescriptor {
    /// A nullable, non-key column
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            max_length: None,
            is_primary_key: false,
            is_nullable: true,
            is_identity: false,
        }
    }

    pub fn with_max_length(mut self, len: i64) -> Self {
        self.max_length = Some(len);
        self
    }

    /// Marks the column as primary key; primary keys are never nullable
    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self.is_nullable = false;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.is_nullable = false;
        self
    }

    pub fn identity(mut self) -> Self {
        self.is_identity = true;
        self
    }
}

/// Self-contained description of one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub table_name: String,
    pub total_rows: u64,
    pub columns: Vec<ColumnDescriptor>,
}

impl TableDescriptor {
    /// Descriptor for a table the catalog does not know
    pub fn missing(table: &TableName) -> Self {
        Self {
            table_name: table.to_string(),
            total_rows: 0,
            columns: Vec::new(),
        }
    }

    /// A table with no columns is not in the catalog.
    pub fn exists(&self) -> bool {
        !self.columns.is_empty()
    }
}

/// One foreign-key column pair, independent of the direction it was found from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConstraintDescriptor {
    pub constraint_name: String,
    pub child_table: String,
    pub child_column: String,
    pub referenced_table: String,
    pub referenced_column: String,
}

/// A foreign key defined on the inspected table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentEdge {
    pub constraint_name: String,
    pub child_column: String,
    pub referenced_table: TableName,
    pub referenced_column: String,
}

impl ParentEdge {
    pub fn to_constraint(&self, central: &TableName) -> ConstraintDescriptor {
        ConstraintDescriptor {
            constraint_name: self.constraint_name.clone(),
            child_table: central.to_string(),
            child_column: self.child_column.clone(),
            referenced_table: self.referenced_table.to_string(),
            referenced_column: self.referenced_column.clone(),
        }
    }
}

/// A foreign key on another table that references the inspected table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildEdge {
    pub constraint_name: String,
    pub child_table: TableName,
    pub child_column: String,
    pub referenced_column: String,
}

impl ChildEdge {
    pub fn to_constraint(&self, central: &TableName) -> ConstraintDescriptor {
        ConstraintDescriptor {
            constraint_name: self.constraint_name.clone(),
            child_table: self.child_table.to_string(),
            child_column: self.child_column.clone(),
            referenced_table: central.to_string(),
            referenced_column: self.referenced_column.clone(),
        }
    }
}

/// The one-hop neighborhood of a table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborhoodResponse {
    /// Always zero or one element
    pub central_table_metadata: Vec<TableDescriptor>,
    pub parent_tables_metadata: Vec<TableDescriptor>,
    pub child_tables_metadata: Vec<TableDescriptor>,
    /// Parent constraints first, then child constraints
    pub constraint_details: Vec<ConstraintDescriptor>,
}

impl NeighborhoodResponse {
    /// The empty-shaped body returned for tables that are not in the catalog
    pub fn empty() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_wire_names() {
        let column = ColumnDescriptor::new("email", "varchar").with_max_length(255);
        let json = serde_json::to_value(&column).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "COLUMN_NAME": "email",
                "DATA_TYPE": "varchar",
                "CHARACTER_MAXIMUM_LENGTH": 255,
                "PRIMARY_KEY": false,
                "NULLABLE": true,
                "IDENTITY": false
            })
        );

        let id = ColumnDescriptor::new("id", "integer").primary_key().identity();
        let json = serde_json::to_value(&id).unwrap();
        assert!(json["CHARACTER_MAXIMUM_LENGTH"].is_null());
        assert_eq!(json["NULLABLE"], false);
    }

    #[test]
    fn test_constraint_shape_is_direction_free() {
        let central = TableName::parse("orders").unwrap();
        let parent = ParentEdge {
            constraint_name: "fk_orders_customer".to_string(),
            child_column: "customer_id".to_string(),
            referenced_table: TableName::from_catalog("customers"),
            referenced_column: "id".to_string(),
        }
        .to_constraint(&central);
        let child = ChildEdge {
            constraint_name: "fk_items_order".to_string(),
            child_table: TableName::from_catalog("order_items"),
            child_column: "order_id".to_string(),
            referenced_column: "id".to_string(),
        }
        .to_constraint(&central);

        assert_eq!(parent.child_table, "orders");
        assert_eq!(parent.referenced_table, "customers");
        assert_eq!(child.child_table, "order_items");
        assert_eq!(child.referenced_table, "orders");

        let json = serde_json::to_string(&parent).unwrap();
        assert_eq!(
            json,
            r#"{"ConstraintName":"fk_orders_customer","ChildTable":"orders","ChildColumn":"customer_id","ReferencedTable":"customers","ReferencedColumn":"id"}"#
        );
    }

    #[test]
    fn test_empty_response_keeps_key_order() {
        let json = serde_json::to_string(&NeighborhoodResponse::empty()).unwrap();
        assert_eq!(
            json,
            r#"{"central_table_metadata":[],"parent_tables_metadata":[],"child_tables_metadata":[],"constraint_details":[]}"#
        );
    }

    #[test]
    fn test_missing_table_has_no_columns() {
        let name = TableName::parse("ghost").unwrap();
        let descriptor = TableDescriptor::missing(&name);
        assert!(!descriptor.exists());
        assert_eq!(descriptor.total_rows, 0);
    }
}
