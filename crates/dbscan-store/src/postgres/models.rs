//! Row models for catalog queries

/// One row of the column metadata query
#[derive(Debug, Clone, sqlx::FromRow)]
pub(super) struct ColumnRow {
    pub column_name: String,
    pub data_type: String,
    pub character_maximum_length: Option<i32>,
    pub is_primary_key: bool,
    pub is_nullable: bool,
    pub is_identity: bool,
}

/// A foreign-key column pair where the inspected table is the child
#[derive(Debug, Clone, sqlx::FromRow)]
pub(super) struct ParentEdgeRow {
    pub constraint_name: String,
    pub child_column: String,
    pub referenced_table: String,
    pub referenced_column: String,
}

/// A foreign-key column pair where the inspected table is referenced
#[derive(Debug, Clone, sqlx::FromRow)]
pub(super) struct ChildEdgeRow {
    pub constraint_name: String,
    pub child_table: String,
    pub child_column: String,
    pub referenced_column: String,
}
