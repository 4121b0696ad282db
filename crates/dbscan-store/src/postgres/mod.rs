//! PostgreSQL catalog reader

mod models;
mod queries;

use async_trait::async_trait;
use dbscan_core::{
    ChildEdge, ColumnDescriptor, DatabaseConfig, Error, MetadataStore, ParentEdge, Result,
    RowCountStrategy, StoreError, StoreResult, TableName,
};
use models::{ChildEdgeRow, ColumnRow, ParentEdgeRow};
use sqlx::{Pool, Postgres, postgres::PgPoolOptions};

/// Reads table metadata from a PostgreSQL catalog, scoped to one schema
pub struct PostgresMetadataStore {
    pool: Pool<Postgres>,
    schema: String,
    row_count: RowCountStrategy,
}

impl PostgresMetadataStore {
    /// Open a connection pool as described by `config`.
    ///
    /// A missing URL is a configuration error; a database that cannot be
    /// reached is reported as `StoreUnavailable`.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let url = config
            .url()
            .map_err(|e| Error::config_error(e.to_string()))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout())
            .connect(url)
            .await
            .map_err(map_sqlx_error)?;

        tracing::info!(
            schema = %config.schema,
            max_connections = config.max_connections,
            "Connected to PostgreSQL catalog"
        );

        Ok(Self::from_pool(pool, config))
    }

    /// Create from an existing pool
    pub fn from_pool(pool: Pool<Postgres>, config: &DatabaseConfig) -> Self {
        Self {
            pool,
            schema: config.schema.clone(),
            row_count: config.row_count,
        }
    }

    /// The statement used to count rows of `table`.
    ///
    /// Exact counts interpolate the table name, so names that fail the
    /// identifier gate fall back to statistics.
    fn count_statement(&self, table: &TableName) -> Option<String> {
        match self.row_count {
            RowCountStrategy::Statistics => None,
            RowCountStrategy::Exact if table.is_safe_identifier() => {
                Some(queries::exact_row_count(&self.schema, table.as_str()))
            }
            RowCountStrategy::Exact => {
                tracing::warn!(
                    table = %table,
                    "Table name is not a plain identifier, using statistics row count"
                );
                None
            }
        }
    }
}

#[async_trait]
impl MetadataStore for PostgresMetadataStore {
    async fn fetch_columns(&self, table: &TableName) -> StoreResult<Vec<ColumnDescriptor>> {
        let rows: Vec<ColumnRow> = sqlx::query_as(queries::COLUMNS)
            .bind(self.schema.as_str())
            .bind(table.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows
            .into_iter()
            .map(|row| ColumnDescriptor {
                name: row.column_name,
                data_type: row.data_type,
                max_length: row.character_maximum_length.map(i64::from),
                is_primary_key: row.is_primary_key,
                is_nullable: row.is_nullable,
                is_identity: row.is_identity,
            })
            .collect())
    }

    async fn fetch_row_count(&self, table: &TableName) -> StoreResult<u64> {
        let count: i64 = match self.count_statement(table) {
            Some(sql) => sqlx::query_scalar(&sql).fetch_one(&self.pool).await,
            None => {
                sqlx::query_scalar(queries::ROW_COUNT_STATISTICS)
                    .bind(self.schema.as_str())
                    .bind(table.as_str())
                    .fetch_one(&self.pool)
                    .await
            }
        }
        .map_err(map_sqlx_error)?;

        u64::try_from(count).map_err(|_| {
            StoreError::Malformed(format!("negative row count {count} for table {table}"))
        })
    }

    async fn fetch_parent_edges(&self, table: &TableName) -> StoreResult<Vec<ParentEdge>> {
        let rows: Vec<ParentEdgeRow> = sqlx::query_as(queries::PARENT_EDGES)
            .bind(self.schema.as_str())
            .bind(table.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows
            .into_iter()
            .map(|row| ParentEdge {
                constraint_name: row.constraint_name,
                child_column: row.child_column,
                referenced_table: TableName::from_catalog(row.referenced_table),
                referenced_column: row.referenced_column,
            })
            .collect())
    }

    async fn fetch_child_edges(&self, table: &TableName) -> StoreResult<Vec<ChildEdge>> {
        let rows: Vec<ChildEdgeRow> = sqlx::query_as(queries::CHILD_EDGES)
            .bind(self.schema.as_str())
            .bind(table.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows
            .into_iter()
            .map(|row| ChildEdge {
                constraint_name: row.constraint_name,
                child_table: TableName::from_catalog(row.child_table),
                child_column: row.child_column,
                referenced_column: row.referenced_column,
            })
            .collect())
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query(queries::PING)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }
}

/// Collapse a driver fault into the single store failure signal
fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    tracing::error!(error = %err, "PostgreSQL catalog call failed");
    match &err {
        sqlx::Error::PoolTimedOut => StoreError::Timeout,
        sqlx::Error::Io(e) => StoreError::Connection(e.to_string()),
        sqlx::Error::Tls(e) => StoreError::Connection(e.to_string()),
        sqlx::Error::PoolClosed => StoreError::Connection("connection pool is closed".to_string()),
        sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::TypeNotFound { .. } => StoreError::Malformed(err.to_string()),
        _ => StoreError::Query(err.to_string()),
    }
}
