//! Request orchestrator
//!
//! Drives one neighborhood request through its stages:
//!
//! ```text
//! Validating -> FetchingCentral -> NotFound
//!                               -> Expanding -> Assembling -> Done
//! ```
//!
//! Validation, central fetch and expansion can each end the request early
//! with an error.

use crate::assemble::assemble;
use crate::describe::TableDescriptorBuilder;
use crate::expand::RelationshipExpander;
use dbscan_core::{
    Error, MetadataStore, NeighborhoodConfig, NeighborhoodResponse, Result, StoreError,
    TableName,
};
use dbscan_telemetry::{neighborhood_span, record_outcome};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

/// Where a request is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStage {
    Validating,
    FetchingCentral,
    Expanding,
    Assembling,
    Done,
    NotFound,
    Errored,
}

impl RequestStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStage::Validating => "validating",
            RequestStage::FetchingCentral => "fetching_central",
            RequestStage::Expanding => "expanding",
            RequestStage::Assembling => "assembling",
            RequestStage::Done => "done",
            RequestStage::NotFound => "not_found",
            RequestStage::Errored => "errored",
        }
    }
}

impl fmt::Display for RequestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single entry point for neighborhood lookups.
///
/// Holds no per-request state, so one instance serves every request.
#[derive(Clone)]
pub struct NeighborhoodService {
    store: Arc<dyn MetadataStore>,
    describer: TableDescriptorBuilder,
    expander: RelationshipExpander,
    request_timeout: Duration,
}

impl NeighborhoodService {
    pub fn new(store: Arc<dyn MetadataStore>, config: &NeighborhoodConfig) -> Self {
        Self {
            describer: TableDescriptorBuilder::new(store.clone()),
            expander: RelationshipExpander::new(store.clone(), config),
            store,
            request_timeout: config.request_timeout(),
        }
    }

    /// Override the request timeout taken from configuration
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// The store this service reads from
    pub fn store(&self) -> &Arc<dyn MetadataStore> {
        &self.store
    }

    /// Describe `table_name` and its one-hop foreign-key neighborhood.
    ///
    /// Fails with `MissingIdentifier` for an empty name, `InvalidIdentifier`
    /// for anything outside `[A-Za-z0-9_]`, `NotFound` when the catalog has no
    /// such table (relationships are not expanded), and `StoreUnavailable`
    /// for any store fault or when the request timeout expires.
    pub async fn get_neighborhood(&self, table_name: &str) -> Result<NeighborhoodResponse> {
        let span = neighborhood_span(table_name);
        let result = self.run(table_name).instrument(span.clone()).await;

        let terminal = match &result {
            Ok(_) => RequestStage::Done,
            Err(Error::NotFound(_)) => RequestStage::NotFound,
            Err(_) => RequestStage::Errored,
        };
        record_outcome(&span, terminal.as_str());

        match &result {
            Ok(response) => tracing::info!(
                table = %table_name,
                parents = response.parent_tables_metadata.len(),
                children = response.child_tables_metadata.len(),
                constraints = response.constraint_details.len(),
                "Returning metadata for table"
            ),
            Err(Error::NotFound(_)) => {
                tracing::info!(table = %table_name, "No metadata found for table")
            }
            Err(e) => {
                tracing::warn!(table = %table_name, error = %e, "Neighborhood request failed")
            }
        }

        result
    }

    async fn run(&self, table_name: &str) -> Result<NeighborhoodResponse> {
        tracing::debug!(stage = %RequestStage::Validating);
        if table_name.is_empty() {
            return Err(Error::MissingIdentifier);
        }
        let table = TableName::parse(table_name)?;

        tokio::time::timeout(self.request_timeout, self.fetch(&table))
            .await
            .map_err(|_| {
                tracing::error!(
                    table = %table,
                    timeout_secs = self.request_timeout.as_secs_f64(),
                    "Neighborhood request timed out"
                );
                Error::StoreUnavailable(StoreError::Timeout)
            })?
    }

    async fn fetch(&self, table: &TableName) -> Result<NeighborhoodResponse> {
        tracing::debug!(stage = %RequestStage::FetchingCentral);
        let central = self.describer.describe(table).await?;
        if !central.exists() {
            return Err(Error::NotFound(table.to_string()));
        }

        tracing::debug!(stage = %RequestStage::Expanding);
        let expansion = self.expander.expand(table).await?;

        tracing::debug!(stage = %RequestStage::Assembling);
        Ok(assemble(central, expansion))
    }
}
