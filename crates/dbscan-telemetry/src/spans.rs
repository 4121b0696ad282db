//! Span creation helpers for neighborhood requests and store calls

use crate::attributes::*;
use dbscan_core::StoreOperation;
use tracing::Span;

/// Span wrapping one whole neighborhood request.
///
/// The outcome field starts empty and is filled in by [`record_outcome`]
/// once the request reaches a terminal state.
pub fn neighborhood_span(table: &str) -> Span {
    tracing::info_span!(
        "neighborhood_request",
        { DBSCAN_TABLE } = %table,
        { DBSCAN_OUTCOME } = tracing::field::Empty,
    )
}

/// Span wrapping one metadata store call
pub fn store_call_span(operation: StoreOperation, table: &str) -> Span {
    tracing::debug_span!(
        "store_call",
        { DB_SYSTEM } = SYSTEM_NAME,
        { DB_OPERATION_NAME } = operation.as_str(),
        { DB_COLLECTION_NAME } = %table,
    )
}

pub fn record_outcome(span: &Span, outcome: &str) {
    span.record(DBSCAN_OUTCOME, outcome);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighborhood_span() {
        let span = neighborhood_span("orders");
        record_outcome(&span, "done");
        let _guard = span.enter();
    }

    #[test]
    fn test_store_call_span() {
        let span = store_call_span(StoreOperation::ParentEdges, "orders");
        let _guard = span.enter();
    }
}
