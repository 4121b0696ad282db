//! # DB Scanner Telemetry
//!
//! Logging and OpenTelemetry integration for the neighborhood service.
//!
//! Every neighborhood request and every metadata store call gets its own span,
//! so a slow or failing catalog query can be attributed to the request and
//! the table that issued it.

mod spans;
mod tracer;

pub use spans::{neighborhood_span, record_outcome, store_call_span};
pub use tracer::{init_telemetry, register_span_processor, shutdown_telemetry};

/// Span attribute names.
///
/// Database attributes follow the OpenTelemetry semantic conventions for
/// database clients.
pub mod attributes {
    pub const DB_SYSTEM: &str = "db.system";
    pub const DB_OPERATION_NAME: &str = "db.operation.name";
    pub const DB_COLLECTION_NAME: &str = "db.collection.name";

    pub const DBSCAN_TABLE: &str = "dbscan.table";
    pub const DBSCAN_OUTCOME: &str = "dbscan.outcome";

    // System name constant
    pub const SYSTEM_NAME: &str = "dbscanner";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributes_constants() {
        assert_eq!(attributes::DB_SYSTEM, "db.system");
        assert_eq!(attributes::DB_COLLECTION_NAME, "db.collection.name");
        assert_eq!(attributes::SYSTEM_NAME, "dbscanner");
    }
}
