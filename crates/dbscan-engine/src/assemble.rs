use crate::expand::ExpansionResult;
use dbscan_core::{NeighborhoodResponse, TableDescriptor};

/// Compose the response document. Parent constraints come before child ones.
pub fn assemble(central: TableDescriptor, expansion: ExpansionResult) -> NeighborhoodResponse {
    let ExpansionResult {
        parents,
        mut parent_constraints,
        children,
        child_constraints,
    } = expansion;

    parent_constraints.extend(child_constraints);

    NeighborhoodResponse {
        central_table_metadata: vec![central],
        parent_tables_metadata: parents,
        child_tables_metadata: children,
        constraint_details: parent_constraints,
    }
}
