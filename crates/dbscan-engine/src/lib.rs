//! Schema-neighborhood aggregation engine
//!
//! Given one table, this crate describes it and its one-hop foreign-key
//! neighborhood: the tables it references (parents), the tables that reference
//! it (children), and every constraint involved.
//!
//! ```ignore
//! let service = NeighborhoodService::new(store, &config.neighborhood);
//! let response = service.get_neighborhood("orders").await?;
//! ```

pub mod assemble;
pub mod describe;
pub mod expand;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports
pub use assemble::assemble;
pub use describe::TableDescriptorBuilder;
pub use expand::{ExpansionResult, RelationshipExpander};
pub use service::{NeighborhoodService, RequestStage};
