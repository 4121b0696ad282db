//! HTTP server for DB Scanner

pub mod docs;
pub mod rest;
pub mod types;

pub use docs::api_document;
pub use rest::{AppError, AppState, create_router};
pub use types::{ErrorBody, MetadataQuery};
