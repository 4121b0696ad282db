//! Self-description of the HTTP API

use openapiv3::OpenAPI;

const API_DOCUMENT: &str = include_str!("../openapi.json");

/// The OpenAPI document served at `/docs`
pub fn api_document() -> Result<OpenAPI, serde_json::Error> {
    serde_json::from_str(API_DOCUMENT)
}
