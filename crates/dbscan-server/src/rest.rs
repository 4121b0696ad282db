use crate::docs::api_document;
use crate::types::*;
use axum::{
    Router,
    extract::{Json, Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use dbscan_core::{Error, ErrorKind, NeighborhoodResponse};
use dbscan_engine::NeighborhoodService;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

const GENERIC_SERVER_ERROR: &str = "Internal server error";

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<NeighborhoodService>,
}

pub fn create_router(service: Arc<NeighborhoodService>) -> Router {
    let state = AppState { service };

    Router::new()
        // Health check endpoints
        .route("/health", get(health_check))
        .route("/readiness", get(readiness_check))
        // API endpoints
        .route("/metadata", get(get_metadata))
        .route("/get_metadata", get(get_metadata))
        .route("/docs", get(api_docs))
        // Middleware layers (applied in reverse order)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint - returns OK if the service is running
async fn health_check() -> impl IntoResponse {
    tracing::debug!("Health check requested");
    (StatusCode::OK, "OK")
}

/// Readiness check endpoint - verifies the metadata store answers
async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    tracing::debug!("Readiness check requested");

    match state.service.store().ping().await {
        Ok(()) => (StatusCode::OK, "READY"),
        Err(e) => {
            tracing::warn!(error = %e, "Metadata store not ready");
            (StatusCode::SERVICE_UNAVAILABLE, "NOT READY")
        }
    }
}

/// Table metadata with its parent and child tables and their constraints
async fn get_metadata(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<NeighborhoodResponse>, AppError> {
    let Query(pairs) = query?;
    let table_name = MetadataQuery::from_pairs(pairs)
        .table_name
        .unwrap_or_default();
    let response = state.service.get_neighborhood(&table_name).await?;
    Ok(Json(response))
}

/// OpenAPI description of this service
async fn api_docs() -> Response {
    match api_document() {
        Ok(doc) => Json(doc).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Embedded API document is invalid");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::new(GENERIC_SERVER_ERROR)),
            )
                .into_response()
        }
    }
}

// Error handling
pub enum AppError {
    Neighborhood(Error),
    MalformedQuery(QueryRejection),
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        AppError::Neighborhood(err)
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::MalformedQuery(rejection)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let err = match self {
            AppError::Neighborhood(err) => err,
            AppError::MalformedQuery(rejection) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorBody::new(rejection.body_text())),
                )
                    .into_response();
            }
        };

        match err.kind() {
            ErrorKind::Client => (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody::new(err.to_string())),
            )
                .into_response(),
            ErrorKind::NotFound => {
                (StatusCode::NOT_FOUND, Json(NeighborhoodResponse::empty())).into_response()
            }
            ErrorKind::Server => {
                // Details stay in the server log
                tracing::error!(error = %err, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody::new(GENERIC_SERVER_ERROR)),
                )
                    .into_response()
            }
        }
    }
}
