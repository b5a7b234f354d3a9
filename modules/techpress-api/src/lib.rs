//! HTTP surface for the ingestion core.

pub mod error;
pub mod rest;

use std::sync::Arc;

use axum::http::{header, HeaderValue};
use axum::routing::{get, post};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use techpress_ingest::Ingestor;

pub struct AppState {
    pub ingestor: Ingestor,
}

impl AppState {
    pub fn new(ingestor: Ingestor) -> Self {
        Self { ingestor }
    }
}

/// Full router with the production middleware stack.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(rest::health))
        // Read path
        .route("/api/content", get(rest::list_content))
        // News
        .route("/api/news/search", post(rest::news::search))
        .route("/api/news/ingest", post(rest::news::ingest))
        // Products
        .route("/api/products", post(rest::products::ingest))
        .route("/api/products/scrape", post(rest::products::scrape))
        .with_state(state)
        // CORS: any origin, method and header; preflight answered here
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(CompressionLayer::new())
        // Logging layer: method + path only
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            }),
        )
}
