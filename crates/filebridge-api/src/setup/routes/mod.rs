//! Route configuration and setup.
//!
//! Route groups live in [domains](domains); health checks in [health](health).

mod domains;
mod health;

use crate::api_doc::ApiDoc;
use crate::constants::{API_BASE, MULTIPART_OVERHEAD_BYTES};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::get,
    Json, Router,
};
use filebridge_core::Config;
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

const HTTP_CONCURRENCY_LIMIT: usize = 1_024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let openapi_path = format!("{}/openapi.json", API_BASE);
    let docs_path = format!("{}/docs", API_BASE);

    let body_limit = usize::try_from(config.max_file_size_bytes())
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD_BYTES);
    tracing::info!(
        body_limit,
        request_timeout_secs = config.request_timeout().as_secs(),
        http_concurrency_limit = HTTP_CONCURRENCY_LIMIT,
        "HTTP limits configured"
    );

    let app = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/live", get(health::liveness_check))
        .route(&openapi_path, get(|| async { Json(ApiDoc::openapi()) }))
        .merge(domains::file_routes(state.clone()))
        .merge(domains::bridge_routes(state.clone()))
        .merge(domains::download_routes(state.clone()))
        .merge(utoipa_rapidoc::RapiDoc::new(openapi_path.clone()).path(docs_path))
        .layer(ConcurrencyLimitLayer::new(HTTP_CONCURRENCY_LIMIT))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(DefaultBodyLimit::disable())
        .layer(TimeoutLayer::new(config.request_timeout()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PATCH,
        Method::DELETE,
        Method::OPTIONS,
    ];
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin {:?}: {}", o, e))
            })
            .collect::<Result<Vec<_>, _>>()?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}
