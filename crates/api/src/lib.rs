pub mod models;
pub mod openapi;
pub mod routes;

use crate::{
    openapi::ApiDoc,
    routes::{download::download, health::health_check, rewrite::rewrite},
};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use config::{ApiConfig, ServerConfig};
use inference_providers::{
    CompletionError, InferenceProvider, OpenAiCompatibleProvider, ProviderConfig,
};
use services::{
    DocumentExporter, ExportSettings, RewriteServiceImpl, RewriteServiceTrait, RewriteSettings,
};
use std::{collections::HashMap, sync::Arc};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;

/// Shared state for all handlers
#[derive(Clone)]
pub struct AppState {
    pub rewrite_service: Arc<dyn RewriteServiceTrait>,
    pub exporter: Arc<DocumentExporter>,
}

/// Connect to the configured upstream and build the services
pub fn init_services(config: &ApiConfig) -> Result<AppState, CompletionError> {
    let upstream = &config.upstream;

    let mut extra_headers = HashMap::new();
    if let Some(referer) = &upstream.referer {
        extra_headers.insert("HTTP-Referer".to_string(), referer.clone());
    }
    if let Some(title) = &upstream.title {
        extra_headers.insert("X-Title".to_string(), title.clone());
    }

    let provider = OpenAiCompatibleProvider::new(ProviderConfig {
        base_url: upstream.base_url.clone(),
        api_key: upstream.api_key.clone(),
        connect_timeout_seconds: upstream.connect_timeout_seconds,
        timeout_seconds: upstream.timeout_seconds,
        extra_headers,
    })?;

    tracing::info!(
        base_url = %upstream.base_url,
        model = %upstream.model,
        "Upstream provider configured"
    );

    Ok(init_services_with_provider(Arc::new(provider), config))
}

/// Build the services on top of an existing provider
pub fn init_services_with_provider(
    provider: Arc<dyn InferenceProvider>,
    config: &ApiConfig,
) -> AppState {
    let settings = RewriteSettings::from_config(&config.upstream, &config.rewrite);
    AppState {
        rewrite_service: Arc::new(RewriteServiceImpl::new(provider, settings)),
        exporter: Arc::new(DocumentExporter::new(ExportSettings::from(&config.export))),
    }
}

/// Build the complete application router
pub fn build_app(app_state: AppState, server_config: &ServerConfig) -> Router {
    let api_routes = Router::new()
        .route("/rewrite", post(rewrite))
        .route("/download", post(download))
        .with_state(app_state);

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health_check))
        .merge(build_openapi_routes())
        .layer(build_cors_layer(&server_config.cors_allowed_origins))
        .layer(TraceLayer::new_for_http())
}

/// Build OpenAPI documentation routes
pub fn build_openapi_routes() -> Router {
    Router::new().route(
        "/api-docs/openapi.json",
        get(|| async { axum::Json(ApiDoc::openapi()) }),
    )
}

/// Any origin when none are configured, otherwise exactly the listed ones
fn build_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if allowed_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}
