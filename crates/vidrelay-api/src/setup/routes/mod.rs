//! Route configuration and setup.
//!
//! Domain route groups live in [domains](domains); the health check in [health](health).

mod domains;
mod health;

use crate::api_doc::ApiDoc;
use crate::auth::middleware::auth_middleware;
use crate::state::AppState;
use axum::{
    http::{HeaderValue, Method},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;
use vidrelay_core::{Config, StorageBackend};

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let public_routes = public_routes(state.clone());
    let protected_routes = domains::video_routes(state.clone())
        .merge(domains::thumbnail_routes(state.clone()))
        .route_layer(axum::middleware::from_fn_with_state(
            state.jwt.clone(),
            auth_middleware,
        ));

    let mut app = public_routes
        .merge(protected_routes)
        .with_state(state)
        .route(
            "/api/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .merge(RapiDoc::new("/api/openapi.json").path("/docs"));

    if config.thumbnail_backend() == StorageBackend::Local {
        tracing::info!(
            root = %config.assets_root().display(),
            "Serving local thumbnails under /assets"
        );
        app = app.nest_service("/assets", ServeDir::new(config.assets_root()));
    }

    Ok(app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors),
    ))
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];
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
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}

fn public_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new().route(
        "/health",
        get({
            let state = state.clone();
            move || {
                let state = state.clone();
                async { health::health_check(state).await }
            }
        }),
    )
}
