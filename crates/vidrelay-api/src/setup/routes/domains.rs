//! Domain route groups.

use crate::constants::{API_PREFIX, MULTIPART_OVERHEAD_BYTES};
use crate::handlers;
use crate::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::convert::Infallible;
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;

/// Both layers are needed: `DefaultBodyLimit` governs the multipart extractor and
/// `RequestBodyLimitLayer` rejects on `Content-Length` before the handler runs.
fn upload_limits(max_file_bytes: usize) -> (DefaultBodyLimit, RequestBodyLimitLayer) {
    let limit = max_file_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES);
    (
        DefaultBodyLimit::max(limit),
        RequestBodyLimitLayer::new(limit),
    )
}

pub fn video_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let (default_limit, body_limit) = upload_limits(state.config.max_video_size_bytes());

    Router::new()
        .route(
            &format!("{}/videos", API_PREFIX),
            post(handlers::videos::create_video),
        )
        .route(
            &format!("{}/videos/{{video_id}}", API_PREFIX),
            get(handlers::videos::get_video),
        )
        .route(
            &format!("{}/videos/{{video_id}}/upload", API_PREFIX),
            post(handlers::video_upload::upload_video)
                .layer::<_, Infallible>(default_limit)
                .layer(body_limit),
        )
        .with_state(state)
}

pub fn thumbnail_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let (default_limit, body_limit) = upload_limits(state.config.max_thumbnail_size_bytes());

    Router::new()
        .route(
            &format!("{}/thumbnails/{{video_id}}/upload", API_PREFIX),
            post(handlers::thumbnail_upload::upload_thumbnail)
                .layer::<_, Infallible>(default_limit)
                .layer(body_limit),
        )
        .with_state(state)
}
