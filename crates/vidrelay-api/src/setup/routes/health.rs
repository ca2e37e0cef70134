//! Health check handler and response types.

use crate::constants::HEALTH_CHECK_TIMEOUT_SECS;
use crate::state::AppState;
use axum::{http::StatusCode, response::IntoResponse, Json};
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

const HEALTH_CHECK_KEY: &str = "health-check-non-existent-key";

/// Run an async check with timeout; returns status string "healthy", "timeout", or "{prefix}: {error}".
async fn run_check<F, E>(timeout: Duration, f: F, error_prefix: &str) -> String
where
    F: Future<Output = Result<(), E>>,
    E: Display,
{
    match tokio::time::timeout(timeout, f).await {
        Ok(Ok(())) => "healthy".to_string(),
        Ok(Err(e)) => format!("{}: {}", error_prefix, e),
        Err(_) => "timeout".to_string(),
    }
}

#[derive(serde::Serialize)]
pub(super) struct HealthCheckResponse {
    pub status: String,
    pub database: String,
    pub video_storage: String,
    pub thumbnail_storage: String,
}

impl HealthCheckResponse {
    fn is_healthy(&self) -> bool {
        [&self.database, &self.video_storage, &self.thumbnail_storage]
            .iter()
            .all(|s| s.as_str() == "healthy")
    }
}

/// Checks the metadata store and both storage backends.
pub async fn health_check(state: Arc<AppState>) -> impl IntoResponse {
    let timeout = Duration::from_secs(HEALTH_CHECK_TIMEOUT_SECS);

    let database = run_check(
        timeout,
        async { state.store.get(Uuid::nil()).await.map(|_| ()) },
        "unhealthy",
    )
    .await;

    let video_storage = run_check(
        timeout,
        async {
            state
                .video_pipeline
                .publisher()
                .storage()
                .exists(HEALTH_CHECK_KEY)
                .await
                .map(|_| ())
        },
        "unhealthy",
    )
    .await;

    let thumbnail_storage = run_check(
        timeout,
        async {
            state
                .thumbnail_pipeline
                .publisher()
                .storage()
                .exists(HEALTH_CHECK_KEY)
                .await
                .map(|_| ())
        },
        "unhealthy",
    )
    .await;

    let mut response = HealthCheckResponse {
        status: String::new(),
        database,
        video_storage,
        thumbnail_storage,
    };

    let status = if response.is_healthy() {
        response.status = "healthy".to_string();
        StatusCode::OK
    } else {
        tracing::warn!(
            database = %response.database,
            video_storage = %response.video_storage,
            thumbnail_storage = %response.thumbnail_storage,
            "Health check failed"
        );
        response.status = "degraded".to_string();
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}
