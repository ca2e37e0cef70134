//! Application state shared by every handler.

use crate::auth::JwtVerifier;
use std::sync::Arc;
use vidrelay_core::{Config, VideoStore};
use vidrelay_processing::UploadPipeline;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn VideoStore>,
    pub video_pipeline: UploadPipeline,
    pub thumbnail_pipeline: UploadPipeline,
    pub jwt: Arc<JwtVerifier>,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn VideoStore>,
        video_pipeline: UploadPipeline,
        thumbnail_pipeline: UploadPipeline,
    ) -> Self {
        let jwt = Arc::new(JwtVerifier::new(config.jwt_secret()));
        Self {
            config,
            store,
            video_pipeline,
            thumbnail_pipeline,
            jwt,
        }
    }
}
