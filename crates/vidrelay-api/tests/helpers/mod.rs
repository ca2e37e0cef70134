#![allow(dead_code)]

pub mod auth;

use axum_test::TestServer;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;
use vidrelay_api::setup::routes::setup_routes;
use vidrelay_api::AppState;
use vidrelay_core::{
    BaseConfig, Config, InMemoryVideoStore, MediaConfig, NewVideo, StorageBackend,
    ThumbnailKeyScheme, VideoRecord, VideoStore,
};
use vidrelay_processing::{
    ContainerRewriter, CopyRewriter, KeyStrategy, MediaProber, PipelineVariant, StaticProber,
    UploadPipeline,
};
use vidrelay_storage::{LocalStorage, ObjectPublisher, PublicUrl};

pub const CDN: &str = "https://d111111abcdef8.cloudfront.net";
pub const ASSETS_BASE_URL: &str = "http://localhost:8091/assets";
pub const JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// Test application state
pub struct TestApp {
    pub server: TestServer,
    pub store: InMemoryVideoStore,
    pub staging: PathBuf,
    pub objects: PathBuf,
    pub assets: PathBuf,
    _root: TempDir,
}

impl TestApp {
    /// Get the HTTP test client
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Insert a draft owned by `owner` directly into the store.
    pub async fn seed_video(&self, owner: Uuid) -> VideoRecord {
        self.store
            .create(
                owner,
                NewVideo {
                    title: "rooftop session".to_string(),
                    description: None,
                },
            )
            .await
            .expect("seed video")
    }

    /// Number of entries left in the staging directory.
    pub fn staging_entries(&self) -> usize {
        std::fs::read_dir(&self.staging)
            .map(|dir| dir.count())
            .unwrap_or(0)
    }
}

pub fn test_config(root: &Path, max_thumbnail_size_bytes: usize) -> Config {
    Config(Box::new(MediaConfig {
        base: BaseConfig {
            server_port: 8091,
            cors_origins: vec!["*".to_string()],
            environment: "test".to_string(),
            jwt_secret: JWT_SECRET.to_string(),
            database_url: None,
            db_max_connections: 1,
            db_timeout_seconds: 1,
        },
        storage_backend: StorageBackend::Local,
        s3_bucket: None,
        s3_region: None,
        s3_endpoint: None,
        aws_region: None,
        cf_distribution: None,
        thumbnail_backend: StorageBackend::Local,
        assets_root: root.join("assets"),
        assets_base_url: ASSETS_BASE_URL.to_string(),
        thumbnail_key_scheme: ThumbnailKeyScheme::Random,
        max_video_size_bytes: 8 * 1024 * 1024,
        max_thumbnail_size_bytes,
        video_allowed_content_types: vec!["video/mp4".to_string()],
        thumbnail_allowed_content_types: vec!["image/jpeg".to_string(), "image/png".to_string()],
        ffmpeg_path: "ffmpeg".to_string(),
        ffprobe_path: "ffprobe".to_string(),
        staging_dir: root.join("staging"),
    }))
}

/// Setup a test application with a landscape prober
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(StaticProber::dimensions(1920, 1080), 64 * 1024).await
}

/// Setup a test application with in-memory records, local storage and fake media tools
pub async fn setup_test_app_with(prober: StaticProber, max_thumbnail_size_bytes: usize) -> TestApp {
    let root = tempfile::tempdir().expect("temp dir");
    let config = test_config(root.path(), max_thumbnail_size_bytes);
    let objects = root.path().join("objects");
    std::fs::create_dir_all(config.staging_dir()).expect("staging dir");

    let store = InMemoryVideoStore::new();
    let shared_store: Arc<dyn VideoStore> = Arc::new(store.clone());
    let prober: Arc<dyn MediaProber> = Arc::new(prober);
    let rewriter: Arc<dyn ContainerRewriter> = Arc::new(CopyRewriter);

    let video_publisher = ObjectPublisher::new(
        Arc::new(LocalStorage::new(&objects).await.expect("object storage")),
        PublicUrl::Distribution {
            base: CDN.to_string(),
        },
    );
    let thumbnail_publisher = ObjectPublisher::new(
        Arc::new(
            LocalStorage::new(config.assets_root())
                .await
                .expect("asset storage"),
        ),
        PublicUrl::BaseUrl {
            base: ASSETS_BASE_URL.to_string(),
        },
    );

    let video = UploadPipeline::new(
        PipelineVariant::video(config.max_video_size_bytes() as u64),
        shared_store.clone(),
        video_publisher,
        prober.clone(),
        rewriter.clone(),
        config.staging_dir(),
    );
    let thumbnail = UploadPipeline::new(
        PipelineVariant::thumbnail(
            config.max_thumbnail_size_bytes() as u64,
            KeyStrategy::from(config.thumbnail_key_scheme()),
        ),
        shared_store.clone(),
        thumbnail_publisher,
        prober,
        rewriter,
        config.staging_dir(),
    );

    let state = Arc::new(AppState::new(config.clone(), shared_store, video, thumbnail));
    let router = setup_routes(&config, state).expect("routes");
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        store,
        staging: config.staging_dir().to_path_buf(),
        objects,
        assets: config.assets_root().to_path_buf(),
        _root: root,
    }
}
