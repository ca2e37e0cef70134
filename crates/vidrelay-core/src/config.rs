//! Configuration module
//!
//! Configuration is read once from the environment at startup (after loading an optional
//! `.env` file) and then passed around as an immutable [`Config`] value. Nothing below the
//! API setup reads process environment directly.

use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;
use std::str::FromStr;

use crate::storage_types::StorageBackend;

const SERVER_PORT: u16 = 8091;
const MAX_CONNECTIONS: u32 = 10;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const MAX_VIDEO_SIZE_MB: usize = 1024;
const MAX_THUMBNAIL_SIZE_MB: usize = 10;
const MIN_JWT_SECRET_LEN: usize = 32;

/// Media types the video flow can publish; ffmpeg always writes an MP4 container.
pub const VIDEO_CONTENT_TYPES: &[&str] = &["video/mp4"];
/// Media types the thumbnail flow can publish.
pub const THUMBNAIL_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png"];

/// How thumbnail storage keys are stemmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailKeyScheme {
    /// `{random-token}{ext}`
    Random,
    /// `{video-id}{ext}`
    RecordId,
}

impl FromStr for ThumbnailKeyScheme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "random" => Ok(ThumbnailKeyScheme::Random),
            "record_id" | "record-id" | "id" => Ok(ThumbnailKeyScheme::RecordId),
            _ => Err(anyhow::anyhow!("Invalid thumbnail key scheme: {}", s)),
        }
    }
}

impl Display for ThumbnailKeyScheme {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ThumbnailKeyScheme::Random => write!(f, "random"),
            ThumbnailKeyScheme::RecordId => write!(f, "record_id"),
        }
    }
}

/// Server-level settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub jwt_secret: String,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
}

/// Storage, tooling and upload limits
#[derive(Clone, Debug)]
pub struct MediaConfig {
    pub base: BaseConfig,
    // Video objects
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // S3-compatible providers (MinIO, etc.)
    pub aws_region: Option<String>,
    pub cf_distribution: Option<String>,
    // Thumbnails
    pub thumbnail_backend: StorageBackend,
    pub assets_root: PathBuf,
    pub assets_base_url: String,
    pub thumbnail_key_scheme: ThumbnailKeyScheme,
    // Upload limits
    pub max_video_size_bytes: usize,
    pub max_thumbnail_size_bytes: usize,
    pub video_allowed_content_types: Vec<String>,
    pub thumbnail_allowed_content_types: Vec<String>,
    // External tools
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub staging_dir: PathBuf,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<MediaConfig>);

impl Config {
    fn as_media(&self) -> &MediaConfig {
        &self.0
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = MediaConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_media().validate()
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_name(&self.as_media().base.environment)
    }

    pub fn server_port(&self) -> u16 {
        self.as_media().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_media().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.as_media().base.environment
    }

    pub fn jwt_secret(&self) -> &str {
        &self.as_media().base.jwt_secret
    }

    pub fn database_url(&self) -> Option<&str> {
        self.as_media().base.database_url.as_deref()
    }

    pub fn db_max_connections(&self) -> u32 {
        self.as_media().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.as_media().base.db_timeout_seconds
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.as_media().storage_backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.as_media().s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.as_media().s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.as_media().s3_endpoint.as_deref()
    }

    pub fn aws_region(&self) -> Option<&str> {
        self.as_media().aws_region.as_deref()
    }

    pub fn cf_distribution(&self) -> Option<&str> {
        self.as_media().cf_distribution.as_deref()
    }

    pub fn thumbnail_backend(&self) -> StorageBackend {
        self.as_media().thumbnail_backend
    }

    pub fn assets_root(&self) -> &std::path::Path {
        &self.as_media().assets_root
    }

    pub fn assets_base_url(&self) -> &str {
        &self.as_media().assets_base_url
    }

    pub fn thumbnail_key_scheme(&self) -> ThumbnailKeyScheme {
        self.as_media().thumbnail_key_scheme
    }

    pub fn max_video_size_bytes(&self) -> usize {
        self.as_media().max_video_size_bytes
    }

    pub fn max_thumbnail_size_bytes(&self) -> usize {
        self.as_media().max_thumbnail_size_bytes
    }

    pub fn video_allowed_content_types(&self) -> &[String] {
        &self.as_media().video_allowed_content_types
    }

    pub fn thumbnail_allowed_content_types(&self) -> &[String] {
        &self.as_media().thumbnail_allowed_content_types
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.as_media().ffmpeg_path
    }

    pub fn ffprobe_path(&self) -> &str {
        &self.as_media().ffprobe_path
    }

    pub fn staging_dir(&self) -> &std::path::Path {
        &self.as_media().staging_dir
    }
}

fn is_production_name(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

fn megabytes_to_bytes(name: &str, megabytes: usize) -> Result<usize, anyhow::Error> {
    megabytes
        .checked_mul(1024 * 1024)
        .ok_or_else(|| anyhow::anyhow!("{} is too large: {}", name, megabytes))
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl MediaConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins: Vec<String> = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let server_port: u16 = env::var("PORT")
            .unwrap_or_else(|_| SERVER_PORT.to_string())
            .parse()
            .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?;

        let base = BaseConfig {
            server_port,
            cors_origins,
            environment,
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set for authentication"))?,
            database_url: env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
        };

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(s) => s.parse()?,
            Err(_) => StorageBackend::S3,
        };
        let thumbnail_backend = match env::var("THUMBNAIL_BACKEND") {
            Ok(s) => s.parse()?,
            Err(_) => StorageBackend::Local,
        };
        let thumbnail_key_scheme = match env::var("THUMBNAIL_KEY_SCHEME") {
            Ok(s) => s.parse()?,
            Err(_) => ThumbnailKeyScheme::Random,
        };

        let config = MediaConfig {
            base,
            storage_backend,
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION").ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            aws_region: env::var("AWS_REGION").ok(),
            cf_distribution: env::var("S3_CF_DISTRIBUTION").ok().filter(|s| !s.is_empty()),
            thumbnail_backend,
            assets_root: env::var("ASSETS_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./assets")),
            assets_base_url: env::var("ASSETS_BASE_URL")
                .unwrap_or_else(|_| format!("http://localhost:{}/assets", server_port)),
            thumbnail_key_scheme,
            max_video_size_bytes: megabytes_to_bytes(
                "MAX_VIDEO_SIZE_MB",
                env::var("MAX_VIDEO_SIZE_MB")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(MAX_VIDEO_SIZE_MB),
            )?,
            max_thumbnail_size_bytes: megabytes_to_bytes(
                "MAX_THUMBNAIL_SIZE_MB",
                env::var("MAX_THUMBNAIL_SIZE_MB")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(MAX_THUMBNAIL_SIZE_MB),
            )?,
            video_allowed_content_types: split_list(
                &env::var("VIDEO_ALLOWED_CONTENT_TYPES").unwrap_or_else(|_| "video/mp4".into()),
            ),
            thumbnail_allowed_content_types: split_list(
                &env::var("THUMBNAIL_ALLOWED_CONTENT_TYPES")
                    .unwrap_or_else(|_| "image/jpeg,image/png".into()),
            ),
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string()),
            ffprobe_path: env::var("FFPROBE_PATH").unwrap_or_else(|_| "ffprobe".to_string()),
            staging_dir: env::var("UPLOAD_STAGING_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| env::temp_dir()),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LEN
            ));
        }

        if is_production_name(&self.base.environment)
            && self.base.cors_origins.iter().any(|o| o.trim() == "*")
        {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if let Some(url) = &self.base.database_url {
            if !(url.starts_with("postgres://") || url.starts_with("postgresql://")) {
                return Err(anyhow::anyhow!(
                    "DATABASE_URL must be a valid PostgreSQL connection string"
                ));
            }
        }

        if self.video_allowed_content_types != VIDEO_CONTENT_TYPES {
            return Err(anyhow::anyhow!(
                "VIDEO_ALLOWED_CONTENT_TYPES must be exactly: {}",
                VIDEO_CONTENT_TYPES.join(",")
            ));
        }

        if self.thumbnail_allowed_content_types.is_empty()
            || self
                .thumbnail_allowed_content_types
                .iter()
                .any(|t| !THUMBNAIL_CONTENT_TYPES.contains(&t.as_str()))
        {
            return Err(anyhow::anyhow!(
                "THUMBNAIL_ALLOWED_CONTENT_TYPES must be a non-empty subset of: {}",
                THUMBNAIL_CONTENT_TYPES.join(",")
            ));
        }

        for backend in [self.storage_backend, self.thumbnail_backend] {
            if backend == StorageBackend::S3 {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region.is_none() && self.aws_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
        }

        Ok(())
    }
}
