#[cfg(feature = "storage-local")]
use crate::LocalStorage;
#[cfg(feature = "storage-s3")]
use crate::S3Storage;
use crate::{ObjectPublisher, PublicUrl, Storage, StorageBackend, StorageError, StorageResult};
use std::sync::Arc;
use vidrelay_core::Config;

/// Create a storage backend based on configuration
pub async fn create_storage(
    backend: StorageBackend,
    config: &Config,
) -> StorageResult<Arc<dyn Storage>> {
    match backend {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let (bucket, region) = s3_target(config)?;
            let endpoint = config.s3_endpoint().map(String::from);

            let storage = S3Storage::new(bucket, region, endpoint).await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(StorageError::ConfigError(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let storage = LocalStorage::new(config.assets_root()).await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),
    }
}

/// Publisher for processed videos.
pub async fn create_video_publisher(config: &Config) -> StorageResult<ObjectPublisher> {
    let backend = config.storage_backend();
    let storage = create_storage(backend, config).await?;
    let public_url = public_url_for(backend, config)?;
    Ok(ObjectPublisher::new(storage, public_url))
}

/// Publisher for thumbnails.
pub async fn create_thumbnail_publisher(config: &Config) -> StorageResult<ObjectPublisher> {
    let backend = config.thumbnail_backend();
    let storage = create_storage(backend, config).await?;
    let public_url = public_url_for(backend, config)?;
    Ok(ObjectPublisher::new(storage, public_url))
}

fn public_url_for(backend: StorageBackend, config: &Config) -> StorageResult<PublicUrl> {
    match backend {
        StorageBackend::S3 => {
            let (bucket, region) = s3_target(config)?;
            Ok(PublicUrl::for_bucket(
                &bucket,
                &region,
                config.s3_endpoint(),
                config.cf_distribution(),
            ))
        }
        StorageBackend::Local => Ok(PublicUrl::BaseUrl {
            base: config.assets_base_url().to_string(),
        }),
    }
}

fn s3_target(config: &Config) -> StorageResult<(String, String)> {
    let bucket = config
        .s3_bucket()
        .map(String::from)
        .ok_or_else(|| StorageError::ConfigError("S3_BUCKET not configured".to_string()))?;
    let region = config
        .s3_region()
        .or_else(|| config.aws_region())
        .map(String::from)
        .ok_or_else(|| {
            StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
        })?;
    Ok((bucket, region))
}
