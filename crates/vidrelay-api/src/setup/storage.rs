//! Publishers, media tools and the two upload pipelines

use anyhow::{Context, Result};
use std::sync::Arc;
use vidrelay_core::{Config, VideoStore};
use vidrelay_processing::{
    ContainerRewriter, FfmpegRewriter, FfprobeProber, KeyStrategy, MediaProber, PipelineVariant,
    UploadPipeline,
};
use vidrelay_storage::{create_thumbnail_publisher, create_video_publisher};

pub struct Pipelines {
    pub video: UploadPipeline,
    pub thumbnail: UploadPipeline,
}

pub async fn setup_pipelines(config: &Config, store: Arc<dyn VideoStore>) -> Result<Pipelines> {
    let video_publisher = create_video_publisher(config)
        .await
        .context("Failed to initialize video storage")?;
    let thumbnail_publisher = create_thumbnail_publisher(config)
        .await
        .context("Failed to initialize thumbnail storage")?;

    let prober: Arc<dyn MediaProber> = Arc::new(FfprobeProber::new(config.ffprobe_path())?);
    let rewriter: Arc<dyn ContainerRewriter> = Arc::new(FfmpegRewriter::new(config.ffmpeg_path())?);

    tokio::fs::create_dir_all(config.staging_dir())
        .await
        .with_context(|| {
            format!(
                "Failed to create staging directory {}",
                config.staging_dir().display()
            )
        })?;

    let video_variant = PipelineVariant::video(config.max_video_size_bytes() as u64)
        .with_allowed_content_types(config.video_allowed_content_types().to_vec());
    let thumbnail_variant = PipelineVariant::thumbnail(
        config.max_thumbnail_size_bytes() as u64,
        KeyStrategy::from(config.thumbnail_key_scheme()),
    )
    .with_allowed_content_types(config.thumbnail_allowed_content_types().to_vec());

    tracing::info!(
        video_backend = %config.storage_backend(),
        thumbnail_backend = %config.thumbnail_backend(),
        thumbnail_keys = %config.thumbnail_key_scheme(),
        ffprobe_path = %config.ffprobe_path(),
        ffmpeg_path = %config.ffmpeg_path(),
        staging_dir = %config.staging_dir().display(),
        "Upload pipelines configured"
    );

    Ok(Pipelines {
        video: UploadPipeline::new(
            video_variant,
            store.clone(),
            video_publisher,
            prober.clone(),
            rewriter.clone(),
            config.staging_dir(),
        ),
        thumbnail: UploadPipeline::new(
            thumbnail_variant,
            store,
            thumbnail_publisher,
            prober,
            rewriter,
            config.staging_dir(),
        ),
    })
}
