//! Upload pipeline: authorize → validate → stage → probe → rewrite → publish → record.
//!
//! One [`UploadPipeline`] serves both the video and the thumbnail flow; the differences live
//! in its [`PipelineVariant`]. Every temp file is held by an RAII guard, so every exit path
//! (including a dropped future) leaves the staging directory as it found it.

use bytes::Bytes;
use futures::stream::BoxStream;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

use vidrelay_core::{VideoRecord, VideoStore};
use vidrelay_storage::ObjectPublisher;

use super::error::PipelineError;
use super::keys::{derive_key, extension_for, parse_media_type, KeyStrategy, StorageKey};
use super::staging::stage_stream;
use crate::video::atoms::{inspect_layout, AtomLayout};
use crate::video::faststart::ContainerRewriter;
use crate::video::probe::MediaProber;

/// Which URL field of the record an upload fills in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordField {
    VideoUrl,
    ThumbnailUrl,
}

impl RecordField {
    fn apply(&self, record: &mut VideoRecord, url: String) {
        match self {
            RecordField::VideoUrl => record.video_url = Some(url),
            RecordField::ThumbnailUrl => record.thumbnail_url = Some(url),
        }
    }
}

/// Configuration of one upload flow.
#[derive(Debug, Clone)]
pub struct PipelineVariant {
    pub name: &'static str,
    /// Multipart form field the file arrives in
    pub field: &'static str,
    pub allowed_content_types: Vec<String>,
    pub max_bytes: u64,
    pub probe: bool,
    pub rewrite: bool,
    pub key_strategy: KeyStrategy,
    pub record_field: RecordField,
}

impl PipelineVariant {
    pub fn video(max_bytes: u64) -> Self {
        Self {
            name: "video",
            field: "video",
            allowed_content_types: vec!["video/mp4".to_string()],
            max_bytes,
            probe: true,
            rewrite: true,
            key_strategy: KeyStrategy::ClassifiedRandom,
            record_field: RecordField::VideoUrl,
        }
    }

    pub fn thumbnail(max_bytes: u64, key_strategy: KeyStrategy) -> Self {
        Self {
            name: "thumbnail",
            field: "thumbnail",
            allowed_content_types: vec!["image/jpeg".to_string(), "image/png".to_string()],
            max_bytes,
            probe: false,
            rewrite: false,
            key_strategy,
            record_field: RecordField::ThumbnailUrl,
        }
    }

    /// Narrow the allow-list. Entries are compared against the parsed media type; types the
    /// variant cannot publish (anything outside its default list) are dropped.
    pub fn with_allowed_content_types(mut self, types: Vec<String>) -> Self {
        let supported = std::mem::take(&mut self.allowed_content_types);
        self.allowed_content_types = types
            .into_iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| supported.contains(t))
            .collect();
        self
    }

    fn allows(&self, media_type: &str) -> bool {
        self.allowed_content_types.iter().any(|t| t == media_type)
    }
}

/// One inbound upload. The body may borrow from the request it was read from.
pub struct UploadRequest<'a> {
    pub record_id: Uuid,
    /// User id taken from the verified bearer token
    pub principal: Uuid,
    pub body: BoxStream<'a, io::Result<Bytes>>,
    /// Raw Content-Type of the file part; parameters are allowed
    pub content_type: String,
    pub declared_length: Option<u64>,
}

impl std::fmt::Debug for UploadRequest<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadRequest")
            .field("record_id", &self.record_id)
            .field("principal", &self.principal)
            .field("content_type", &self.content_type)
            .field("declared_length", &self.declared_length)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub record: VideoRecord,
    pub key: StorageKey,
    pub url: String,
}

#[derive(Clone)]
pub struct UploadPipeline {
    variant: PipelineVariant,
    store: Arc<dyn VideoStore>,
    publisher: ObjectPublisher,
    prober: Arc<dyn MediaProber>,
    rewriter: Arc<dyn ContainerRewriter>,
    staging_dir: PathBuf,
}

impl UploadPipeline {
    pub fn new(
        variant: PipelineVariant,
        store: Arc<dyn VideoStore>,
        publisher: ObjectPublisher,
        prober: Arc<dyn MediaProber>,
        rewriter: Arc<dyn ContainerRewriter>,
        staging_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            variant,
            store,
            publisher,
            prober,
            rewriter,
            staging_dir: staging_dir.into(),
        }
    }

    pub fn variant(&self) -> &PipelineVariant {
        &self.variant
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    pub fn publisher(&self) -> &ObjectPublisher {
        &self.publisher
    }

    #[tracing::instrument(skip(self, request), fields(
        variant = self.variant.name,
        record_id = %request.record_id,
        principal = %request.principal
    ))]
    pub async fn process(
        &self,
        request: UploadRequest<'_>,
    ) -> Result<UploadOutcome, PipelineError> {
        let start = std::time::Instant::now();
        let UploadRequest {
            record_id,
            principal,
            body,
            content_type,
            declared_length,
        } = request;

        let mut record = self
            .store
            .get(record_id)
            .await
            .map_err(PipelineError::Lookup)?
            .ok_or(PipelineError::NotFound(record_id))?;
        if !record.is_owned_by(principal) {
            return Err(PipelineError::Forbidden(record_id));
        }

        let media_type = parse_media_type(&content_type)?;
        if !self.variant.allows(&media_type) {
            return Err(PipelineError::UnsupportedMediaType { media_type });
        }
        let extension = extension_for(&media_type)?;

        if let Some(length) = declared_length {
            if length > self.variant.max_bytes {
                return Err(PipelineError::PayloadTooLarge {
                    limit: self.variant.max_bytes,
                });
            }
        }

        let staged = stage_stream(&self.staging_dir, &extension, body, self.variant.max_bytes)
            .await?;

        let classification = if self.variant.probe {
            Some(self.prober.probe(staged.path()).await?)
        } else {
            None
        };

        let rewritten = if self.variant.rewrite {
            let rewritten = self.rewriter.rewrite(staged.path()).await?;
            check_layout(rewritten.path()).await;
            Some(rewritten)
        } else {
            None
        };

        let key = derive_key(
            self.variant.key_strategy,
            classification,
            record.id,
            &extension,
        );

        let publish_path = rewritten
            .as_ref()
            .map(|r| r.path())
            .unwrap_or_else(|| staged.path());
        let url = self
            .publisher
            .publish(publish_path, key.as_str(), &media_type)
            .await
            .map_err(PipelineError::Publish)?;

        self.variant.record_field.apply(&mut record, url.clone());
        let record = self.store.update(&record).await.map_err(|e| {
            tracing::error!(
                error = %e,
                key = %key,
                url = %url,
                "Object published but record update failed; object is orphaned"
            );
            PipelineError::Persistence(e)
        })?;

        tracing::info!(
            key = %key,
            url = %url,
            size_bytes = staged.size(),
            classification = classification.map(|c| c.as_str()),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Upload processed"
        );

        Ok(UploadOutcome { record, key, url })
    }
}

async fn check_layout(path: &Path) {
    match inspect_layout(path).await {
        Ok(AtomLayout::Faststart) => {
            tracing::debug!(path = %path.display(), "moov precedes mdat");
        }
        Ok(layout) => {
            tracing::warn!(
                path = %path.display(),
                layout = ?layout,
                "Rewritten file is not laid out for progressive download"
            );
        }
        Err(e) => {
            tracing::warn!(error = %e, path = %path.display(), "Could not inspect rewritten file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_defaults() {
        let video = PipelineVariant::video(1 << 30);
        assert_eq!(video.field, "video");
        assert!(video.probe && video.rewrite);
        assert_eq!(video.key_strategy, KeyStrategy::ClassifiedRandom);
        assert_eq!(video.record_field, RecordField::VideoUrl);
        assert!(video.allows("video/mp4"));
        assert!(!video.allows("video/quicktime"));

        let thumb = PipelineVariant::thumbnail(10 << 20, KeyStrategy::RecordId);
        assert_eq!(thumb.field, "thumbnail");
        assert!(!thumb.probe && !thumb.rewrite);
        assert!(thumb.allows("image/png"));
        assert!(thumb.allows("image/jpeg"));
        assert!(!thumb.allows("image/gif"));
    }

    #[test]
    fn test_allow_list_override_is_lowercased() {
        let video =
            PipelineVariant::video(1).with_allowed_content_types(vec!["Video/MP4".to_string()]);
        assert!(video.allows("video/mp4"));
    }

    #[test]
    fn test_allow_list_override_cannot_widen() {
        let video = PipelineVariant::video(1).with_allowed_content_types(vec![
            "video/mp4".to_string(),
            "video/quicktime".to_string(),
        ]);
        assert!(video.allows("video/mp4"));
        assert!(!video.allows("video/quicktime"));

        let thumb = PipelineVariant::thumbnail(1, KeyStrategy::Random)
            .with_allowed_content_types(vec!["image/png".to_string(), "image/gif".to_string()]);
        assert!(thumb.allows("image/png"));
        assert!(!thumb.allows("image/jpeg"));
        assert!(!thumb.allows("image/gif"));
    }
}
