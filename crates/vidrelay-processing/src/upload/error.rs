use thiserror::Error;
use uuid::Uuid;
use vidrelay_core::AppError;
use vidrelay_storage::StorageError;

use super::staging::StagingError;
use crate::video::faststart::RewriteError;
use crate::video::probe::ProbeError;

/// Failure of one upload pipeline run, tagged with the step that failed.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("video {0} not found")]
    NotFound(Uuid),

    #[error("caller does not own video {0}")]
    Forbidden(Uuid),

    #[error("metadata lookup failed: {0}")]
    Lookup(#[source] AppError),

    #[error("unsupported media type {media_type}")]
    UnsupportedMediaType { media_type: String },

    #[error("{0}")]
    BadRequest(String),

    #[error("upload exceeds the {limit} byte limit")]
    PayloadTooLarge { limit: u64 },

    #[error("staging failed: {0}")]
    Staging(#[source] std::io::Error),

    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error(transparent)]
    Rewrite(#[from] RewriteError),

    #[error("publish failed: {0}")]
    Publish(#[source] StorageError),

    #[error("record update failed after publish: {0}")]
    Persistence(#[source] AppError),
}

impl From<StagingError> for PipelineError {
    fn from(err: StagingError) -> Self {
        match err {
            StagingError::TooLarge { limit } => PipelineError::PayloadTooLarge { limit },
            StagingError::Empty => PipelineError::BadRequest("Upload body is empty".to_string()),
            StagingError::Io(e) => PipelineError::Staging(e),
        }
    }
}

impl PipelineError {
    /// True when an external tool ran (or failed to run) and the upload cannot continue.
    pub fn is_external_tool_failure(&self) -> bool {
        matches!(self, PipelineError::Probe(_) | PipelineError::Rewrite(_))
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::NotFound(id) => AppError::NotFound(format!("Video {} not found", id)),
            PipelineError::Forbidden(_) => {
                AppError::Forbidden("You do not own this video".to_string())
            }
            PipelineError::Lookup(e) => e,
            PipelineError::UnsupportedMediaType { media_type } => {
                AppError::UnsupportedMediaType(media_type)
            }
            PipelineError::BadRequest(msg) => AppError::BadRequest(msg),
            PipelineError::PayloadTooLarge { limit } => {
                AppError::PayloadTooLarge(format!("Maximum upload size is {} bytes", limit))
            }
            PipelineError::Staging(e) => AppError::Staging(e.to_string()),
            PipelineError::Probe(e) => match e {
                ProbeError::Launch(io) => AppError::ExternalToolLaunch {
                    tool: "ffprobe",
                    message: io.to_string(),
                },
                ProbeError::Exit { code, stderr } => AppError::ExternalToolExit {
                    tool: "ffprobe",
                    message: format!("exit code {:?}: {}", code, stderr),
                },
                other => AppError::ExternalToolOutput {
                    tool: "ffprobe",
                    message: other.to_string(),
                },
            },
            PipelineError::Rewrite(e) => match e {
                RewriteError::Launch(io) => AppError::ExternalToolLaunch {
                    tool: "ffmpeg",
                    message: io.to_string(),
                },
                RewriteError::Exit { code, stderr } => AppError::ExternalToolExit {
                    tool: "ffmpeg",
                    message: format!("exit code {:?}: {}", code, stderr),
                },
                RewriteError::MissingOutput(_) => AppError::ExternalToolOutput {
                    tool: "ffmpeg",
                    message: "ffmpeg produced no output file".to_string(),
                },
            },
            PipelineError::Publish(e) => AppError::Publish(e.to_string()),
            PipelineError::Persistence(e) => AppError::Persistence(e.to_string()),
        }
    }
}
