//! Vidrelay Processing Library
//!
//! Turns an inbound upload into a published object and an updated metadata record:
//!
//! - [`video`]: ffprobe geometry probing, the ffmpeg faststart remux and an MP4 box scanner
//! - [`upload`]: staging, key derivation and the [`UploadPipeline`] orchestrator
//!
//! External tools sit behind [`MediaProber`] and [`ContainerRewriter`] so the pipeline can
//! run with in-process fakes where ffmpeg is not installed.

pub mod upload;
pub mod video;

pub use upload::{
    derive_key, extension_for, parse_media_type, KeyStrategy, PipelineError, PipelineVariant,
    RecordField, StagedFile, StorageKey, UploadOutcome, UploadPipeline, UploadRequest,
};
pub use video::atoms::{inspect_layout, AtomLayout};
pub use video::faststart::{
    ContainerRewriter, CopyRewriter, FailingRewriter, FfmpegRewriter, RewriteError, RewrittenFile,
};
pub use video::probe::{
    AspectClassification, FfprobeProber, MediaProber, ProbeError, StaticProber,
};
