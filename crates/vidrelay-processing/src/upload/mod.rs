//! Upload flow: staging, key derivation and the pipeline that ties the steps together.

pub mod error;
pub mod keys;
pub mod pipeline;
pub mod staging;

pub use error::PipelineError;
pub use keys::{derive_key, extension_for, parse_media_type, random_token, KeyStrategy, StorageKey};
pub use pipeline::{
    PipelineVariant, RecordField, UploadOutcome, UploadPipeline, UploadRequest,
};
pub use staging::{stage_stream, StagedFile, StagingError};
