//! Vidrelay Core Library
//!
//! This crate provides the domain models, error types, configuration and the
//! metadata store seam shared by every vidrelay component.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;
pub mod store;

// Re-export commonly used types
pub use config::{BaseConfig, Config, MediaConfig, ThumbnailKeyScheme};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{NewVideo, VideoRecord};
pub use storage_types::StorageBackend;
pub use store::{InMemoryVideoStore, VideoStore};
