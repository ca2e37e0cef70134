//! Vidrelay Storage Library
//!
//! This crate provides the storage abstraction used to publish processed uploads, with
//! implementations for S3-compatible object stores and the local filesystem.
//!
//! # Publishing
//!
//! [`ObjectPublisher`] pairs a [`Storage`] backend with a [`PublicUrl`] composition rule.
//! The rule is configuration: switching from direct bucket URLs to a CDN distribution
//! never touches pipeline code.
//!
//! Keys must not contain `..` or a leading `/`.

pub mod factory;
pub(crate) mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod publisher;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;
pub mod url;

// Re-export commonly used types
pub use factory::{create_storage, create_thumbnail_publisher, create_video_publisher};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use publisher::ObjectPublisher;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
pub use url::PublicUrl;
pub use vidrelay_core::StorageBackend;
