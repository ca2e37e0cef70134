//! Media-type parsing and storage key derivation.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::RngCore;
use std::fmt;
use uuid::Uuid;
use vidrelay_core::ThumbnailKeyScheme;

use super::error::PipelineError;
use crate::video::probe::AspectClassification;

const TOKEN_BYTES: usize = 32;

/// How the stem of a storage key is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStrategy {
    /// `{classification}/{token}{ext}`
    ClassifiedRandom,
    /// `{token}{ext}`
    Random,
    /// `{record_id}{ext}`
    RecordId,
}

impl From<ThumbnailKeyScheme> for KeyStrategy {
    fn from(scheme: ThumbnailKeyScheme) -> Self {
        match scheme {
            ThumbnailKeyScheme::Random => KeyStrategy::Random,
            ThumbnailKeyScheme::RecordId => KeyStrategy::RecordId,
        }
    }
}

/// Object key a file is published under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey(String);

impl StorageKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 32 random bytes, base64url without padding.
pub fn random_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Build the key for a file.
///
/// `ClassifiedRandom` files without a classification are filed under `other`.
pub fn derive_key(
    strategy: KeyStrategy,
    classification: Option<AspectClassification>,
    record_id: Uuid,
    extension: &str,
) -> StorageKey {
    let key = match strategy {
        KeyStrategy::ClassifiedRandom => format!(
            "{}/{}{}",
            classification.unwrap_or(AspectClassification::Other),
            random_token(),
            extension
        ),
        KeyStrategy::Random => format!("{}{}", random_token(), extension),
        KeyStrategy::RecordId => format!("{}{}", record_id, extension),
    };
    StorageKey(key)
}

/// Normalize a Content-Type header value to its `type/subtype` essence.
pub fn parse_media_type(raw: &str) -> Result<String, PipelineError> {
    let essence = raw.split(';').next().unwrap_or("").trim().to_lowercase();
    if essence.is_empty() {
        return Err(PipelineError::BadRequest(
            "Missing Content-Type for upload".to_string(),
        ));
    }

    match essence.split_once('/') {
        Some((kind, subtype))
            if !kind.is_empty() && !subtype.is_empty() && !subtype.contains('/') =>
        {
            Ok(essence)
        }
        _ => Err(PipelineError::BadRequest(format!(
            "Malformed media type: {}",
            raw
        ))),
    }
}

/// `"." + subtype`, e.g. `video/mp4` becomes `.mp4`.
pub fn extension_for(media_type: &str) -> Result<String, PipelineError> {
    match media_type.split_once('/') {
        Some((_, subtype)) if !subtype.is_empty() => Ok(format!(".{}", subtype)),
        _ => Err(PipelineError::BadRequest(format!(
            "Cannot derive an extension from {}",
            media_type
        ))),
    }
}
