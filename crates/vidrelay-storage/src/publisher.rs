//! Publishing a finished local file under a key and composing its public URL.

use crate::keys::validate_storage_key;
use crate::traits::{Storage, StorageResult};
use crate::url::PublicUrl;
use std::path::Path;
use std::sync::Arc;

/// A storage backend paired with the rule that turns its keys into public URLs.
#[derive(Clone)]
pub struct ObjectPublisher {
    storage: Arc<dyn Storage>,
    public_url: PublicUrl,
}

impl ObjectPublisher {
    pub fn new(storage: Arc<dyn Storage>, public_url: PublicUrl) -> Self {
        Self {
            storage,
            public_url,
        }
    }

    /// Store `local_path` under `key` and return the URL clients should use.
    ///
    /// The URL is only returned after the backend has acknowledged the write.
    #[tracing::instrument(skip(self, local_path), fields(backend = %self.storage.backend_type()))]
    pub async fn publish(
        &self,
        local_path: &Path,
        key: &str,
        content_type: &str,
    ) -> StorageResult<String> {
        validate_storage_key(key)?;
        let size = self
            .storage
            .upload_file(key, local_path, content_type)
            .await?;
        let url = self.public_url.compose(key);

        tracing::debug!(key = %key, size_bytes = size, url = %url, "Object published");
        Ok(url)
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    pub fn public_url(&self) -> &PublicUrl {
        &self.public_url
    }
}

impl std::fmt::Debug for ObjectPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectPublisher")
            .field("backend", &self.storage.backend_type())
            .field("public_url", &self.public_url)
            .finish()
    }
}
