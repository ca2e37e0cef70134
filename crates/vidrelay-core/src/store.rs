//! Metadata store seam
//!
//! Upload pipelines depend on [`VideoStore`] rather than a concrete database so they can
//! run against Postgres (`vidrelay-db`) in production and the in-memory store in tests
//! and local development.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{NewVideo, VideoRecord};

/// Persistence for video metadata records.
///
/// Reads and writes are independent: there is no optimistic locking, so two uploads racing
/// on the same record resolve as last writer wins.
#[async_trait]
pub trait VideoStore: Send + Sync {
    /// Fetch a record by id.
    async fn get(&self, id: Uuid) -> Result<Option<VideoRecord>, AppError>;

    /// Persist every mutable field of `record` and return the stored version.
    async fn update(&self, record: &VideoRecord) -> Result<VideoRecord, AppError>;

    /// Create a draft record owned by `user_id`.
    async fn create(&self, user_id: Uuid, new: NewVideo) -> Result<VideoRecord, AppError>;
}

/// Process-local store backed by a `HashMap`
#[derive(Clone, Default)]
pub struct InMemoryVideoStore {
    records: Arc<RwLock<HashMap<Uuid, VideoRecord>>>,
}

impl InMemoryVideoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record as-is.
    pub async fn insert(&self, record: VideoRecord) {
        self.records.write().await.insert(record.id, record);
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl VideoStore for InMemoryVideoStore {
    async fn get(&self, id: Uuid) -> Result<Option<VideoRecord>, AppError> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn update(&self, record: &VideoRecord) -> Result<VideoRecord, AppError> {
        let mut records = self.records.write().await;
        let stored = records
            .get_mut(&record.id)
            .ok_or_else(|| AppError::NotFound(format!("Video {} not found", record.id)))?;

        *stored = VideoRecord {
            updated_at: Utc::now(),
            ..record.clone()
        };

        Ok(stored.clone())
    }

    async fn create(&self, user_id: Uuid, new: NewVideo) -> Result<VideoRecord, AppError> {
        let record = VideoRecord::draft(user_id, new);
        self.records.write().await.insert(record.id, record.clone());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_video(title: &str) -> NewVideo {
        NewVideo {
            title: title.to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let store = InMemoryVideoStore::new();
        let owner = Uuid::new_v4();

        let created = store.create(owner, new_video("first")).await.unwrap();
        let fetched = store.get(created.id).await.unwrap().unwrap();

        assert_eq!(fetched, created);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let store = InMemoryVideoStore::new();
        assert!(store.get(Uuid::new_v4()).await.unwrap().is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_update_sets_url_and_bumps_timestamp() {
        let store = InMemoryVideoStore::new();
        let mut record = store
            .create(Uuid::new_v4(), new_video("clip"))
            .await
            .unwrap();
        let created_at = record.updated_at;

        record.video_url = Some("https://cdn.example.com/other/x.mp4".to_string());
        let updated = store.update(&record).await.unwrap();

        assert_eq!(updated.video_url, record.video_url);
        assert!(updated.updated_at >= created_at);
        assert_eq!(store.get(record.id).await.unwrap().unwrap(), updated);
    }

    #[tokio::test]
    async fn test_update_missing_record_is_not_found() {
        let store = InMemoryVideoStore::new();
        let orphan = VideoRecord::draft(Uuid::new_v4(), new_video("orphan"));
        let err = store.update(&orphan).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_last_writer_wins() {
        let store = InMemoryVideoStore::new();
        let record = store
            .create(Uuid::new_v4(), new_video("race"))
            .await
            .unwrap();

        let mut first = record.clone();
        first.video_url = Some("a".to_string());
        let mut second = record.clone();
        second.video_url = Some("b".to_string());

        store.update(&first).await.unwrap();
        store.update(&second).await.unwrap();

        let stored = store.get(record.id).await.unwrap().unwrap();
        assert_eq!(stored.video_url.as_deref(), Some("b"));
    }
}
