use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Metadata record for one uploaded video.
///
/// The record is owned by the metadata store. Upload pipelines only read `user_id` for the
/// ownership check and fill in one of the URL fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct VideoRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating a draft record
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewVideo {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl VideoRecord {
    /// Build a fresh draft owned by `user_id`.
    pub fn draft(user_id: Uuid, new: NewVideo) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            title: new.title,
            description: new.description,
            video_url: None,
            thumbnail_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}
