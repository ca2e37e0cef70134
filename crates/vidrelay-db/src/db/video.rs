use async_trait::async_trait;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;
use vidrelay_core::{AppError, NewVideo, VideoRecord, VideoStore};

/// Postgres repository for video metadata records
#[derive(Clone)]
pub struct VideoRepository {
    pool: PgPool,
}

impl VideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select", db.record_id = %id))]
    pub async fn get_video(&self, id: Uuid) -> Result<Option<VideoRecord>, AppError> {
        let row = sqlx::query_as::<Postgres, VideoRecord>("SELECT * FROM videos WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    /// Overwrite the mutable columns of a record. No version check: last writer wins.
    #[tracing::instrument(skip(self, record), fields(db.table = "videos", db.operation = "update", db.record_id = %record.id))]
    pub async fn update_video(&self, record: &VideoRecord) -> Result<VideoRecord, AppError> {
        let row = sqlx::query_as::<Postgres, VideoRecord>(
            r#"
            UPDATE videos
            SET title = $2, description = $3, video_url = $4, thumbnail_url = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(record.id)
        .bind(&record.title)
        .bind(&record.description)
        .bind(&record.video_url)
        .bind(&record.thumbnail_url)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| AppError::NotFound(format!("Video {} not found", record.id)))
    }

    #[tracing::instrument(skip(self, new), fields(db.table = "videos", db.operation = "insert"))]
    pub async fn create_video(&self, user_id: Uuid, new: NewVideo) -> Result<VideoRecord, AppError> {
        let draft = VideoRecord::draft(user_id, new);
        let row = sqlx::query_as::<Postgres, VideoRecord>(
            r#"
            INSERT INTO videos (id, user_id, title, description, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(draft.id)
        .bind(draft.user_id)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.created_at)
        .bind(draft.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }
}

#[async_trait]
impl VideoStore for VideoRepository {
    async fn get(&self, id: Uuid) -> Result<Option<VideoRecord>, AppError> {
        self.get_video(id).await
    }

    async fn update(&self, record: &VideoRecord) -> Result<VideoRecord, AppError> {
        self.update_video(record).await
    }

    async fn create(&self, user_id: Uuid, new: NewVideo) -> Result<VideoRecord, AppError> {
        self.create_video(user_id, new).await
    }
}
