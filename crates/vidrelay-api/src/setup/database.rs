//! Metadata store setup

use anyhow::Result;
use std::sync::Arc;
use vidrelay_core::{Config, InMemoryVideoStore, VideoStore};
use vidrelay_db::{connect_and_migrate, VideoRepository};

/// Postgres when `DATABASE_URL` is set, otherwise a process-local store.
pub async fn setup_database(config: &Config) -> Result<Arc<dyn VideoStore>> {
    match config.database_url() {
        Some(url) => {
            let pool = connect_and_migrate(
                url,
                config.db_max_connections(),
                config.db_timeout_seconds(),
            )
            .await?;
            Ok(Arc::new(VideoRepository::new(pool)))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, video records are kept in memory only");
            Ok(Arc::new(InMemoryVideoStore::new()))
        }
    }
}
