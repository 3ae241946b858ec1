use deadpool_postgres::Pool;
use std::sync::Arc;
use crate::blob::{BlobStore, LocalBlobStore};
use crate::config::Config;
use crate::error::Result;

/// The application's state.
#[derive(Clone)]
pub struct AppState {
    /// The database connection pool.
    pub db: Pool,
    /// The application's configuration.
    pub config: Config,
    /// Storage for uploaded content.
    pub blobs: Arc<dyn BlobStore>,
}

impl AppState {
    /// Creates a new `AppState`: connects the pool, applies the schema and opens
    /// the media directory.
    ///
    /// # Arguments
    ///
    /// * `config` - The application's configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AppState`.
    pub async fn new(config: &Config) -> Result<Self> {
        let db = crate::db::create_pool(&config.database_url)?;
        tracing::info!("✅ PostgreSQL Pool initialized with deadpool-postgres");

        crate::db::run_migrations(&db).await?;

        let blobs = LocalBlobStore::new(config.media_dir.clone()).await?;

        Ok(AppState {
            db,
            config: config.clone(),
            blobs: Arc::new(blobs),
        })
    }
}
