use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::error::AppServicesError;
use crate::progress_service::ProgressService;
use crate::readwise::{ReadwiseClient, ReadwiseConfig};

/// Assembles app-facing services over a storage backend and the Readwise client.
#[derive(Clone)]
pub struct AppServices {
    progress: Arc<ProgressService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or HTTP client setup fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        config: ReadwiseConfig,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::with_storage(&storage, clock, config)
    }

    /// Build services over an existing storage aggregate.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::HttpClient` if the HTTP client cannot be built.
    pub fn with_storage(
        storage: &Storage,
        clock: Clock,
        config: ReadwiseConfig,
    ) -> Result<Self, AppServicesError> {
        let client = Arc::new(ReadwiseClient::new(config)?);
        let max_pages = client.config().max_pages;
        tracing::debug!(
            base_url = client.config().base_url.as_str(),
            max_pages,
            "readwise client ready"
        );
        let progress = Arc::new(
            ProgressService::new(clock, client, Arc::clone(&storage.snapshots))
                .with_max_pages(max_pages),
        );
        Ok(Self { progress })
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }
}
