//! Shared error types for the services crate.

use thiserror::Error;

use challenge_core::model::{BaseUrlError, SettingsError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted while paging through the remote document list.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SyncError {
    #[error("document list request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("malformed document list response: {0}")]
    MalformedResponse(String),
    #[error("stopped after {limit} pages; the server kept returning a cursor")]
    PageLimitExceeded { limit: usize },
}

impl SyncError {
    /// True for network failures and non-2xx statuses.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::HttpStatus(_) | Self::Http(_))
    }
}

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RefreshError {
    #[error("a refresh is already in progress")]
    AlreadyRunning,
    #[error("no settings have been saved yet")]
    NotConfigured,
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors in client configuration taken from the environment.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error(transparent)]
    BaseUrl(#[from] BaseUrlError),
    #[error("{var} must be a positive integer, got {raw:?}")]
    InvalidNumber { var: &'static str, raw: String },
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
