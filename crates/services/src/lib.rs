#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod progress_service;
pub mod readwise;
pub mod sync;

pub use challenge_core::Clock;

pub use app_services::AppServices;
pub use error::{AppServicesError, ConfigError, RefreshError, SyncError};
pub use progress_service::ProgressService;
pub use readwise::{ReadwiseClient, ReadwiseConfig};
pub use sync::{DEFAULT_MAX_PAGES, DocumentSource, fetch_all};
