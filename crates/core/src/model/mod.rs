mod base_url;
mod document;
mod settings;
mod snapshot;

pub use base_url::{ApiBaseUrl, BaseUrlError};
pub use document::{DocumentFilter, DocumentLocation, DocumentPage, RemoteDocument};
pub use settings::{DEFAULT_GOAL, Settings, SettingsDraft, SettingsError, default_read_tag};
pub use snapshot::Snapshot;
