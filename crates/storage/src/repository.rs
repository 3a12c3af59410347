use async_trait::async_trait;
use challenge_core::model::{Settings, SettingsError, Snapshot};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Key the snapshot record is stored under.
pub const SNAPSHOT_KEY: &str = "readwise-challenge-settings";

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("stored settings are invalid: {0}")]
    InvalidSettings(#[from] SettingsError),
}

/// Persisted JSON shape of a snapshot.
///
/// `{ "goal", "apiToken", "readTag", "numReadArticles" }`. Records written by
/// older builds used `readwiseApiToken` / `readwiseReadTag`; those keys are
/// accepted on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRecord {
    pub goal: i64,
    #[serde(alias = "readwiseApiToken")]
    pub api_token: String,
    #[serde(alias = "readwiseReadTag")]
    pub read_tag: String,
    #[serde(default)]
    pub num_read_articles: u32,
}

impl SnapshotRecord {
    #[must_use]
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let settings = snapshot.settings();
        Self {
            goal: i64::from(settings.goal()),
            api_token: settings.api_token().to_owned(),
            read_tag: settings.read_tag().to_owned(),
            num_read_articles: snapshot.current_count(),
        }
    }

    /// Convert the record back into a domain `Snapshot`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidSettings` if the stored settings fail validation.
    pub fn into_snapshot(self) -> Result<Snapshot, StorageError> {
        let settings = Settings::from_persisted(self.goal, self.api_token, self.read_tag)?;
        Ok(Snapshot::new(settings, self.num_read_articles))
    }

    /// Encode as the JSON value stored under [`SNAPSHOT_KEY`].
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if encoding fails.
    pub fn to_json(&self) -> Result<String, StorageError> {
        serde_json::to_string(self).map_err(|err| StorageError::Serialization(err.to_string()))
    }

    /// Decode a stored JSON value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the JSON does not match the record shape.
    pub fn from_json(raw: &str) -> Result<Self, StorageError> {
        serde_json::from_str(raw).map_err(|err| StorageError::Serialization(err.to_string()))
    }
}

/// Repository contract for the single persisted snapshot.
#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// Fetch the stored snapshot, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend or decoding failures.
    async fn get_snapshot(&self) -> Result<Option<Snapshot>, StorageError>;

    /// Replace the stored snapshot with `snapshot`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be stored.
    async fn save_snapshot(&self, snapshot: &Snapshot) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
///
/// Holds the encoded record so reads go through the same JSON mapping as the
/// `SQLite` backend.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    record: Arc<Mutex<Option<String>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository pre-populated with a raw JSON value, as another client might have written it.
    #[must_use]
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            record: Arc::new(Mutex::new(Some(raw.into()))),
        }
    }

    /// Stored JSON value, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn raw(&self) -> Result<Option<String>, StorageError> {
        let guard = self
            .record
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }
}

#[async_trait]
impl SnapshotRepository for InMemoryRepository {
    async fn get_snapshot(&self) -> Result<Option<Snapshot>, StorageError> {
        self.raw()?
            .map(|raw| SnapshotRecord::from_json(&raw)?.into_snapshot())
            .transpose()
    }

    async fn save_snapshot(&self, snapshot: &Snapshot) -> Result<(), StorageError> {
        let encoded = SnapshotRecord::from_snapshot(snapshot).to_json()?;
        let mut guard = self
            .record
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = Some(encoded);
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub snapshots: Arc<dyn SnapshotRepository>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use challenge_core::model::SettingsDraft;

    fn build_snapshot(count: u32) -> Snapshot {
        let settings = SettingsDraft::new(365, "tok", "2024_READ")
            .validate()
            .unwrap();
        Snapshot::new(settings, count)
    }

    #[tokio::test]
    async fn missing_snapshot_reads_as_none() {
        let repo = InMemoryRepository::new();
        assert!(repo.get_snapshot().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_overwrites_previous_snapshot() {
        let repo = InMemoryRepository::new();
        repo.save_snapshot(&build_snapshot(3)).await.unwrap();
        repo.save_snapshot(&build_snapshot(7)).await.unwrap();

        let fetched = repo.get_snapshot().await.unwrap().unwrap();
        assert_eq!(fetched, build_snapshot(7));
    }

    #[tokio::test]
    async fn stored_json_uses_documented_keys() {
        let repo = InMemoryRepository::new();
        repo.save_snapshot(&build_snapshot(12)).await.unwrap();

        let raw = repo.raw().unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "goal": 365,
                "apiToken": "tok",
                "readTag": "2024_READ",
                "numReadArticles": 12
            })
        );
    }

    #[tokio::test]
    async fn legacy_keys_are_accepted() {
        let repo = InMemoryRepository::with_raw(
            r#"{"goal":52,"readwiseApiToken":"old","readwiseReadTag":"2024_READ","numReadArticles":4}"#,
        );
        let snapshot = repo.get_snapshot().await.unwrap().unwrap();
        assert_eq!(snapshot.goal(), 52);
        assert_eq!(snapshot.settings().api_token(), "old");
        assert_eq!(snapshot.current_count(), 4);
    }

    #[tokio::test]
    async fn invalid_stored_settings_surface_as_error() {
        let repo = InMemoryRepository::with_raw(
            r#"{"goal":0,"apiToken":"tok","readTag":"t","numReadArticles":0}"#,
        );
        let err = repo.get_snapshot().await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidSettings(_)));

        let repo = InMemoryRepository::with_raw("not json");
        let err = repo.get_snapshot().await.unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }
}
