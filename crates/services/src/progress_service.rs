use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use challenge_core::model::{DocumentFilter, Settings, SettingsDraft, Snapshot};
use challenge_core::pacing::ProgressReport;
use challenge_core::tags::count_matches;
use chrono::NaiveDate;
use storage::repository::{SnapshotRepository, StorageError};
use tokio::sync::watch;

use crate::Clock;
use crate::error::RefreshError;
use crate::sync::{DEFAULT_MAX_PAGES, DocumentSource, fetch_all};

/// Syncs the read count from the remote service and keeps the stored snapshot current.
///
/// Clones share the busy flag and the snapshot channel, so at most one
/// refresh runs across all of them.
#[derive(Clone)]
pub struct ProgressService {
    clock: Clock,
    source: Arc<dyn DocumentSource>,
    snapshots: Arc<dyn SnapshotRepository>,
    max_pages: usize,
    busy: Arc<AtomicBool>,
    latest: Arc<watch::Sender<Option<Snapshot>>>,
}

/// Holds the busy flag; clearing it on drop covers every exit path.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ProgressService {
    #[must_use]
    pub fn new(
        clock: Clock,
        source: Arc<dyn DocumentSource>,
        snapshots: Arc<dyn SnapshotRepository>,
    ) -> Self {
        let (latest, _) = watch::channel(None);
        Self {
            clock,
            source,
            snapshots,
            max_pages: DEFAULT_MAX_PAGES,
            busy: Arc::new(AtomicBool::new(false)),
            latest: Arc::new(latest),
        }
    }

    #[must_use]
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// True while a refresh is in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Receiver that observes each newly persisted snapshot.
    ///
    /// Only completed refreshes (and `load`) publish; a failed or running
    /// refresh leaves the last value in place.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Snapshot>> {
        self.latest.subscribe()
    }

    /// Load the persisted snapshot, or `None` on first run.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    pub async fn load(&self) -> Result<Option<Snapshot>, StorageError> {
        let snapshot = self.snapshots.get_snapshot().await?;
        self.latest.send_replace(snapshot.clone());
        Ok(snapshot)
    }

    /// Progress for `today` from the persisted snapshot, without any network call.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    pub async fn report(&self, today: NaiveDate) -> Result<Option<ProgressReport>, StorageError> {
        Ok(self
            .load()
            .await?
            .map(|snapshot| ProgressReport::new(&snapshot, today)))
    }

    /// Count this year's archived documents tagged `settings.read_tag()` and
    /// persist the result together with `settings`.
    ///
    /// The stored snapshot is untouched unless every page request succeeds.
    ///
    /// # Errors
    ///
    /// Returns `RefreshError::AlreadyRunning` if another refresh holds the busy
    /// flag, or the sync/storage error that aborted this one.
    pub async fn refresh(&self, settings: Settings) -> Result<Snapshot, RefreshError> {
        let _busy = BusyGuard::acquire(&self.busy).ok_or(RefreshError::AlreadyRunning)?;

        let snapshot = self.sync_snapshot(settings).await.inspect_err(|err| {
            tracing::warn!(error = %err, "refresh failed; keeping previous snapshot");
        })?;

        tracing::info!(
            read = snapshot.current_count(),
            goal = snapshot.goal(),
            "refresh complete"
        );
        self.latest.send_replace(Some(snapshot.clone()));
        Ok(snapshot)
    }

    /// Validate edited settings, then refresh with them.
    ///
    /// # Errors
    ///
    /// Returns `RefreshError::Settings` for an invalid draft, otherwise as `refresh`.
    pub async fn configure(&self, draft: SettingsDraft) -> Result<Snapshot, RefreshError> {
        let settings = draft.validate()?;
        self.refresh(settings).await
    }

    /// Refresh using the settings already on disk.
    ///
    /// # Errors
    ///
    /// Returns `RefreshError::NotConfigured` when nothing has been saved yet,
    /// otherwise as `refresh`.
    pub async fn refresh_saved(&self) -> Result<Snapshot, RefreshError> {
        let snapshot = self
            .snapshots
            .get_snapshot()
            .await?
            .ok_or(RefreshError::NotConfigured)?;
        self.refresh(snapshot.into_settings()).await
    }

    async fn sync_snapshot(&self, settings: Settings) -> Result<Snapshot, RefreshError> {
        let filter = DocumentFilter::archived_since(self.clock.year_start());
        let documents = fetch_all(
            self.source.as_ref(),
            settings.api_token(),
            &filter,
            self.max_pages,
        )
        .await?;

        let matched = count_matches(&documents, settings.read_tag());
        tracing::debug!(
            fetched = documents.len(),
            matched,
            tag = settings.read_tag(),
            "counted tagged documents"
        );

        let snapshot = Snapshot::new(settings, u32::try_from(matched).unwrap_or(u32::MAX));
        self.snapshots.save_snapshot(&snapshot).await?;
        Ok(snapshot)
    }
}
