//! Per-session résumé state.
//!
//! A `ResumeStore` caches the newest résumé of one identity and keeps it in step
//! with object storage and the record store. The owner creates it, points it at
//! an identity with [`ResumeStore::set_identity`] and ends it with
//! [`ResumeStore::dispose`]; any call after that fails with
//! `StoreError::Configuration`.
//!
//! Storage and record writes are never atomic with each other. An upload whose
//! metadata insert fails removes the freshly stored object on a best-effort basis;
//! a crash between the two writes can still leave an orphaned object.

pub mod upload;

use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::bail;
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::errors::StoreError;
use crate::jobs::JobSource;
use crate::models::{ApplicationRecord, Identity, JobPosting, NewResumeRow, ResumeRecord};
use crate::records::RecordStore;
use crate::storage::{ObjectStorage, UploadOptions};

pub use upload::{storage_path, validate_upload, ResumeUpload, MAX_RESUME_BYTES};

/// What to do when an upload starts while another one is still in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadPolicy {
    /// Both proceed; whichever finishes last becomes the current résumé.
    #[default]
    LastWriteWins,
    /// The second upload fails with `StoreError::UploadInProgress`.
    Reject,
}

impl FromStr for UploadPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "last_write_wins" => Ok(UploadPolicy::LastWriteWins),
            "reject" => Ok(UploadPolicy::Reject),
            other => bail!("unknown upload policy '{other}', expected 'last_write_wins' or 'reject'"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StoreSettings {
    pub max_file_bytes: usize,
    pub upload_policy: UploadPolicy,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            max_file_bytes: MAX_RESUME_BYTES,
            upload_policy: UploadPolicy::default(),
        }
    }
}

/// Result of loading the current résumé for an identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum FetchOutcome {
    Found(ResumeRecord),
    NotFound,
    Failed(String),
}

#[derive(Debug, Default)]
struct SessionState {
    identity: Option<Identity>,
    current: Option<ResumeRecord>,
    disposed: bool,
}

pub struct ResumeStore {
    storage: Arc<dyn ObjectStorage>,
    records: Arc<dyn RecordStore>,
    jobs: Arc<dyn JobSource>,
    settings: StoreSettings,
    state: RwLock<SessionState>,
    uploads_in_flight: AtomicUsize,
}

/// Holds one slot of `uploads_in_flight`; released on every exit path.
struct UploadGuard<'a> {
    in_flight: &'a AtomicUsize,
}

impl Drop for UploadGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ResumeStore {
    pub fn new(
        storage: Arc<dyn ObjectStorage>,
        records: Arc<dyn RecordStore>,
        jobs: Arc<dyn JobSource>,
        settings: StoreSettings,
    ) -> Self {
        Self {
            storage,
            records,
            jobs,
            settings,
            state: RwLock::new(SessionState::default()),
            uploads_in_flight: AtomicUsize::new(0),
        }
    }

    // Lock guards are never held across an await.
    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn active(&self) -> Result<RwLockReadGuard<'_, SessionState>, StoreError> {
        let state = self.read();
        if state.disposed {
            return Err(StoreError::session_closed());
        }
        Ok(state)
    }

    pub fn identity(&self) -> Result<Option<Identity>, StoreError> {
        Ok(self.active()?.identity.clone())
    }

    pub fn current_resume(&self) -> Result<Option<ResumeRecord>, StoreError> {
        Ok(self.active()?.current.clone())
    }

    pub fn is_uploading(&self) -> Result<bool, StoreError> {
        let _state = self.active()?;
        Ok(self.uploads_in_flight.load(Ordering::SeqCst) > 0)
    }

    pub async fn recommended_jobs(&self) -> Result<Vec<JobPosting>, StoreError> {
        let identity = self.identity()?;
        self.jobs.recommended_jobs(identity.as_ref()).await
    }

    /// Empty when no identity is set.
    pub async fn applications(&self) -> Result<Vec<ApplicationRecord>, StoreError> {
        match self.identity()? {
            Some(identity) => self.jobs.applications(&identity).await,
            None => Ok(Vec::new()),
        }
    }

    /// Switches the session to `identity` and loads its newest résumé.
    ///
    /// Setting the identity already in place answers from the cache without a
    /// backend call. Load failures are logged and reported as
    /// `FetchOutcome::Failed`, never as an error.
    pub async fn set_identity(&self, identity: Option<Identity>) -> Result<FetchOutcome, StoreError> {
        {
            let mut state = self.write();
            if state.disposed {
                return Err(StoreError::session_closed());
            }
            if state.identity == identity {
                return Ok(match &state.current {
                    Some(record) => FetchOutcome::Found(record.clone()),
                    None => FetchOutcome::NotFound,
                });
            }
            state.identity = identity.clone();
            state.current = None;
        }

        match identity {
            Some(identity) => Ok(self.fetch_current(identity).await),
            None => Ok(FetchOutcome::NotFound),
        }
    }

    /// Reloads the newest résumé for the current identity.
    pub async fn refresh(&self) -> Result<FetchOutcome, StoreError> {
        match self.identity()? {
            Some(identity) => Ok(self.fetch_current(identity).await),
            None => Ok(FetchOutcome::NotFound),
        }
    }

    async fn fetch_current(&self, identity: Identity) -> FetchOutcome {
        let outcome = match self
            .records
            .latest_for_owner(&identity)
            .await
            .and_then(|row| row.map(ResumeRecord::try_from).transpose())
        {
            Ok(Some(record)) => FetchOutcome::Found(record),
            Ok(None) => FetchOutcome::NotFound,
            Err(e) => {
                warn!("Failed to load resume for {identity}: {e}");
                FetchOutcome::Failed(e.to_string())
            }
        };

        let mut state = self.write();
        if state.disposed || state.identity.as_ref() != Some(&identity) {
            debug!("Discarding resume fetch for {identity}: session moved on");
            return outcome;
        }
        match &outcome {
            FetchOutcome::Found(record) => state.current = Some(record.clone()),
            FetchOutcome::NotFound => state.current = None,
            FetchOutcome::Failed(_) => {}
        }
        outcome
    }

    fn begin_upload(&self) -> Result<UploadGuard<'_>, StoreError> {
        match self.settings.upload_policy {
            UploadPolicy::LastWriteWins => {
                self.uploads_in_flight.fetch_add(1, Ordering::SeqCst);
            }
            UploadPolicy::Reject => {
                self.uploads_in_flight
                    .compare_exchange(0, 1, Ordering::SeqCst, Ordering::SeqCst)
                    .map_err(|_| StoreError::UploadInProgress)?;
            }
        }
        Ok(UploadGuard {
            in_flight: &self.uploads_in_flight,
        })
    }

    /// Stores the file, records its metadata and makes it the current résumé.
    pub async fn upload(&self, upload: ResumeUpload) -> Result<ResumeRecord, StoreError> {
        let identity = self.identity()?.ok_or(StoreError::AuthenticationRequired)?;
        let file_type = validate_upload(&upload, self.settings.max_file_bytes)?;
        let _in_flight = self.begin_upload()?;

        let path = storage_path(&identity, &upload.file_name, Utc::now());
        let file_size = upload.bytes.len();
        self.storage
            .upload(
                &path,
                upload.bytes,
                UploadOptions {
                    content_type: file_type.content_type(),
                    overwrite: false,
                },
            )
            .await?;
        let url = self.storage.public_url(&path);

        let new_row = NewResumeRow {
            user_id: identity.to_string(),
            file_name: upload.file_name,
            file_path: path.clone(),
            file_type,
            file_size: file_size as i64,
            file_url: url,
        };
        let row = match self.records.insert(new_row).await {
            Ok(row) => row,
            Err(e) => {
                self.discard_orphan(&path).await;
                return Err(e);
            }
        };
        let record = ResumeRecord::try_from(row)?;

        {
            let mut state = self.write();
            if !state.disposed && state.identity.as_ref() == Some(&identity) {
                state.current = Some(record.clone());
            } else {
                warn!(
                    "Resume {} uploaded for {identity} after the session moved on; not caching it",
                    record.id
                );
            }
        }

        info!(
            "Uploaded resume {} ({} bytes) for {identity} at {}",
            record.id, record.file_size, record.storage_path
        );
        Ok(record)
    }

    async fn discard_orphan(&self, path: &str) {
        if let Err(e) = self.storage.remove(&[path.to_string()]).await {
            warn!("Could not remove orphaned object {path}: {e}");
        }
    }

    /// Removes the current résumé from storage and the record store.
    ///
    /// Returns `false` without touching either backend when there is no identity
    /// or no current résumé.
    pub async fn delete(&self) -> Result<bool, StoreError> {
        let (identity, record) = {
            let state = self.active()?;
            match (&state.identity, &state.current) {
                (Some(identity), Some(record)) => (identity.clone(), record.clone()),
                _ => return Ok(false),
            }
        };

        self.storage
            .remove(std::slice::from_ref(&record.storage_path))
            .await?;
        self.records.delete(record.id, &identity).await?;

        {
            let mut state = self.write();
            if state.current.as_ref().map(|c| c.id) == Some(record.id) {
                state.current = None;
            }
        }

        info!("Deleted resume {} for {identity}", record.id);
        Ok(true)
    }

    /// Ends the session. Cached state is dropped; the backends are untouched.
    pub fn dispose(&self) {
        let mut state = self.write();
        state.disposed = true;
        state.identity = None;
        state.current = None;
    }
}
