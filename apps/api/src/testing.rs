//! In-memory backends for tests: they count calls and can be told to fail.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::errors::StoreError;
use crate::jobs::{JobSource, SampleJobSource};
use crate::models::{Identity, NewResumeRow, ResumeRow};
use crate::records::RecordStore;
use crate::storage::{ObjectStorage, UploadOptions};
use crate::store::{ResumeStore, StoreSettings, UploadPolicy};

#[derive(Default)]
pub struct FakeStorage {
    objects: Mutex<HashMap<String, (Bytes, String)>>,
    calls: AtomicUsize,
    last_uploaded: Mutex<Option<String>>,
    pub fail_upload: AtomicBool,
    pub fail_remove: AtomicBool,
    /// When set, each upload waits for a permit before completing.
    gate: Option<Arc<Semaphore>>,
}

impl FakeStorage {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn gated(gate: Arc<Semaphore>) -> Arc<Self> {
        Arc::new(Self {
            gate: Some(gate),
            ..Self::default()
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Path of the most recent upload attempt, whether or not it succeeded.
    pub fn last_uploaded(&self) -> Option<String> {
        self.last_uploaded.lock().unwrap().clone()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.objects.lock().unwrap().contains_key(path)
    }

    pub fn content_type(&self, path: &str) -> Option<String> {
        self.objects.lock().unwrap().get(path).map(|(_, ct)| ct.clone())
    }

    pub fn put(&self, path: &str) {
        self.objects
            .lock()
            .unwrap()
            .insert(path.to_string(), (Bytes::new(), "application/pdf".to_string()));
    }
}

#[async_trait]
impl ObjectStorage for FakeStorage {
    async fn upload(
        &self,
        path: &str,
        bytes: Bytes,
        options: UploadOptions<'_>,
    ) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_uploaded.lock().unwrap() = Some(path.to_string());
        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
        if self.fail_upload.load(Ordering::SeqCst) {
            return Err(StoreError::Storage("upload rejected".to_string()));
        }
        let mut objects = self.objects.lock().unwrap();
        if objects.contains_key(path) && !options.overwrite {
            return Err(StoreError::Storage(format!("{path} already exists")));
        }
        objects.insert(path.to_string(), (bytes, options.content_type.to_string()));
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("https://storage.test/resumes/{path}")
    }

    async fn remove(&self, paths: &[String]) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_remove.load(Ordering::SeqCst) {
            return Err(StoreError::Storage("remove rejected".to_string()));
        }
        let mut objects = self.objects.lock().unwrap();
        for path in paths {
            objects.remove(path);
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeRecords {
    rows: Mutex<Vec<ResumeRow>>,
    calls: AtomicUsize,
    pub fail_select: AtomicBool,
    pub fail_insert: AtomicBool,
    pub fail_delete: AtomicBool,
}

impl FakeRecords {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn rows(&self) -> Vec<ResumeRow> {
        self.rows.lock().unwrap().clone()
    }

    pub fn seed(&self, user_id: &str, file_name: &str, uploaded_at: DateTime<Utc>) -> ResumeRow {
        let file_path = format!(
            "users/{user_id}/{}_{file_name}",
            uploaded_at.timestamp_millis()
        );
        let row = ResumeRow {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            file_name: file_name.to_string(),
            file_url: format!("https://storage.test/resumes/{file_path}"),
            file_path,
            file_type: "pdf".to_string(),
            file_size: 1024,
            uploaded_at,
        };
        self.rows.lock().unwrap().push(row.clone());
        row
    }
}

#[async_trait]
impl RecordStore for FakeRecords {
    async fn latest_for_owner(&self, owner: &Identity) -> Result<Option<ResumeRow>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_select.load(Ordering::SeqCst) {
            return Err(StoreError::Record("select failed".to_string()));
        }
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == owner.as_str())
            .max_by_key(|r| r.uploaded_at)
            .cloned())
    }

    async fn insert(&self, row: NewResumeRow) -> Result<ResumeRow, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(StoreError::Record("insert failed".to_string()));
        }
        let inserted = ResumeRow {
            id: Uuid::new_v4(),
            user_id: row.user_id,
            file_name: row.file_name,
            file_path: row.file_path,
            file_type: row.file_type.as_str().to_string(),
            file_size: row.file_size,
            file_url: row.file_url,
            uploaded_at: Utc::now(),
        };
        self.rows.lock().unwrap().push(inserted.clone());
        Ok(inserted)
    }

    async fn delete(&self, id: Uuid, owner: &Identity) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(StoreError::Record("delete failed".to_string()));
        }
        self.rows
            .lock()
            .unwrap()
            .retain(|r| !(r.id == id && r.user_id == owner.as_str()));
        Ok(())
    }
}

pub fn build_store(
    storage: &Arc<FakeStorage>,
    records: &Arc<FakeRecords>,
    upload_policy: UploadPolicy,
) -> ResumeStore {
    let storage: Arc<dyn ObjectStorage> = storage.clone();
    let records: Arc<dyn RecordStore> = records.clone();
    let jobs: Arc<dyn JobSource> = Arc::new(SampleJobSource::new().unwrap());
    ResumeStore::new(
        storage,
        records,
        jobs,
        StoreSettings {
            upload_policy,
            ..StoreSettings::default()
        },
    )
}
