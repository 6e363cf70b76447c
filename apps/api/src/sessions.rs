use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tracing::info;

use crate::jobs::JobSource;
use crate::models::Identity;
use crate::records::RecordStore;
use crate::storage::ObjectStorage;
use crate::store::{ResumeStore, StoreSettings};

/// Bounds on the number of open sessions.
#[derive(Debug, Clone, Copy)]
pub struct SessionLimits {
    pub capacity: usize,
    /// Sessions untouched for longer than this are closed on the next open.
    pub idle_timeout: Duration,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            capacity: 10_000,
            idle_timeout: Duration::from_secs(30 * 60),
        }
    }
}

struct SessionEntry {
    store: Arc<ResumeStore>,
    last_seen: Instant,
}

/// One `ResumeStore` per identity, opened on first use and disposed on close,
/// eviction or idle expiry.
///
/// Callers without an identity share a single anonymous store.
pub struct SessionRegistry {
    storage: Arc<dyn ObjectStorage>,
    records: Arc<dyn RecordStore>,
    jobs: Arc<dyn JobSource>,
    settings: StoreSettings,
    limits: SessionLimits,
    sessions: Mutex<HashMap<Identity, SessionEntry>>,
    anonymous: Arc<ResumeStore>,
}

impl SessionRegistry {
    pub fn new(
        storage: Arc<dyn ObjectStorage>,
        records: Arc<dyn RecordStore>,
        jobs: Arc<dyn JobSource>,
        settings: StoreSettings,
        limits: SessionLimits,
    ) -> Self {
        let anonymous = Arc::new(ResumeStore::new(
            storage.clone(),
            records.clone(),
            jobs.clone(),
            settings,
        ));
        Self {
            storage,
            records,
            jobs,
            settings,
            limits,
            sessions: Mutex::new(HashMap::new()),
            anonymous,
        }
    }

    /// Returns the caller's store, hydrating it from the record store when it is new.
    pub async fn open(&self, identity: Option<Identity>) -> Arc<ResumeStore> {
        let Some(identity) = identity else {
            return self.anonymous.clone();
        };

        let now = Instant::now();
        let (store, created, evicted) = {
            let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
            let mut evicted = Vec::new();

            let idle_timeout = self.limits.idle_timeout;
            sessions.retain(|id, entry| {
                let keep = now.duration_since(entry.last_seen) <= idle_timeout;
                if !keep {
                    evicted.push((id.clone(), entry.store.clone()));
                }
                keep
            });

            match sessions.get_mut(&identity) {
                Some(entry) => {
                    entry.last_seen = now;
                    (entry.store.clone(), false, evicted)
                }
                None => {
                    while sessions.len() >= self.limits.capacity.max(1) {
                        let oldest = sessions
                            .iter()
                            .min_by_key(|(_, entry)| entry.last_seen)
                            .map(|(id, _)| id.clone());
                        let Some(oldest) = oldest else { break };
                        if let Some(entry) = sessions.remove(&oldest) {
                            evicted.push((oldest, entry.store));
                        }
                    }

                    let store = Arc::new(ResumeStore::new(
                        self.storage.clone(),
                        self.records.clone(),
                        self.jobs.clone(),
                        self.settings,
                    ));
                    sessions.insert(
                        identity.clone(),
                        SessionEntry {
                            store: store.clone(),
                            last_seen: now,
                        },
                    );
                    (store, true, evicted)
                }
            }
        };

        for (id, store) in evicted {
            store.dispose();
            info!("Evicted resume session for {id}");
        }

        if created {
            info!("Opened resume session for {identity}");
            // The outcome is already logged by the store; a failed load leaves
            // the session empty until the caller refreshes.
            let _ = store.set_identity(Some(identity)).await;
        }
        store
    }

    /// Disposes and forgets the session. Returns whether one was open.
    pub fn close(&self, identity: &Identity) -> bool {
        let removed = self
            .sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(identity);
        match removed {
            Some(entry) => {
                entry.store.dispose();
                info!("Closed resume session for {identity}");
                true
            }
            None => false,
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
