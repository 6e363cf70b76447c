//! Record store holding résumé metadata rows.

pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::StoreError;
use crate::models::{Identity, NewResumeRow, ResumeRow};

pub use postgres::PgRecordStore;

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Newest row owned by `owner`, ordered by upload date descending.
    async fn latest_for_owner(&self, owner: &Identity) -> Result<Option<ResumeRow>, StoreError>;

    /// Inserts a row and returns it as stored.
    async fn insert(&self, row: NewResumeRow) -> Result<ResumeRow, StoreError>;

    async fn delete(&self, id: Uuid, owner: &Identity) -> Result<(), StoreError>;
}
