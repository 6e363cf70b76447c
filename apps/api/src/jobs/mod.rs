//! Job recommendations and application history.
//!
//! Only the sample dataset backs this today; a query-backed source plugs in
//! behind the same trait.

pub mod sample;

use async_trait::async_trait;

use crate::errors::StoreError;
use crate::models::{ApplicationRecord, Identity, JobPosting};

pub use sample::SampleJobSource;

#[async_trait]
pub trait JobSource: Send + Sync {
    async fn recommended_jobs(
        &self,
        identity: Option<&Identity>,
    ) -> Result<Vec<JobPosting>, StoreError>;

    async fn applications(&self, identity: &Identity) -> Result<Vec<ApplicationRecord>, StoreError>;
}
