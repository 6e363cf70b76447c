//! Object storage holding uploaded résumé bytes, addressed by path.

pub mod s3;

use async_trait::async_trait;
use bytes::Bytes;

use crate::errors::StoreError;

pub use s3::S3ObjectStorage;

#[derive(Debug, Clone, Copy)]
pub struct UploadOptions<'a> {
    pub content_type: &'a str,
    /// When false, uploading to an existing path fails instead of replacing it.
    pub overwrite: bool,
}

/// Blob store backend. Implementations report failures as `StoreError::Storage`.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload(
        &self,
        path: &str,
        bytes: Bytes,
        options: UploadOptions<'_>,
    ) -> Result<(), StoreError>;

    /// Publicly resolvable URL of the object at `path`. Does not check existence.
    fn public_url(&self, path: &str) -> String;

    async fn remove(&self, paths: &[String]) -> Result<(), StoreError>;
}
