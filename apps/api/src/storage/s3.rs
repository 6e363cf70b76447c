use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;
use tracing::info;

use crate::errors::StoreError;
use crate::storage::{ObjectStorage, UploadOptions};

/// S3 / MinIO backed object storage.
#[derive(Clone)]
pub struct S3ObjectStorage {
    client: S3Client,
    bucket: String,
    public_base_url: String,
}

impl S3ObjectStorage {
    pub fn new(client: S3Client, bucket: String, public_base_url: String) -> Self {
        Self {
            client,
            bucket,
            public_base_url,
        }
    }
}

#[async_trait]
impl ObjectStorage for S3ObjectStorage {
    async fn upload(
        &self,
        path: &str,
        bytes: Bytes,
        options: UploadOptions<'_>,
    ) -> Result<(), StoreError> {
        let size = bytes.len();
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(path)
            .body(ByteStream::from(bytes))
            .content_type(options.content_type);
        if !options.overwrite {
            // Conditional write: S3 answers 412 if the key already exists.
            request = request.if_none_match("*");
        }

        request
            .send()
            .await
            .map_err(|e| StoreError::Storage(format!("S3 upload of {path} failed: {e}")))?;

        info!("Uploaded {size} bytes to s3://{}/{}", self.bucket, path);
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        public_object_url(&self.public_base_url, &self.bucket, path)
    }

    async fn remove(&self, paths: &[String]) -> Result<(), StoreError> {
        for path in paths {
            self.client
                .delete_object()
                .bucket(&self.bucket)
                .key(path)
                .send()
                .await
                .map_err(|e| StoreError::Storage(format!("S3 delete of {path} failed: {e}")))?;

            info!("Removed s3://{}/{}", self.bucket, path);
        }
        Ok(())
    }
}

fn public_object_url(base_url: &str, bucket: &str, path: &str) -> String {
    format!(
        "{}/{}/{}",
        base_url.trim_end_matches('/'),
        bucket,
        path.trim_start_matches('/')
    )
}
