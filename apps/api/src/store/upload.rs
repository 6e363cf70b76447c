use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::errors::StoreError;
use crate::models::{FileType, Identity};

/// 5 MiB.
pub const MAX_RESUME_BYTES: usize = 5 * 1024 * 1024;

/// A résumé file as received from the caller.
#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub file_name: String,
    pub bytes: Bytes,
}

impl ResumeUpload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Checks extension then size. Runs before any side effect.
pub fn validate_upload(upload: &ResumeUpload, max_bytes: usize) -> Result<FileType, StoreError> {
    let extension = upload
        .file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .unwrap_or_default();
    let file_type = extension
        .parse::<FileType>()
        .map_err(|_| StoreError::UnsupportedFileType(upload.file_name.clone()))?;

    let size = upload.bytes.len();
    if size > max_bytes {
        return Err(StoreError::FileTooLarge {
            size,
            limit: max_bytes,
        });
    }

    Ok(file_type)
}

/// `users/{identity}/{unix_millis}_{file_name}`, whitespace runs in the name collapsed to `_`.
pub fn storage_path(identity: &Identity, file_name: &str, now: DateTime<Utc>) -> String {
    format!(
        "users/{}/{}_{}",
        identity,
        now.timestamp_millis(),
        replace_whitespace(file_name)
    )
}

fn replace_whitespace(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_run = false;
    for c in name.chars() {
        if c.is_whitespace() {
            if !in_run {
                out.push('_');
            }
            in_run = true;
        } else {
            out.push(c);
            in_run = false;
        }
    }
    out
}
