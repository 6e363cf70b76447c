use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::StoreError;

/// Opaque identifier of the authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(id: impl Into<String>) -> Self {
        Identity(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Pdf,
    Docx,
}

impl FileType {
    pub fn as_str(self) -> &'static str {
        match self {
            FileType::Pdf => "pdf",
            FileType::Docx => "docx",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            FileType::Pdf => "application/pdf",
            FileType::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }
}

impl FromStr for FileType {
    type Err = StoreError;

    /// Case-insensitive; accepts the bare extension without a leading dot.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pdf" => Ok(FileType::Pdf),
            "docx" => Ok(FileType::Docx),
            _ => Err(StoreError::UnsupportedFileType(s.to_string())),
        }
    }
}

/// Row shape of the `resumes` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub user_id: String,
    pub file_name: String,
    pub file_path: String,
    pub file_type: String,
    pub file_size: i64,
    pub file_url: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Values written when a résumé is uploaded; the store fills in `id` and `uploaded_at`.
#[derive(Debug, Clone)]
pub struct NewResumeRow {
    pub user_id: String,
    pub file_name: String,
    pub file_path: String,
    pub file_type: FileType,
    pub file_size: i64,
    pub file_url: String,
}

/// The résumé currently associated with an identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeRecord {
    pub id: Uuid,
    pub file_name: String,
    pub storage_path: String,
    pub url: String,
    pub file_type: FileType,
    pub file_size: u64,
    pub uploaded_at: DateTime<Utc>,
}

impl TryFrom<ResumeRow> for ResumeRecord {
    type Error = StoreError;

    fn try_from(row: ResumeRow) -> Result<Self, Self::Error> {
        let file_type = row.file_type.parse::<FileType>().map_err(|_| {
            StoreError::Record(format!(
                "resume {} has unknown file type '{}'",
                row.id, row.file_type
            ))
        })?;
        let file_size = u64::try_from(row.file_size).map_err(|_| {
            StoreError::Record(format!(
                "resume {} has negative size {}",
                row.id, row.file_size
            ))
        })?;

        Ok(ResumeRecord {
            id: row.id,
            file_name: row.file_name,
            storage_path: row.file_path,
            url: row.file_url,
            file_type,
            file_size,
            uploaded_at: row.uploaded_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_row(file_type: &str) -> ResumeRow {
        ResumeRow {
            id: Uuid::new_v4(),
            user_id: "u1".to_string(),
            file_name: "resume final.pdf".to_string(),
            file_path: "users/u1/1712700000000_resume_final.pdf".to_string(),
            file_type: file_type.to_string(),
            file_size: 4_000_000,
            file_url: "https://cdn.example.com/resumes/users/u1/1712700000000_resume_final.pdf"
                .to_string(),
            uploaded_at: Utc::now(),
        }
    }

    #[test]
    fn test_row_maps_to_record_keeping_storage_path() {
        let row = make_row("pdf");
        let record = ResumeRecord::try_from(row.clone()).unwrap();
        assert_eq!(record.id, row.id);
        assert_eq!(record.storage_path, row.file_path);
        assert_eq!(record.url, row.file_url);
        assert_eq!(record.file_type, FileType::Pdf);
        assert_eq!(record.file_size, 4_000_000);
    }

    #[test]
    fn test_row_with_unknown_file_type_is_rejected() {
        let err = ResumeRecord::try_from(make_row("exe")).unwrap_err();
        assert!(matches!(err, StoreError::Record(_)));
    }

    #[test]
    fn test_row_with_negative_size_is_rejected() {
        let row = ResumeRow {
            file_size: -1,
            ..make_row("pdf")
        };
        let err = ResumeRecord::try_from(row).unwrap_err();
        assert!(matches!(err, StoreError::Record(msg) if msg.contains("negative size")));
    }

    #[test]
    fn test_file_type_parse_is_case_insensitive() {
        assert_eq!("PDF".parse::<FileType>().unwrap(), FileType::Pdf);
        assert_eq!("DocX".parse::<FileType>().unwrap(), FileType::Docx);
        assert!("doc".parse::<FileType>().is_err());
    }

    #[test]
    fn test_file_type_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&FileType::Docx).unwrap(), "\"docx\"");
    }
}
