use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::resume::FileType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub requirements: Vec<String>,
    pub skills: BTreeSet<String>,
    pub salary_range: String,
    pub posted_date: NaiveDate,
    pub deadline: NaiveDate,
}

/// Display label of an application; there is no transition logic between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationStatus {
    #[serde(rename = "Submitted Successfully")]
    Submitted,
    #[serde(rename = "Processing")]
    Processing,
    #[serde(rename = "Submission Failed")]
    Failed,
}

/// Copy of the résumé metadata taken when the application was submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeSnapshot {
    pub file_name: String,
    pub url: String,
    pub file_type: FileType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub title: String,
    pub company: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: String,
    pub job_id: String,
    pub user_id: String,
    pub status: ApplicationStatus,
    pub submitted_date: NaiveDate,
    pub resume: ResumeSnapshot,
    pub job: JobSnapshot,
}
