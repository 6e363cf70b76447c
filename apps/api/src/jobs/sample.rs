use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::errors::StoreError;
use crate::jobs::JobSource;
use crate::models::{
    ApplicationRecord, ApplicationStatus, Identity, JobPosting, JobSnapshot, ResumeSnapshot,
};

const SAMPLE_DATA: &str = include_str!("sample_data.json");

#[derive(Debug, Deserialize)]
struct SampleData {
    jobs: Vec<JobPosting>,
    applications: Vec<SampleApplication>,
}

/// Applications in the dataset carry no owner; they are stamped on read.
#[derive(Debug, Clone, Deserialize)]
struct SampleApplication {
    id: String,
    job_id: String,
    status: ApplicationStatus,
    submitted_date: NaiveDate,
    resume: ResumeSnapshot,
    job: JobSnapshot,
}

/// Static job and application data compiled into the binary.
pub struct SampleJobSource {
    jobs: Vec<JobPosting>,
    applications: Vec<SampleApplication>,
}

impl SampleJobSource {
    pub fn new() -> Result<Self> {
        let data: SampleData =
            serde_json::from_str(SAMPLE_DATA).context("Sample job data is not valid JSON")?;
        Ok(Self {
            jobs: data.jobs,
            applications: data.applications,
        })
    }
}

#[async_trait]
impl JobSource for SampleJobSource {
    async fn recommended_jobs(
        &self,
        _identity: Option<&Identity>,
    ) -> Result<Vec<JobPosting>, StoreError> {
        Ok(self.jobs.clone())
    }

    async fn applications(&self, identity: &Identity) -> Result<Vec<ApplicationRecord>, StoreError> {
        Ok(self
            .applications
            .iter()
            .cloned()
            .map(|app| ApplicationRecord {
                id: app.id,
                job_id: app.job_id,
                user_id: identity.to_string(),
                status: app.status,
                submitted_date: app.submitted_date,
                resume: app.resume,
                job: app.job,
            })
            .collect())
    }
}
