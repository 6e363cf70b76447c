pub mod job;
pub mod resume;

pub use job::{ApplicationRecord, ApplicationStatus, JobPosting, JobSnapshot, ResumeSnapshot};
pub use resume::{FileType, Identity, NewResumeRow, ResumeRecord, ResumeRow};
