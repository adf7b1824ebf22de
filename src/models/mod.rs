//! Domain models for the job ledger.

pub mod analytics;
pub mod execution;
pub mod job;

// Re-export commonly used types
pub use analytics::{JobAnalytics, PriorityBreakdown, StatusBreakdown};
pub use execution::{ExecutionListResponse, ExecutionStatus, JobExecution, NewExecution};
pub use job::{
    CreateJobRequest, Job, JobDetailResponse, JobListResponse, JobOrdering, JobPriority, JobQuery,
    JobResponse, JobSortField, JobStatus, ListJobsParams, UpdateJobRequest,
};
