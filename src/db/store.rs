//! Storage abstraction for jobs and their executions.
//!
//! Handlers and services talk to a `JobStore`; `DbPool` backs it with
//! PostgreSQL and `MemoryJobStore` keeps everything in process.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    CreateJobRequest, Job, JobExecution, JobQuery, JobStatus, NewExecution, UpdateJobRequest,
};
use crate::services::guard::{self, JobAction};

/// Maximum length of a job name.
pub const MAX_NAME_LENGTH: usize = 255;

/// Persistence operations for jobs.
///
/// Every owner-scoped lookup treats another owner's job as missing.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Verify the backing store is reachable.
    async fn ping(&self) -> AppResult<()>;

    /// Jobs belonging to `owner` that match `query`, in the order it asks for.
    ///
    /// Ties are broken by ID, newest first.
    async fn list_jobs(&self, owner: Uuid, query: &JobQuery) -> AppResult<Vec<Job>>;

    /// A single job belonging to `owner`.
    async fn get_job(&self, owner: Uuid, id: Uuid) -> AppResult<Option<Job>>;

    /// Create a pending job owned by `owner`.
    async fn create_job(&self, owner: Uuid, request: CreateJobRequest) -> AppResult<Job>;

    /// Edit a pending job.
    async fn update_job(&self, owner: Uuid, id: Uuid, request: UpdateJobRequest)
    -> AppResult<Job>;

    /// Delete a pending job together with its executions.
    async fn delete_job(&self, owner: Uuid, id: Uuid) -> AppResult<()>;

    /// Move a job along its lifecycle on behalf of the scheduler.
    async fn transition_job(&self, id: Uuid, next: JobStatus) -> AppResult<Job>;

    /// Executions of one job, most recent first.
    async fn list_executions(&self, job_id: Uuid) -> AppResult<Vec<JobExecution>>;

    /// Executions of every job belonging to `owner`, most recent first.
    async fn list_owner_executions(&self, owner: Uuid) -> AppResult<Vec<JobExecution>>;

    /// A single execution of one of `owner`'s jobs.
    async fn get_execution(&self, owner: Uuid, id: Uuid) -> AppResult<Option<JobExecution>>;

    /// Record a run of an existing job.
    async fn record_execution(
        &self,
        job_id: Uuid,
        execution: NewExecution,
    ) -> AppResult<JobExecution>;
}

/// Trim and check a job name.
pub(crate) fn validated_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput("Job name must not be empty".to_string()));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(AppError::InvalidInput(format!(
            "Job name exceeds {} characters",
            MAX_NAME_LENGTH
        )));
    }
    Ok(name.to_string())
}

/// Build a freshly submitted job.
pub(crate) fn new_job(
    owner: Uuid,
    request: CreateJobRequest,
    now: DateTime<Utc>,
) -> AppResult<Job> {
    Ok(Job {
        id: Uuid::now_v7(),
        owner,
        name: validated_name(&request.name)?,
        status: JobStatus::Pending,
        priority: request.priority,
        deadline: request.deadline,
        created_at: now,
        started_at: None,
        completed_at: None,
        updated_at: now,
    })
}

/// Check an owner edit before it touches any job.
pub(crate) fn validated_update(request: UpdateJobRequest) -> AppResult<UpdateJobRequest> {
    let name = request.name.as_deref().map(validated_name).transpose()?;
    Ok(UpdateJobRequest { name, ..request })
}

/// Apply an owner edit after checking the job is still pending.
pub(crate) fn apply_update(
    job: &mut Job,
    request: UpdateJobRequest,
    now: DateTime<Utc>,
) -> AppResult<()> {
    let request = validated_update(request)?;
    guard::ensure_allowed(job, JobAction::Edit)?;

    if let Some(name) = request.name {
        job.name = name;
    }
    if let Some(priority) = request.priority {
        job.priority = priority;
    }
    if let Some(deadline) = request.deadline {
        job.deadline = deadline;
    }
    job.updated_at = now;

    Ok(())
}

/// Apply a lifecycle transition, stamping start/completion times.
pub(crate) fn apply_transition(
    job: &mut Job,
    next: JobStatus,
    now: DateTime<Utc>,
) -> AppResult<()> {
    if !job.status.can_transition_to(next) {
        return Err(AppError::InvalidInput(format!(
            "Job {} cannot move from {} to {}",
            job.id, job.status, next
        )));
    }

    match next {
        JobStatus::Running => job.started_at = Some(now),
        JobStatus::Completed | JobStatus::Failed => job.completed_at = Some(now),
        JobStatus::Pending => {}
    }
    job.status = next;
    job.updated_at = now;

    Ok(())
}
