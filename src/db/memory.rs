//! In-process job store.
//!
//! Used when embedding the ledger without PostgreSQL and as the backing store
//! for API tests. Follows the same ordering and guard rules as `DbPool`.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    CreateJobRequest, Job, JobExecution, JobQuery, JobStatus, NewExecution, UpdateJobRequest,
};
use crate::services::guard::{self, JobAction};

use super::store::{self, JobStore};

#[derive(Default)]
struct State {
    jobs: HashMap<Uuid, Job>,
    executions: Vec<JobExecution>,
}

/// Job store held entirely in memory.
#[derive(Default)]
pub struct MemoryJobStore {
    state: RwLock<State>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fully formed job, replacing any job with the same ID.
    ///
    /// Bypasses lifecycle checks so callers can load existing records.
    pub async fn insert_job(&self, job: Job) {
        self.state.write().await.jobs.insert(job.id, job);
    }
}

fn newest_first(executions: &mut [JobExecution]) {
    executions.sort_by(|a, b| b.started_at.cmp(&a.started_at).then(b.id.cmp(&a.id)));
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    async fn list_jobs(&self, owner: Uuid, query: &JobQuery) -> AppResult<Vec<Job>> {
        let state = self.state.read().await;
        let mut jobs: Vec<Job> = state
            .jobs
            .values()
            .filter(|job| job.owner == owner && query.matches(job))
            .cloned()
            .collect();

        query.sort(&mut jobs);
        Ok(jobs)
    }

    async fn get_job(&self, owner: Uuid, id: Uuid) -> AppResult<Option<Job>> {
        let state = self.state.read().await;
        Ok(state.jobs.get(&id).filter(|job| job.owner == owner).cloned())
    }

    async fn create_job(&self, owner: Uuid, request: CreateJobRequest) -> AppResult<Job> {
        let job = store::new_job(owner, request, Utc::now())?;
        self.state.write().await.jobs.insert(job.id, job.clone());

        info!(job_id = %job.id, owner = %owner, "Job created");
        Ok(job)
    }

    async fn update_job(
        &self,
        owner: Uuid,
        id: Uuid,
        request: UpdateJobRequest,
    ) -> AppResult<Job> {
        let mut state = self.state.write().await;
        let job = state
            .jobs
            .get_mut(&id)
            .filter(|job| job.owner == owner)
            .ok_or_else(|| AppError::NotFound(format!("Job {}", id)))?;

        // Apply to a copy so a rejected edit leaves the stored job untouched.
        let mut edited = job.clone();
        store::apply_update(&mut edited, request, Utc::now())?;
        *job = edited.clone();

        info!(job_id = %id, "Job updated");
        Ok(edited)
    }

    async fn delete_job(&self, owner: Uuid, id: Uuid) -> AppResult<()> {
        let mut state = self.state.write().await;
        let job = state
            .jobs
            .get(&id)
            .filter(|job| job.owner == owner)
            .ok_or_else(|| AppError::NotFound(format!("Job {}", id)))?;

        guard::ensure_allowed(job, JobAction::Delete)?;

        state.jobs.remove(&id);
        state.executions.retain(|e| e.job_id != id);

        info!(job_id = %id, "Job deleted");
        Ok(())
    }

    async fn transition_job(&self, id: Uuid, next: JobStatus) -> AppResult<Job> {
        let mut state = self.state.write().await;
        let job = state
            .jobs
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Job {}", id)))?;

        let previous = job.status;
        store::apply_transition(job, next, Utc::now())?;

        info!(job_id = %id, from = %previous, to = %next, "Job status changed");
        Ok(job.clone())
    }

    async fn list_executions(&self, job_id: Uuid) -> AppResult<Vec<JobExecution>> {
        let state = self.state.read().await;
        let mut executions: Vec<JobExecution> = state
            .executions
            .iter()
            .filter(|e| e.job_id == job_id)
            .cloned()
            .collect();

        newest_first(&mut executions);
        Ok(executions)
    }

    async fn list_owner_executions(&self, owner: Uuid) -> AppResult<Vec<JobExecution>> {
        let state = self.state.read().await;
        let mut executions: Vec<JobExecution> = state
            .executions
            .iter()
            .filter(|e| state.jobs.get(&e.job_id).is_some_and(|job| job.owner == owner))
            .cloned()
            .collect();

        newest_first(&mut executions);
        Ok(executions)
    }

    async fn get_execution(&self, owner: Uuid, id: Uuid) -> AppResult<Option<JobExecution>> {
        let state = self.state.read().await;
        let execution = state.executions.iter().find(|e| e.id == id).filter(|e| {
            state
                .jobs
                .get(&e.job_id)
                .is_some_and(|job| job.owner == owner)
        });

        Ok(execution.cloned())
    }

    async fn record_execution(
        &self,
        job_id: Uuid,
        execution: NewExecution,
    ) -> AppResult<JobExecution> {
        let mut state = self.state.write().await;
        if !state.jobs.contains_key(&job_id) {
            return Err(AppError::NotFound(format!("Job {}", job_id)));
        }

        let record = JobExecution {
            id: Uuid::now_v7(),
            job_id,
            status: execution.status,
            started_at: execution.started_at,
            finished_at: execution.finished_at,
            error_message: execution.error_message,
        };
        state.executions.push(record.clone());

        Ok(record)
    }
}
