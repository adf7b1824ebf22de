//! Mutation guard for jobs.
//!
//! Only a job that is still `pending` may be edited or deleted. Once a job has
//! been picked up its record belongs to the execution side and is read-only
//! to the owner.

use tracing::warn;

use crate::error::{AppError, AppResult};
use crate::models::{Job, JobStatus};

/// Owner-initiated mutation being checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobAction {
    Edit,
    Delete,
}

impl JobAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Edit => "edit",
            Self::Delete => "delete",
        }
    }
}

impl std::fmt::Display for JobAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether the job's fields may still be edited.
pub fn can_modify(job: &Job) -> bool {
    job.status == JobStatus::Pending
}

/// Whether the job may still be deleted. Same rule as [`can_modify`].
pub fn can_delete(job: &Job) -> bool {
    can_modify(job)
}

/// Check `action` against the job's current status.
///
/// Returns `AppError::InvalidStateTransition` carrying the current status when
/// the action is not permitted.
pub fn ensure_allowed(job: &Job, action: JobAction) -> AppResult<()> {
    let allowed = match action {
        JobAction::Edit => can_modify(job),
        JobAction::Delete => can_delete(job),
    };

    if allowed {
        return Ok(());
    }

    warn!(
        job_id = %job.id,
        status = %job.status,
        action = %action,
        "Rejected mutation of non-pending job"
    );

    Err(AppError::InvalidStateTransition {
        action,
        status: job.status,
    })
}
