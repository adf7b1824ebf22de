//! Job execution models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Outcome of a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Running,
    Completed,
    Failed,
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One recorded run of a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct JobExecution {
    /// Execution UUID.
    pub id: Uuid,
    /// Owning job.
    pub job_id: Uuid,
    pub status: ExecutionStatus,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    /// Error message if the run failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Fields for recording a run against an existing job.
#[derive(Debug, Clone)]
pub struct NewExecution {
    pub status: ExecutionStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
}

impl NewExecution {
    /// A run that started at `started_at` and is still going.
    pub fn running(started_at: DateTime<Utc>) -> Self {
        Self {
            status: ExecutionStatus::Running,
            started_at,
            finished_at: None,
            error_message: None,
        }
    }
}

/// Execution list response.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ExecutionListResponse {
    /// Executions, most recent first.
    pub executions: Vec<JobExecution>,
    pub total: usize,
}
