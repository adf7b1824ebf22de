//! Job domain models and DTOs.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::execution::JobExecution;

/// Job lifecycle status.
///
/// `pending` is the initial state. Transitions out of it happen outside this
/// service (a scheduler moves jobs to `running`, then to a terminal state).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Submitted, not yet picked up.
    Pending,
    /// Currently executing.
    Running,
    /// Finished successfully.
    Completed,
    /// Finished with an error.
    Failed,
}

impl JobStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [JobStatus; 4] = [
        Self::Pending,
        Self::Running,
        Self::Completed,
        Self::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Position in lifecycle order.
    pub fn rank(&self) -> usize {
        Self::ALL.iter().position(|s| s == self).unwrap_or(Self::ALL.len())
    }

    /// No transition leaves a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Check whether `next` is a legal successor of this status.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Running)
                | (Self::Running, Self::Completed)
                | (Self::Running, Self::Failed)
        )
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Job priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum JobPriority {
    High,
    #[default]
    Medium,
    Low,
}

impl JobPriority {
    /// Every priority, highest first.
    pub const ALL: [JobPriority; 3] = [Self::High, Self::Medium, Self::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }

    /// Position in importance order, `high` first.
    pub fn rank(&self) -> usize {
        Self::ALL.iter().position(|p| p == self).unwrap_or(Self::ALL.len())
    }
}

impl std::fmt::Display for JobPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A submitted unit of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Job {
    /// Job UUID (UUIDv7, time-ordered).
    pub id: Uuid,
    /// User that created the job. Never reassigned.
    pub owner: Uuid,
    /// Display name.
    pub name: String,
    pub status: JobStatus,
    pub priority: JobPriority,
    /// Optional deadline supplied by the owner.
    pub deadline: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    /// Set when the job moves to `running`.
    pub started_at: Option<DateTime<Utc>>,
    /// Set when the job reaches `completed` or `failed`.
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Seconds between creation and start, once the job has started.
    pub fn wait_time(&self) -> Option<f64> {
        self.started_at.map(|started| seconds_between(self.created_at, started))
    }

    /// Seconds between start and completion, once the job is terminal.
    pub fn duration(&self) -> Option<f64> {
        if !self.status.is_terminal() {
            return None;
        }
        match (self.started_at, self.completed_at) {
            (Some(started), Some(completed)) => Some(seconds_between(started, completed)),
            _ => None,
        }
    }
}

fn seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / 1000.0
}

/// Fields supplied when creating a job.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateJobRequest {
    /// Display name.
    pub name: String,
    #[serde(default)]
    pub priority: JobPriority,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
}

/// Editable fields of a pending job. Omitted fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateJobRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub priority: Option<JobPriority>,
    /// `null` clears the deadline; omitting the field keeps it.
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub deadline: Option<Option<DateTime<Utc>>>,
}

fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Field a job listing can be sorted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobSortField {
    CreatedAt,
    Deadline,
    /// Importance order, `high` first.
    Priority,
    /// Lifecycle order, `pending` first.
    Status,
}

impl JobSortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::Deadline => "deadline",
            Self::Priority => "priority",
            Self::Status => "status",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "created_at" => Some(Self::CreatedAt),
            "deadline" => Some(Self::Deadline),
            "priority" => Some(Self::Priority),
            "status" => Some(Self::Status),
            _ => None,
        }
    }
}

/// One sort key of a job listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobOrdering {
    pub field: JobSortField,
    pub descending: bool,
}

impl JobOrdering {
    /// Newest first.
    pub const NEWEST_FIRST: JobOrdering = JobOrdering {
        field: JobSortField::CreatedAt,
        descending: true,
    };

    /// Parse a comma-separated list such as `-priority,created_at`.
    ///
    /// A leading `-` sorts descending. Unknown and repeated fields are dropped.
    pub fn parse_list(s: &str) -> Vec<JobOrdering> {
        let mut keys: Vec<JobOrdering> = Vec::new();
        for item in s.split(',').map(str::trim) {
            let (descending, name) = match item.strip_prefix('-') {
                Some(name) => (true, name),
                None => (false, item),
            };
            let Some(field) = JobSortField::parse(name) else {
                continue;
            };
            if keys.iter().all(|k| k.field != field) {
                keys.push(JobOrdering { field, descending });
            }
        }
        keys
    }

    /// Compare two jobs on this key. Jobs without a deadline sort last in
    /// either direction.
    pub fn compare(&self, a: &Job, b: &Job) -> Ordering {
        let directed = |ord: Ordering| if self.descending { ord.reverse() } else { ord };

        match self.field {
            JobSortField::CreatedAt => directed(a.created_at.cmp(&b.created_at)),
            JobSortField::Priority => directed(a.priority.rank().cmp(&b.priority.rank())),
            JobSortField::Status => directed(a.status.rank().cmp(&b.status.rank())),
            JobSortField::Deadline => match (a.deadline, b.deadline) {
                (Some(x), Some(y)) => directed(x.cmp(&y)),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
        }
    }
}

/// Filter and sort order for listing one owner's jobs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobQuery {
    pub status: Option<JobStatus>,
    /// Lowercased terms that must all occur in the job name.
    pub search: Vec<String>,
    /// Sort keys in priority order. Empty means newest first.
    pub ordering: Vec<JobOrdering>,
}

impl JobQuery {
    /// Split a search string into terms on whitespace and commas.
    pub fn search_terms(s: &str) -> Vec<String> {
        s.split(|c: char| c.is_whitespace() || c == ',')
            .filter(|term| !term.is_empty())
            .map(str::to_lowercase)
            .collect()
    }

    /// Sort keys to apply, falling back to newest first.
    pub fn sort_keys(&self) -> Vec<JobOrdering> {
        if self.ordering.is_empty() {
            vec![JobOrdering::NEWEST_FIRST]
        } else {
            self.ordering.clone()
        }
    }

    /// Whether `job` passes the status filter and every search term.
    pub fn matches(&self, job: &Job) -> bool {
        if self.status.is_some_and(|status| job.status != status) {
            return false;
        }
        let name = job.name.to_lowercase();
        self.search.iter().all(|term| name.contains(term.as_str()))
    }

    /// Sort jobs by the requested keys, then by ID descending.
    pub fn sort(&self, jobs: &mut [Job]) {
        let keys = self.sort_keys();
        jobs.sort_by(|a, b| {
            keys.iter()
                .map(|key| key.compare(a, b))
                .find(|ord| ord.is_ne())
                .unwrap_or(Ordering::Equal)
                .then(b.id.cmp(&a.id))
        });
    }
}

/// Query parameters for listing jobs.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ListJobsParams {
    /// Filter by status. Unrecognised values are ignored.
    #[serde(default)]
    pub status: Option<String>,
    /// Case-insensitive name search. Every whitespace- or comma-separated
    /// term must match.
    #[serde(default)]
    pub search: Option<String>,
    /// Comma-separated sort fields (`created_at`, `deadline`, `priority`,
    /// `status`), each optionally prefixed with `-` for descending.
    #[serde(default)]
    pub ordering: Option<String>,
}

impl ListJobsParams {
    pub fn status_filter(&self) -> Option<JobStatus> {
        self.status.as_deref().and_then(JobStatus::parse)
    }

    /// Build the store query these parameters describe.
    pub fn query(&self) -> JobQuery {
        JobQuery {
            status: self.status_filter(),
            search: self
                .search
                .as_deref()
                .map(JobQuery::search_terms)
                .unwrap_or_default(),
            ordering: self
                .ordering
                .as_deref()
                .map(JobOrdering::parse_list)
                .unwrap_or_default(),
        }
    }
}

/// Job as returned by the API, with derived timings.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct JobResponse {
    #[serde(flatten)]
    pub job: Job,
    /// Seconds waited before starting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_time: Option<f64>,
    /// Seconds spent running.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

impl From<Job> for JobResponse {
    fn from(job: Job) -> Self {
        let wait_time = job.wait_time();
        let duration = job.duration();
        Self {
            job,
            wait_time,
            duration,
        }
    }
}

/// Job list response.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct JobListResponse {
    pub jobs: Vec<JobResponse>,
    /// Number of jobs returned.
    pub total: usize,
    /// Status filter that was applied, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_filter: Option<JobStatus>,
}

/// Job detail response including its execution history.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct JobDetailResponse {
    #[serde(flatten)]
    pub job: JobResponse,
    /// Executions, most recent first.
    pub executions: Vec<JobExecution>,
}
