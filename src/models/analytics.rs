//! Aggregate statistics returned by the analytics endpoint.

use serde::Serialize;
use utoipa::ToSchema;

use super::job::{JobPriority, JobStatus};

/// Job counts per status. Every status is always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct StatusBreakdown {
    pub pending: u64,
    pub running: u64,
    pub completed: u64,
    pub failed: u64,
}

impl StatusBreakdown {
    pub(crate) fn increment(&mut self, status: JobStatus) {
        match status {
            JobStatus::Pending => self.pending += 1,
            JobStatus::Running => self.running += 1,
            JobStatus::Completed => self.completed += 1,
            JobStatus::Failed => self.failed += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.pending + self.running + self.completed + self.failed
    }
}

/// Job counts per priority. Every priority is always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct PriorityBreakdown {
    pub high: u64,
    pub medium: u64,
    pub low: u64,
}

impl PriorityBreakdown {
    pub(crate) fn increment(&mut self, priority: JobPriority) {
        match priority {
            JobPriority::High => self.high += 1,
            JobPriority::Medium => self.medium += 1,
            JobPriority::Low => self.low += 1,
        }
    }
}

/// Per-owner job analytics.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct JobAnalytics {
    /// Number of jobs considered.
    pub total_jobs: u64,
    pub by_status: StatusBreakdown,
    pub by_priority: PriorityBreakdown,
    /// Mean seconds between creation and start over completed jobs (0 if none).
    pub avg_wait_time: f64,
    /// Mean seconds between start and completion over completed jobs (0 if none).
    pub avg_execution_time: f64,
}
