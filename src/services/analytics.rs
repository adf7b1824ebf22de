//! Job analytics over an in-memory snapshot of one owner's jobs.
//!
//! All functions are pure. Wait and execution averages only consider jobs
//! whose status is exactly `completed` and whose relevant timestamps are set;
//! jobs missing a timestamp are skipped rather than counted as zero. An empty
//! eligible set averages to 0.

use tracing::debug;

use crate::models::{Job, JobAnalytics, JobStatus, PriorityBreakdown, StatusBreakdown};

/// Count jobs per status.
pub fn status_breakdown(jobs: &[Job]) -> StatusBreakdown {
    jobs.iter().fold(StatusBreakdown::default(), |mut acc, job| {
        acc.increment(job.status);
        acc
    })
}

/// Count jobs per priority.
pub fn priority_breakdown(jobs: &[Job]) -> PriorityBreakdown {
    jobs.iter().fold(PriorityBreakdown::default(), |mut acc, job| {
        acc.increment(job.priority);
        acc
    })
}

/// Mean wait time in seconds over completed jobs that have started.
pub fn average_wait_time(jobs: &[Job]) -> f64 {
    mean(completed(jobs).filter_map(Job::wait_time))
}

/// Mean execution time in seconds over completed jobs with both timestamps.
pub fn average_execution_time(jobs: &[Job]) -> f64 {
    mean(completed(jobs).filter_map(Job::duration))
}

/// Full analytics summary.
pub fn summarize(jobs: &[Job]) -> JobAnalytics {
    let analytics = JobAnalytics {
        total_jobs: jobs.len() as u64,
        by_status: status_breakdown(jobs),
        by_priority: priority_breakdown(jobs),
        avg_wait_time: average_wait_time(jobs),
        avg_execution_time: average_execution_time(jobs),
    };

    debug!(
        total_jobs = analytics.total_jobs,
        avg_wait_time = analytics.avg_wait_time,
        avg_execution_time = analytics.avg_execution_time,
        "Computed job analytics"
    );

    analytics
}

fn completed(jobs: &[Job]) -> impl Iterator<Item = &Job> {
    jobs.iter().filter(|job| job.status == JobStatus::Completed)
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0u64), |(sum, count), v| (sum + v, count + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}
