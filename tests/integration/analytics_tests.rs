//! Tests for GET /jobs/analytics.

use actix_web::test;
use job_ledger_lib::models::{JobPriority, JobStatus};
use uuid::Uuid;

use super::test_helpers::*;

const ANALYTICS: &str = "/api/v1/jobs/analytics";

#[actix_rt::test]
async fn test_analytics_empty_owner_reports_zeroes() {
    let (_store, app) = create_test_app().await;

    let owner = Uuid::new_v4();
    let (status, body) = call(&app, test::TestRequest::get().uri(ANALYTICS), owner).await;

    assert_eq!(status, 200);
    assert_eq!(body["total_jobs"], 0);
    for key in ["pending", "running", "completed", "failed"] {
        assert_eq!(body["by_status"][key], 0, "by_status.{key}");
    }
    for key in ["high", "medium", "low"] {
        assert_eq!(body["by_priority"][key], 0, "by_priority.{key}");
    }
    assert_eq!(body["avg_wait_time"].as_f64(), Some(0.0));
    assert_eq!(body["avg_execution_time"].as_f64(), Some(0.0));
}

#[actix_rt::test]
async fn test_analytics_mixed_jobs() {
    let (store, app) = create_test_app().await;
    let owner = Uuid::new_v4();

    store.insert_job(job(owner, JobStatus::Pending, JobPriority::High)).await;
    store.insert_job(job(owner, JobStatus::Running, JobPriority::High)).await;
    store.insert_job(completed_job(owner, 10, 60)).await;
    store.insert_job(completed_job(owner, 30, 120)).await;

    let (status, body) = call(&app, test::TestRequest::get().uri(ANALYTICS), owner).await;

    assert_eq!(status, 200);
    assert_eq!(body["total_jobs"], 4);
    assert_eq!(body["by_status"]["pending"], 1);
    assert_eq!(body["by_status"]["running"], 1);
    assert_eq!(body["by_status"]["completed"], 2);
    assert_eq!(body["by_status"]["failed"], 0);
    assert_eq!(body["by_priority"]["high"], 2);
    assert_eq!(body["by_priority"]["medium"], 2);
    assert_eq!(body["by_priority"]["low"], 0);
    assert_eq!(body["avg_wait_time"].as_f64(), Some(20.0));
    assert_eq!(body["avg_execution_time"].as_f64(), Some(90.0));
}

#[actix_rt::test]
async fn test_analytics_only_counts_callers_jobs() {
    let (store, app) = create_test_app().await;
    let owner = Uuid::new_v4();
    let other = Uuid::new_v4();

    store.insert_job(completed_job(owner, 4, 4)).await;
    store.insert_job(completed_job(other, 400, 400)).await;
    store.insert_job(job(other, JobStatus::Failed, JobPriority::Low)).await;

    let (_, body) = call(&app, test::TestRequest::get().uri(ANALYTICS), owner).await;

    assert_eq!(body["total_jobs"], 1);
    assert_eq!(body["by_status"]["failed"], 0);
    assert_eq!(body["avg_wait_time"].as_f64(), Some(4.0));
}

#[actix_rt::test]
async fn test_analytics_skips_completed_job_without_start() {
    let (store, app) = create_test_app().await;
    let owner = Uuid::new_v4();

    let mut unstarted = job(owner, JobStatus::Completed, JobPriority::Low);
    unstarted.completed_at = Some(base_time());
    store.insert_job(unstarted).await;
    store.insert_job(completed_job(owner, 8, 2)).await;

    let (_, body) = call(&app, test::TestRequest::get().uri(ANALYTICS), owner).await;

    assert_eq!(body["by_status"]["completed"], 2);
    assert_eq!(body["avg_wait_time"].as_f64(), Some(8.0));
    assert_eq!(body["avg_execution_time"].as_f64(), Some(2.0));
}
