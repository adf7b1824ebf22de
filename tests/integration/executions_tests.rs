//! Tests for execution history endpoints.

use actix_web::test;
use chrono::Duration;
use job_ledger_lib::db::JobStore;
use job_ledger_lib::models::{ExecutionStatus, JobPriority, JobStatus, NewExecution};
use uuid::Uuid;

use super::test_helpers::*;

fn failed_run(offset: i64) -> NewExecution {
    NewExecution {
        status: ExecutionStatus::Failed,
        started_at: base_time() + Duration::seconds(offset),
        finished_at: Some(base_time() + Duration::seconds(offset + 5)),
        error_message: Some("exit status 1".to_string()),
    }
}

#[actix_rt::test]
async fn test_job_executions_newest_first() {
    let (store, app) = create_test_app().await;
    let owner = Uuid::new_v4();
    let j = job(owner, JobStatus::Running, JobPriority::High);
    let id = j.id;
    store.insert_job(j).await;

    for offset in [0, 60, 30] {
        store.record_execution(id, failed_run(offset)).await.unwrap();
    }
    store
        .record_execution(id, NewExecution::running(base_time() + Duration::seconds(90)))
        .await
        .unwrap();

    let req = test::TestRequest::get().uri(&format!("/api/v1/jobs/{}/executions", id));
    let (status, body) = call(&app, req, owner).await;

    assert_eq!(status, 200);
    assert_eq!(body["total"], 4);

    let runs = body["executions"].as_array().unwrap();
    assert_eq!(runs[0]["status"], "running");
    assert!(runs[0].get("finished_at").is_none());
    assert_eq!(runs[1]["started_at"], "2026-05-04T08:01:00Z");
    assert_eq!(runs[2]["started_at"], "2026-05-04T08:00:30Z");
    assert_eq!(runs[3]["started_at"], "2026-05-04T08:00:00Z");
    assert_eq!(runs[3]["error_message"], "exit status 1");
}

#[actix_rt::test]
async fn test_job_executions_of_foreign_job_not_found() {
    let (store, app) = create_test_app().await;
    let j = job(Uuid::new_v4(), JobStatus::Running, JobPriority::Low);
    let id = j.id;
    store.insert_job(j).await;
    store.record_execution(id, failed_run(0)).await.unwrap();

    let req = test::TestRequest::get().uri(&format!("/api/v1/jobs/{}/executions", id));
    let (status, _) = call(&app, req, Uuid::new_v4()).await;

    assert_eq!(status, 404);
}

#[actix_rt::test]
async fn test_owner_executions_scoped_to_caller() {
    let (store, app) = create_test_app().await;
    let owner = Uuid::new_v4();
    let other = Uuid::new_v4();

    let mine = job(owner, JobStatus::Failed, JobPriority::Medium);
    let theirs = job(other, JobStatus::Failed, JobPriority::Medium);
    let (mine_id, theirs_id) = (mine.id, theirs.id);
    store.insert_job(mine).await;
    store.insert_job(theirs).await;

    store.record_execution(mine_id, failed_run(0)).await.unwrap();
    store.record_execution(mine_id, failed_run(10)).await.unwrap();
    store.record_execution(theirs_id, failed_run(20)).await.unwrap();

    let req = test::TestRequest::get().uri("/api/v1/executions");
    let (status, body) = call(&app, req, owner).await;

    assert_eq!(status, 200);
    assert_eq!(body["total"], 2);
    for run in body["executions"].as_array().unwrap() {
        assert_eq!(run["job_id"], mine_id.to_string());
    }
}

#[actix_rt::test]
async fn test_job_detail_lists_executions() {
    let (store, app) = create_test_app().await;
    let owner = Uuid::new_v4();
    let j = job(owner, JobStatus::Running, JobPriority::Medium);
    let id = j.id;
    store.insert_job(j).await;
    store
        .record_execution(id, NewExecution::running(base_time()))
        .await
        .unwrap();

    let req = test::TestRequest::get().uri(&format!("/api/v1/jobs/{}", id));
    let (status, body) = call(&app, req, owner).await;

    assert_eq!(status, 200);
    assert_eq!(body["status"], "running");
    assert_eq!(body["executions"].as_array().unwrap().len(), 1);
    assert_eq!(body["executions"][0]["job_id"], id.to_string());
}

#[actix_rt::test]
async fn test_single_execution_visible_only_to_owner() {
    let (store, app) = create_test_app().await;
    let owner = Uuid::new_v4();
    let j = job(owner, JobStatus::Failed, JobPriority::Low);
    let job_id = j.id;
    store.insert_job(j).await;
    let run = store.record_execution(job_id, failed_run(0)).await.unwrap();

    let uri = format!("/api/v1/executions/{}", run.id);
    let (status, body) = call(&app, test::TestRequest::get().uri(&uri), owner).await;
    assert_eq!(status, 200);
    assert_eq!(body["id"], run.id.to_string());
    assert_eq!(body["job_id"], job_id.to_string());
    assert_eq!(body["error_message"], "exit status 1");

    let (status, body) = call(&app, test::TestRequest::get().uri(&uri), Uuid::new_v4()).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "NOT_FOUND");

    let uri = format!("/api/v1/executions/{}", Uuid::new_v4());
    let (status, _) = call(&app, test::TestRequest::get().uri(&uri), owner).await;
    assert_eq!(status, 404);
}
