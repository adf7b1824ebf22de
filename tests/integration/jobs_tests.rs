//! Tests for job submission, listing, editing, and deletion.

use actix_web::test;
use chrono::Duration;
use job_ledger_lib::db::JobStore;
use job_ledger_lib::models::{JobPriority, JobStatus};
use serde_json::json;
use uuid::Uuid;

use super::test_helpers::*;

#[actix_rt::test]
async fn test_create_job_is_pending_and_owned() {
    let (_store, app) = create_test_app().await;
    let owner = Uuid::new_v4();

    let req = test::TestRequest::post()
        .uri("/api/v1/jobs")
        .set_json(json!({ "name": "transcode", "priority": "high" }));
    let (status, body) = call(&app, req, owner).await;

    assert_eq!(status, 201);
    assert_eq!(body["name"], "transcode");
    assert_eq!(body["status"], "pending");
    assert_eq!(body["priority"], "high");
    assert_eq!(body["owner"], owner.to_string());
    assert!(body.get("wait_time").is_none());
}

#[actix_rt::test]
async fn test_create_job_defaults_to_medium_priority() {
    let (_store, app) = create_test_app().await;

    let req = test::TestRequest::post()
        .uri("/api/v1/jobs")
        .set_json(json!({ "name": "backup" }));
    let (status, body) = call(&app, req, Uuid::new_v4()).await;

    assert_eq!(status, 201);
    assert_eq!(body["priority"], "medium");
}

#[actix_rt::test]
async fn test_create_job_rejects_blank_name() {
    let (_store, app) = create_test_app().await;

    let req = test::TestRequest::post()
        .uri("/api/v1/jobs")
        .set_json(json!({ "name": "   " }));
    let (status, body) = call(&app, req, Uuid::new_v4()).await;

    assert_eq!(status, 400);
    assert_eq!(body["error"], "INVALID_INPUT");
}

#[actix_rt::test]
async fn test_create_job_rejects_malformed_body() {
    let (_store, app) = create_test_app().await;

    let req = test::TestRequest::post()
        .uri("/api/v1/jobs")
        .set_json(json!({ "name": "x", "priority": "urgent" }));
    let (status, body) = call(&app, req, Uuid::new_v4()).await;

    assert_eq!(status, 400);
    assert_eq!(body["error"], "INVALID_INPUT");
}

#[actix_rt::test]
async fn test_missing_caller_identity_unauthorized() {
    let (_store, app) = create_test_app().await;

    let req = test::TestRequest::get().uri("/api/v1/jobs").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 401);
}

#[actix_rt::test]
async fn test_list_jobs_filters_by_status() {
    let (store, app) = create_test_app().await;
    let owner = Uuid::new_v4();

    store.insert_job(job(owner, JobStatus::Pending, JobPriority::Low)).await;
    store.insert_job(job(owner, JobStatus::Running, JobPriority::Low)).await;
    store.insert_job(job(owner, JobStatus::Running, JobPriority::High)).await;
    store.insert_job(job(Uuid::new_v4(), JobStatus::Running, JobPriority::High)).await;

    let req = test::TestRequest::get().uri("/api/v1/jobs?status=running");
    let (status, body) = call(&app, req, owner).await;

    assert_eq!(status, 200);
    assert_eq!(body["total"], 2);
    assert_eq!(body["status_filter"], "running");
    for job in body["jobs"].as_array().unwrap() {
        assert_eq!(job["status"], "running");
    }
}

#[actix_rt::test]
async fn test_list_jobs_ignores_unknown_status() {
    let (store, app) = create_test_app().await;
    let owner = Uuid::new_v4();

    store.insert_job(job(owner, JobStatus::Pending, JobPriority::Low)).await;
    store.insert_job(completed_job(owner, 1, 1)).await;

    let req = test::TestRequest::get().uri("/api/v1/jobs?status=archived");
    let (status, body) = call(&app, req, owner).await;

    assert_eq!(status, 200);
    assert_eq!(body["total"], 2);
    assert!(body.get("status_filter").is_none());
}

fn names(body: &serde_json::Value) -> Vec<String> {
    body["jobs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|j| j["name"].as_str().unwrap().to_string())
        .collect()
}

#[actix_rt::test]
async fn test_list_jobs_search_requires_every_term() {
    let (store, app) = create_test_app().await;
    let owner = Uuid::new_v4();

    for name in ["Nightly Backup", "nightly report", "weekly backup"] {
        let mut j = job(owner, JobStatus::Pending, JobPriority::Low);
        j.name = name.to_string();
        store.insert_job(j).await;
    }
    let mut foreign = job(Uuid::new_v4(), JobStatus::Pending, JobPriority::Low);
    foreign.name = "nightly backup".to_string();
    store.insert_job(foreign).await;

    let req = test::TestRequest::get().uri("/api/v1/jobs?search=NIGHTLY");
    let (status, body) = call(&app, req, owner).await;
    assert_eq!(status, 200);
    assert_eq!(body["total"], 2);

    let req = test::TestRequest::get().uri("/api/v1/jobs?search=nightly,backup");
    let (_, body) = call(&app, req, owner).await;
    assert_eq!(names(&body), vec!["Nightly Backup"]);
}

#[actix_rt::test]
async fn test_list_jobs_ordered_by_priority_then_newest() {
    let (store, app) = create_test_app().await;
    let owner = Uuid::new_v4();

    store.insert_job(job(owner, JobStatus::Pending, JobPriority::Low)).await;
    store.insert_job(job(owner, JobStatus::Pending, JobPriority::High)).await;
    store.insert_job(job(owner, JobStatus::Running, JobPriority::Medium)).await;
    store.insert_job(job(owner, JobStatus::Failed, JobPriority::High)).await;

    let req = test::TestRequest::get().uri("/api/v1/jobs?ordering=priority");
    let (status, body) = call(&app, req, owner).await;

    assert_eq!(status, 200);
    assert_eq!(
        names(&body),
        vec!["failed-high", "pending-high", "running-medium", "pending-low"]
    );
}

#[actix_rt::test]
async fn test_list_jobs_by_deadline_keeps_undated_last() {
    let (store, app) = create_test_app().await;
    let owner = Uuid::new_v4();

    for (name, hours) in [("soon", Some(1)), ("undated", None), ("later", Some(5))] {
        let mut j = job(owner, JobStatus::Pending, JobPriority::Medium);
        j.name = name.to_string();
        j.deadline = hours.map(|h| base_time() + Duration::hours(h));
        store.insert_job(j).await;
    }

    let req = test::TestRequest::get().uri("/api/v1/jobs?ordering=-deadline");
    let (_, body) = call(&app, req, owner).await;
    assert_eq!(names(&body), vec!["later", "soon", "undated"]);

    let req = test::TestRequest::get().uri("/api/v1/jobs?ordering=deadline,bogus");
    let (status, body) = call(&app, req, owner).await;
    assert_eq!(status, 200);
    assert_eq!(names(&body), vec!["soon", "later", "undated"]);
}

#[actix_rt::test]
async fn test_job_detail_includes_timings() {
    let (store, app) = create_test_app().await;
    let owner = Uuid::new_v4();
    let done = completed_job(owner, 15, 45);
    let id = done.id;
    store.insert_job(done).await;

    let req = test::TestRequest::get().uri(&format!("/api/v1/jobs/{}", id));
    let (status, body) = call(&app, req, owner).await;

    assert_eq!(status, 200);
    assert_eq!(body["id"], id.to_string());
    assert_eq!(body["wait_time"].as_f64(), Some(15.0));
    assert_eq!(body["duration"].as_f64(), Some(45.0));
    assert_eq!(body["executions"], json!([]));
}

#[actix_rt::test]
async fn test_other_owners_job_not_found() {
    let (store, app) = create_test_app().await;
    let owner = Uuid::new_v4();
    let foreign = job(owner, JobStatus::Pending, JobPriority::Low);
    let id = foreign.id;
    store.insert_job(foreign).await;

    let caller = Uuid::new_v4();
    let uri = format!("/api/v1/jobs/{}", id);

    let (status, body) = call(&app, test::TestRequest::get().uri(&uri), caller).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "NOT_FOUND");

    let (status, _) = call(&app, test::TestRequest::delete().uri(&uri), caller).await;
    assert_eq!(status, 404);
    assert!(store.get_job(owner, id).await.unwrap().is_some());
}

#[actix_rt::test]
async fn test_malformed_job_id_rejected() {
    let (_store, app) = create_test_app().await;

    let req = test::TestRequest::get().uri("/api/v1/jobs/not-a-uuid");
    let (status, body) = call(&app, req, Uuid::new_v4()).await;

    assert_eq!(status, 400);
    assert_eq!(body["error"], "INVALID_INPUT");
}

#[actix_rt::test]
async fn test_update_pending_job() {
    let (store, app) = create_test_app().await;
    let owner = Uuid::new_v4();
    let pending = job(owner, JobStatus::Pending, JobPriority::Low);
    let id = pending.id;
    store.insert_job(pending).await;

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/jobs/{}", id))
        .set_json(json!({
            "name": "renamed",
            "priority": "high",
            "deadline": "2026-06-01T00:00:00Z"
        }));
    let (status, body) = call(&app, req, owner).await;

    assert_eq!(status, 200);
    assert_eq!(body["name"], "renamed");
    assert_eq!(body["priority"], "high");
    assert_eq!(body["deadline"], "2026-06-01T00:00:00Z");
    assert_eq!(body["status"], "pending");
}

#[actix_rt::test]
async fn test_update_running_job_rejected() {
    let (store, app) = create_test_app().await;
    let owner = Uuid::new_v4();
    let running = job(owner, JobStatus::Running, JobPriority::Low);
    let id = running.id;
    store.insert_job(running).await;

    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/jobs/{}", id))
        .set_json(json!({ "name": "too late" }));
    let (status, body) = call(&app, req, owner).await;

    assert_eq!(status, 400);
    assert_eq!(body["error"], "INVALID_STATE_TRANSITION");
    assert_eq!(body["message"], "Cannot edit a running job");

    let stored = store.get_job(owner, id).await.unwrap().unwrap();
    assert_eq!(stored.name, "running-low");
}

#[actix_rt::test]
async fn test_delete_pending_job() {
    let (store, app) = create_test_app().await;
    let owner = Uuid::new_v4();
    let pending = job(owner, JobStatus::Pending, JobPriority::Medium);
    let id = pending.id;
    store.insert_job(pending).await;

    let req = test::TestRequest::delete().uri(&format!("/api/v1/jobs/{}", id));
    let (status, _) = call(&app, req, owner).await;

    assert_eq!(status, 204);
    assert!(store.get_job(owner, id).await.unwrap().is_none());
}

#[actix_rt::test]
async fn test_delete_finished_jobs_rejected() {
    let (store, app) = create_test_app().await;
    let owner = Uuid::new_v4();

    for status in [JobStatus::Running, JobStatus::Completed, JobStatus::Failed] {
        let j = job(owner, status, JobPriority::Medium);
        let id = j.id;
        store.insert_job(j).await;

        let req = test::TestRequest::delete().uri(&format!("/api/v1/jobs/{}", id));
        let (code, body) = call(&app, req, owner).await;

        assert_eq!(code, 400, "deleting a {} job", status);
        assert_eq!(body["message"], format!("Cannot delete a {} job", status));
        assert!(store.get_job(owner, id).await.unwrap().is_some());
    }
}
