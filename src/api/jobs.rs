//! Job API handlers.

use actix_web::{HttpResponse, web};
use tracing::info;
use uuid::Uuid;

use crate::auth::Owner;
use crate::db::JobStore;
use crate::error::{AppError, AppResult};
use crate::models::{
    CreateJobRequest, ExecutionListResponse, Job, JobDetailResponse, JobListResponse, JobQuery,
    JobResponse, ListJobsParams, UpdateJobRequest,
};
use crate::services::analytics;

/// Fetch one of the caller's jobs or fail with 404.
async fn owned_job(store: &dyn JobStore, owner: Owner, job_id: Uuid) -> AppResult<Job> {
    store
        .get_job(owner.id, job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {}", job_id)))
}

/// List the caller's jobs.
///
/// Newest first unless `ordering` names other fields. Unrecognised `status`
/// values and ordering fields are ignored.
#[utoipa::path(
    get,
    path = "/jobs",
    tag = "Jobs",
    params(
        ("status" = Option<String>, Query, description = "Filter by status (pending, running, completed, failed)"),
        ("search" = Option<String>, Query, description = "Case-insensitive name search; every term must match"),
        ("ordering" = Option<String>, Query, description = "Comma-separated sort fields (created_at, deadline, priority, status), '-' prefix for descending")
    ),
    responses(
        (status = 200, description = "List of jobs", body = JobListResponse),
        (status = 401, description = "Missing caller identity", body = crate::error::ErrorResponse),
    )
)]
pub async fn list_jobs(
    owner: Owner,
    store: web::Data<dyn JobStore>,
    query: web::Query<ListJobsParams>,
) -> AppResult<HttpResponse> {
    let query = query.query();
    let jobs = store.list_jobs(owner.id, &query).await?;

    let response = JobListResponse {
        total: jobs.len(),
        jobs: jobs.into_iter().map(JobResponse::from).collect(),
        status_filter: query.status,
    };

    Ok(HttpResponse::Ok().json(response))
}

/// Submit a new job.
///
/// The job starts out pending and is owned by the caller.
#[utoipa::path(
    post,
    path = "/jobs",
    tag = "Jobs",
    request_body = CreateJobRequest,
    responses(
        (status = 201, description = "Job created", body = JobResponse),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 401, description = "Missing caller identity", body = crate::error::ErrorResponse),
    )
)]
pub async fn create_job(
    owner: Owner,
    store: web::Data<dyn JobStore>,
    body: web::Json<CreateJobRequest>,
) -> AppResult<HttpResponse> {
    let job = store.create_job(owner.id, body.into_inner()).await?;

    info!(
        "Job submitted: job_id={}, name={:?}, priority={}",
        job.id, job.name, job.priority
    );

    Ok(HttpResponse::Created().json(JobResponse::from(job)))
}

/// Aggregate statistics over the caller's jobs.
#[utoipa::path(
    get,
    path = "/jobs/analytics",
    tag = "Jobs",
    responses(
        (status = 200, description = "Job analytics", body = crate::models::JobAnalytics),
        (status = 401, description = "Missing caller identity", body = crate::error::ErrorResponse),
    )
)]
pub async fn job_analytics(
    owner: Owner,
    store: web::Data<dyn JobStore>,
) -> AppResult<HttpResponse> {
    let jobs = store.list_jobs(owner.id, &JobQuery::default()).await?;
    let summary = analytics::summarize(&jobs);

    Ok(HttpResponse::Ok().json(summary))
}

/// Get a single job with its execution history.
#[utoipa::path(
    get,
    path = "/jobs/{job_id}",
    tag = "Jobs",
    params(
        ("job_id" = Uuid, Path, description = "Job UUID")
    ),
    responses(
        (status = 200, description = "Job details", body = JobDetailResponse),
        (status = 404, description = "Job not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn get_job(
    owner: Owner,
    store: web::Data<dyn JobStore>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let job_id = path.into_inner();
    let job = owned_job(store.get_ref(), owner, job_id).await?;
    let executions = store.list_executions(job_id).await?;

    let response = JobDetailResponse {
        job: JobResponse::from(job),
        executions,
    };

    Ok(HttpResponse::Ok().json(response))
}

/// Edit a pending job.
///
/// Jobs that are running or finished cannot be edited.
#[utoipa::path(
    put,
    path = "/jobs/{job_id}",
    tag = "Jobs",
    params(
        ("job_id" = Uuid, Path, description = "Job UUID")
    ),
    request_body = UpdateJobRequest,
    responses(
        (status = 200, description = "Job updated", body = JobResponse),
        (status = 400, description = "Job is not pending or request invalid", body = crate::error::ErrorResponse),
        (status = 404, description = "Job not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn update_job(
    owner: Owner,
    store: web::Data<dyn JobStore>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateJobRequest>,
) -> AppResult<HttpResponse> {
    let job_id = path.into_inner();
    let job = store.update_job(owner.id, job_id, body.into_inner()).await?;

    info!("Job updated: job_id={}, name={:?}", job.id, job.name);

    Ok(HttpResponse::Ok().json(JobResponse::from(job)))
}

/// Delete a pending job.
///
/// Jobs that are running or finished cannot be deleted.
#[utoipa::path(
    delete,
    path = "/jobs/{job_id}",
    tag = "Jobs",
    params(
        ("job_id" = Uuid, Path, description = "Job UUID")
    ),
    responses(
        (status = 204, description = "Job deleted"),
        (status = 400, description = "Job is not pending", body = crate::error::ErrorResponse),
        (status = 404, description = "Job not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn delete_job(
    owner: Owner,
    store: web::Data<dyn JobStore>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let job_id = path.into_inner();
    store.delete_job(owner.id, job_id).await?;

    info!("Job deleted: job_id={}", job_id);

    Ok(HttpResponse::NoContent().finish())
}

/// Execution history of one job, most recent first.
#[utoipa::path(
    get,
    path = "/jobs/{job_id}/executions",
    tag = "Executions",
    params(
        ("job_id" = Uuid, Path, description = "Job UUID")
    ),
    responses(
        (status = 200, description = "Executions of the job", body = ExecutionListResponse),
        (status = 404, description = "Job not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn get_job_executions(
    owner: Owner,
    store: web::Data<dyn JobStore>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let job_id = path.into_inner();
    owned_job(store.get_ref(), owner, job_id).await?;

    let executions = store.list_executions(job_id).await?;
    let response = ExecutionListResponse {
        total: executions.len(),
        executions,
    };

    Ok(HttpResponse::Ok().json(response))
}

/// Executions of every job the caller owns, most recent first.
#[utoipa::path(
    get,
    path = "/executions",
    tag = "Executions",
    responses(
        (status = 200, description = "Executions across the caller's jobs", body = ExecutionListResponse),
        (status = 401, description = "Missing caller identity", body = crate::error::ErrorResponse),
    )
)]
pub async fn list_executions(
    owner: Owner,
    store: web::Data<dyn JobStore>,
) -> AppResult<HttpResponse> {
    let executions = store.list_owner_executions(owner.id).await?;
    let response = ExecutionListResponse {
        total: executions.len(),
        executions,
    };

    Ok(HttpResponse::Ok().json(response))
}

/// One execution of a job the caller owns.
#[utoipa::path(
    get,
    path = "/executions/{execution_id}",
    tag = "Executions",
    params(
        ("execution_id" = Uuid, Path, description = "Execution UUID")
    ),
    responses(
        (status = 200, description = "Execution", body = crate::models::JobExecution),
        (status = 404, description = "Execution not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn get_execution(
    owner: Owner,
    store: web::Data<dyn JobStore>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let execution_id = path.into_inner();
    let execution = store
        .get_execution(owner.id, execution_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Execution {}", execution_id)))?;

    Ok(HttpResponse::Ok().json(execution))
}

/// Configure job routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/jobs")
            .route(web::get().to(list_jobs))
            .route(web::post().to(create_job)),
    )
    // Registered before /jobs/{job_id} so "analytics" is not read as an ID
    .service(web::resource("/jobs/analytics").route(web::get().to(job_analytics)))
    .service(
        web::resource("/jobs/{job_id}")
            .route(web::get().to(get_job))
            .route(web::put().to(update_job))
            .route(web::patch().to(update_job))
            .route(web::delete().to(delete_job)),
    )
    .service(
        web::resource("/jobs/{job_id}/executions").route(web::get().to(get_job_executions)),
    )
    .service(web::resource("/executions").route(web::get().to(list_executions)))
    .service(web::resource("/executions/{execution_id}").route(web::get().to(get_execution)));
}
