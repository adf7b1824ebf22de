//! OpenAPI documentation configuration.

use actix_web::{HttpResponse, get, web};
use utoipa::OpenApi;

use crate::{api, error, models};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Job Ledger Server",
        version = "0.1.0",
        description = "API server for submitting jobs, browsing their execution history, and viewing per-owner job analytics"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::ready,
        // Job endpoints
        api::jobs::list_jobs,
        api::jobs::create_job,
        api::jobs::job_analytics,
        api::jobs::get_job,
        api::jobs::update_job,
        api::jobs::delete_job,
        // Execution endpoints
        api::jobs::get_job_executions,
        api::jobs::list_executions,
        api::jobs::get_execution,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            // Health
            api::health::HealthResponse,
            api::health::ReadyResponse,
            // Jobs
            models::JobStatus,
            models::JobPriority,
            models::Job,
            models::JobResponse,
            models::JobDetailResponse,
            models::JobListResponse,
            models::CreateJobRequest,
            models::UpdateJobRequest,
            models::ListJobsParams,
            // Executions
            models::ExecutionStatus,
            models::JobExecution,
            models::ExecutionListResponse,
            // Analytics
            models::JobAnalytics,
            models::StatusBreakdown,
            models::PriorityBreakdown,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Jobs", description = "Job submission, editing, and analytics"),
        (name = "Executions", description = "Job execution history")
    )
)]
pub struct ApiDoc;

/// Serve the OpenAPI document.
#[get("/openapi.json")]
pub async fn openapi_json() -> HttpResponse {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

/// Configure documentation routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(openapi_json);
}
