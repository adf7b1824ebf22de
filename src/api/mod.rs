//! API endpoint modules.

pub mod health;
pub mod jobs;
pub mod openapi;

pub use health::configure_health_routes;
pub use jobs::configure_routes as configure_job_routes;
pub use openapi::ApiDoc;
pub use openapi::configure_routes as configure_doc_routes;

use actix_web::web;

use crate::error::AppError;

/// Configure every API route. Mount under `/api/v1`.
///
/// Malformed JSON bodies, query strings and path parameters are reported with
/// the same error body as every other failure.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::InvalidInput(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::InvalidInput(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::InvalidInput(err.to_string()).into()),
    )
    .configure(configure_health_routes)
    .configure(configure_job_routes)
    .configure(configure_doc_routes);
}
