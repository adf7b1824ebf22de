//! Health check endpoints.

use std::time::Duration;

use actix_web::{HttpResponse, get, web};
use chrono::Utc;
use serde::Serialize;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::warn;
use utoipa::ToSchema;

use crate::db::JobStore;
use crate::error::ErrorResponse;

/// Health check response.
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    status: &'static str,
    timestamp: String,
}

/// Readiness check response.
#[derive(Serialize, ToSchema)]
pub struct ReadyResponse {
    status: &'static str,
    database: &'static str,
}

/// Health check endpoint.
///
/// Returns 200 if the service is running.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
#[get("/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Readiness check endpoint.
///
/// Returns 200 if the job store is reachable.
#[utoipa::path(
    get,
    path = "/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Service is ready", body = ReadyResponse),
        (status = 503, description = "Service unavailable", body = ErrorResponse)
    )
)]
#[get("/ready")]
pub async fn ready(store: web::Data<dyn JobStore>) -> HttpResponse {
    match store.ping().await {
        Ok(()) => HttpResponse::Ok().json(ReadyResponse {
            status: "ready",
            database: "connected",
        }),
        Err(e) => {
            warn!("Readiness check failed: {}", e);
            HttpResponse::ServiceUnavailable().json(ErrorResponse {
                error: "NOT_READY".to_string(),
                message: "Database connection failed".to_string(),
            })
        }
    }
}

/// How long `check_listener` waits for a connection.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Check that a server is accepting connections at `address`.
///
/// Backs the `--health-check` flag, which runs as its own process beside the
/// server.
pub async fn check_listener(address: &str) -> bool {
    match timeout(CONNECT_TIMEOUT, TcpStream::connect(address)).await {
        Ok(Ok(_)) => true,
        Ok(Err(e)) => {
            warn!("Health check could not connect to {}: {}", address, e);
            false
        }
        Err(_) => {
            warn!("Health check against {} timed out", address);
            false
        }
    }
}

/// Configure health routes.
pub fn configure_health_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health).service(ready);
}
