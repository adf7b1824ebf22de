//! Job Ledger Server - Main entry point.
//!
//! Starts the Actix-web server with configured routes and middleware.

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use job_ledger_lib::api;
use job_ledger_lib::config::Config;
use job_ledger_lib::db::{DbPool, JobStore};
use job_ledger_lib::middleware::RequestLogger;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Check for --health-check flag (used by container health checks)
    if std::env::args().any(|arg| arg == "--health-check") {
        let healthy = match Config::from_env() {
            Ok(config) => api::health::check_listener(&config.local_address()).await,
            Err(_) => false,
        };
        std::process::exit(if healthy { 0 } else { 1 });
    }

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("");
            error!("Please check your environment variables:");
            error!("  - RUST_ENV must be set to 'development' or 'production'");
            error!("  - In production, DATABASE_URL must not match the development default");
            std::process::exit(1);
        }
    };

    info!("========================================");
    info!("  Job Ledger Server");
    info!("  Environment: {}", config.environment);
    info!("========================================");

    if config.is_development() {
        warn!("Running in DEVELOPMENT mode - do not use in production!");
    }

    let pool = DbPool::new(&config)
        .await
        .expect("Failed to connect to database");
    info!("Database connection established");

    pool.run_migrations()
        .await
        .expect("Failed to run migrations");

    let store: Arc<dyn JobStore> = Arc::new(pool);
    let bind_address = config.bind_address();

    let worker_count = if config.is_development() {
        info!(
            "Starting server at http://{} (4 workers - development mode)",
            bind_address
        );
        4
    } else {
        let cpus = num_cpus::get();
        info!(
            "Starting server at http://{} ({} workers)",
            bind_address, cpus
        );
        cpus
    };

    HttpServer::new(move || {
        App::new()
            .wrap(RequestLogger)
            .app_data(web::Data::from(store.clone()))
            .service(web::scope("/api/v1").configure(api::configure_routes))
    })
    .workers(worker_count)
    .bind(&bind_address)?
    .run()
    .await
}
