//! Database module providing connection management, migrations, and queries.

pub mod executions;
pub mod jobs;
pub mod memory;
pub mod store;

pub use memory::MemoryJobStore;
pub use store::JobStore;

use async_trait::async_trait;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::migration::Migrator;
use crate::models::{
    CreateJobRequest, Job, JobExecution, JobQuery, JobStatus, NewExecution, UpdateJobRequest,
};

/// PostgreSQL connection pool.
#[derive(Clone)]
pub struct DbPool {
    conn: DatabaseConnection,
}

impl DbPool {
    /// Connect using the configured database settings.
    pub async fn new(config: &Config) -> AppResult<Self> {
        let mut options = ConnectOptions::new(config.database.url.clone());
        options
            .max_connections(config.database.max_connections)
            .min_connections(config.database.min_connections)
            .sqlx_logging(false);

        let conn = Database::connect(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to database: {}", e)))?;

        Ok(DbPool { conn })
    }

    /// Get the underlying connection.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Apply pending migrations.
    pub async fn run_migrations(&self) -> AppResult<()> {
        Migrator::up(&self.conn, None)
            .await
            .map_err(|e| AppError::Database(format!("Failed to run migrations: {}", e)))?;

        info!("Database migrations complete");
        Ok(())
    }
}

#[async_trait]
impl JobStore for DbPool {
    async fn ping(&self) -> AppResult<()> {
        self.conn
            .ping()
            .await
            .map_err(|e| AppError::Database(format!("Database ping failed: {}", e)))
    }

    async fn list_jobs(&self, owner: Uuid, query: &JobQuery) -> AppResult<Vec<Job>> {
        self.query_jobs(owner, query).await
    }

    async fn get_job(&self, owner: Uuid, id: Uuid) -> AppResult<Option<Job>> {
        self.get_job_by_id(owner, id).await
    }

    async fn create_job(&self, owner: Uuid, request: CreateJobRequest) -> AppResult<Job> {
        self.insert_job(owner, request).await
    }

    async fn update_job(
        &self,
        owner: Uuid,
        id: Uuid,
        request: UpdateJobRequest,
    ) -> AppResult<Job> {
        self.update_pending_job(owner, id, request).await
    }

    async fn delete_job(&self, owner: Uuid, id: Uuid) -> AppResult<()> {
        self.delete_pending_job(owner, id).await
    }

    async fn transition_job(&self, id: Uuid, next: JobStatus) -> AppResult<Job> {
        self.update_job_status(id, next).await
    }

    async fn list_executions(&self, job_id: Uuid) -> AppResult<Vec<JobExecution>> {
        self.get_executions_by_job_id(job_id).await
    }

    async fn list_owner_executions(&self, owner: Uuid) -> AppResult<Vec<JobExecution>> {
        self.get_executions_by_owner(owner).await
    }

    async fn get_execution(&self, owner: Uuid, id: Uuid) -> AppResult<Option<JobExecution>> {
        self.get_execution_for_owner(owner, id).await
    }

    async fn record_execution(
        &self,
        job_id: Uuid,
        execution: NewExecution,
    ) -> AppResult<JobExecution> {
        self.insert_execution(job_id, execution).await
    }
}
