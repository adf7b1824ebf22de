//! Database queries for jobs.
//!
//! Owner edits, deletes and scheduler transitions are single conditional
//! statements keyed on the status the caller expects, so a concurrent status
//! change makes the write match no row instead of overwriting it.

use chrono::Utc;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::NullOrdering;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, Order, QueryFilter, QueryOrder, Select, Set,
};
use tracing::info;
use uuid::Uuid;

use crate::entity::job::{self as job, ActiveModel, Entity as JobEntity};
use crate::error::{AppError, AppResult};
use crate::models::{
    CreateJobRequest, Job, JobPriority, JobQuery, JobSortField, JobStatus, UpdateJobRequest,
};
use crate::services::guard::{self, JobAction};

use super::DbPool;
use super::store;

/// Convert a database row into a domain job.
pub(crate) fn job_from_model(model: job::Model) -> AppResult<Job> {
    let status = JobStatus::parse(&model.status).ok_or_else(|| {
        AppError::Database(format!(
            "Job {} has unknown status '{}'",
            model.id, model.status
        ))
    })?;
    let priority = JobPriority::parse(&model.priority).ok_or_else(|| {
        AppError::Database(format!(
            "Job {} has unknown priority '{}'",
            model.id, model.priority
        ))
    })?;

    Ok(Job {
        id: model.id,
        owner: model.owner_id,
        name: model.name,
        status,
        priority,
        deadline: model.deadline,
        created_at: model.created_at,
        started_at: model.started_at,
        completed_at: model.completed_at,
        updated_at: model.updated_at,
    })
}

/// ILIKE pattern matching `term` anywhere, with wildcards in the term escaped.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// `CASE` expression mapping a text column to the rank of each value.
fn rank_sql<'a>(column: &str, values: impl IntoIterator<Item = (&'a str, usize)>) -> String {
    let arms: String = values
        .into_iter()
        .map(|(value, rank)| format!(" WHEN '{}' THEN {}", value, rank))
        .collect();
    format!("CASE \"{}\"{} END", column, arms)
}

fn apply_query(mut select: Select<JobEntity>, query: &JobQuery) -> Select<JobEntity> {
    if let Some(status) = query.status {
        select = select.filter(job::Column::Status.eq(status.as_str()));
    }

    for term in &query.search {
        let name = Expr::col((job::Entity, job::Column::Name));
        select = select.filter(name.ilike(like_pattern(term)));
    }

    for key in query.sort_keys() {
        let order = if key.descending {
            Order::Desc
        } else {
            Order::Asc
        };
        select = match key.field {
            JobSortField::CreatedAt => select.order_by(job::Column::CreatedAt, order),
            JobSortField::Deadline => {
                select.order_by_with_nulls(job::Column::Deadline, order, NullOrdering::Last)
            }
            JobSortField::Priority => select.order_by(
                Expr::cust(rank_sql(
                    "priority",
                    JobPriority::ALL.iter().map(|p| (p.as_str(), p.rank())),
                )),
                order,
            ),
            JobSortField::Status => select.order_by(
                Expr::cust(rank_sql(
                    "status",
                    JobStatus::ALL.iter().map(|s| (s.as_str(), s.rank())),
                )),
                order,
            ),
        };
    }

    select.order_by_desc(job::Column::Id)
}

impl DbPool {
    /// Fetch a job row by ID regardless of owner.
    async fn find_job_row(&self, id: Uuid) -> AppResult<Option<job::Model>> {
        let result = JobEntity::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get job: {}", e)))?;

        Ok(result)
    }

    /// Explain why a guarded owner write matched no row.
    async fn rejected_write(&self, owner: Uuid, id: Uuid, action: JobAction) -> AppError {
        let job = match self.get_job_by_id(owner, id).await {
            Ok(Some(job)) => job,
            Ok(None) => return AppError::NotFound(format!("Job {}", id)),
            Err(e) => return e,
        };

        match guard::ensure_allowed(&job, action) {
            Err(e) => e,
            Ok(()) => AppError::Database(format!("Job {} changed during {}", id, action)),
        }
    }

    /// List an owner's jobs matching `query`.
    pub async fn query_jobs(&self, owner: Uuid, query: &JobQuery) -> AppResult<Vec<Job>> {
        let select = JobEntity::find().filter(job::Column::OwnerId.eq(owner));

        let rows = apply_query(select, query)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to query jobs: {}", e)))?;

        rows.into_iter().map(job_from_model).collect()
    }

    /// Get an owner's job by ID.
    pub async fn get_job_by_id(&self, owner: Uuid, id: Uuid) -> AppResult<Option<Job>> {
        let result = JobEntity::find_by_id(id)
            .filter(job::Column::OwnerId.eq(owner))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get job: {}", e)))?;

        result.map(job_from_model).transpose()
    }

    /// Insert a new pending job.
    pub async fn insert_job(&self, owner: Uuid, request: CreateJobRequest) -> AppResult<Job> {
        let job = store::new_job(owner, request, Utc::now())?;

        let model = ActiveModel {
            id: Set(job.id),
            owner_id: Set(job.owner),
            name: Set(job.name.clone()),
            status: Set(job.status.as_str().to_string()),
            priority: Set(job.priority.as_str().to_string()),
            deadline: Set(job.deadline),
            created_at: Set(job.created_at),
            started_at: Set(None),
            completed_at: Set(None),
            updated_at: Set(job.updated_at),
        };

        let result = model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert job: {}", e)))?;

        info!(job_id = %result.id, owner = %owner, "Job created");

        job_from_model(result)
    }

    /// Edit a pending job. Only the editable columns are written.
    pub async fn update_pending_job(
        &self,
        owner: Uuid,
        id: Uuid,
        request: UpdateJobRequest,
    ) -> AppResult<Job> {
        let request = store::validated_update(request)?;

        let mut update =
            JobEntity::update_many().col_expr(job::Column::UpdatedAt, Expr::value(Utc::now()));
        if let Some(name) = request.name {
            update = update.col_expr(job::Column::Name, Expr::value(name));
        }
        if let Some(priority) = request.priority {
            update = update.col_expr(job::Column::Priority, Expr::value(priority.as_str()));
        }
        if let Some(deadline) = request.deadline {
            update = update.col_expr(job::Column::Deadline, Expr::value(deadline));
        }

        let result = update
            .filter(job::Column::Id.eq(id))
            .filter(job::Column::OwnerId.eq(owner))
            .filter(job::Column::Status.eq(JobStatus::Pending.as_str()))
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update job: {}", e)))?;

        if result.rows_affected == 0 {
            return Err(self.rejected_write(owner, id, JobAction::Edit).await);
        }

        let job = self
            .get_job_by_id(owner, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Job {}", id)))?;
        info!(job_id = %id, "Job updated");

        Ok(job)
    }

    /// Delete a pending job. Executions are removed by the foreign key cascade.
    pub async fn delete_pending_job(&self, owner: Uuid, id: Uuid) -> AppResult<()> {
        let result = JobEntity::delete_many()
            .filter(job::Column::Id.eq(id))
            .filter(job::Column::OwnerId.eq(owner))
            .filter(job::Column::Status.eq(JobStatus::Pending.as_str()))
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete job: {}", e)))?;

        if result.rows_affected == 0 {
            return Err(self.rejected_write(owner, id, JobAction::Delete).await);
        }

        info!(job_id = %id, "Job deleted");

        Ok(())
    }

    /// Update job status, stamping start or completion time.
    pub async fn update_job_status(&self, id: Uuid, next: JobStatus) -> AppResult<Job> {
        let row = self
            .find_job_row(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Job {}", id)))?;

        let mut job = job_from_model(row)?;
        let previous = job.status;
        store::apply_transition(&mut job, next, Utc::now())?;

        let result = JobEntity::update_many()
            .col_expr(job::Column::Status, Expr::value(job.status.as_str()))
            .col_expr(job::Column::StartedAt, Expr::value(job.started_at))
            .col_expr(job::Column::CompletedAt, Expr::value(job.completed_at))
            .col_expr(job::Column::UpdatedAt, Expr::value(job.updated_at))
            .filter(job::Column::Id.eq(id))
            .filter(job::Column::Status.eq(previous.as_str()))
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update job status: {}", e)))?;

        if result.rows_affected == 0 {
            return Err(AppError::InvalidInput(format!(
                "Job {} is no longer {}",
                id, previous
            )));
        }

        info!(job_id = %id, from = %previous, to = %next, "Job status changed");

        Ok(job)
    }

    /// Check a job exists.
    pub(crate) async fn job_exists(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.find_job_row(id).await?.is_some())
    }
}
