//! Database queries for job executions.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, JoinType, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, Set,
};
use uuid::Uuid;

use crate::entity::job;
use crate::entity::job_execution::{
    self as execution, ActiveModel, Entity as ExecutionEntity, Relation,
};
use crate::error::{AppError, AppResult};
use crate::models::{ExecutionStatus, JobExecution, NewExecution};

use super::DbPool;

fn execution_from_model(model: execution::Model) -> AppResult<JobExecution> {
    let status = ExecutionStatus::parse(&model.status).ok_or_else(|| {
        AppError::Database(format!(
            "Execution {} has unknown status '{}'",
            model.id, model.status
        ))
    })?;

    Ok(JobExecution {
        id: model.id,
        job_id: model.job_id,
        status,
        started_at: model.started_at,
        finished_at: model.finished_at,
        error_message: model.error_message,
    })
}

impl DbPool {
    /// Get executions for a job, most recent first.
    pub async fn get_executions_by_job_id(&self, job_id: Uuid) -> AppResult<Vec<JobExecution>> {
        let rows = ExecutionEntity::find()
            .filter(execution::Column::JobId.eq(job_id))
            .order_by_desc(execution::Column::StartedAt)
            .order_by_desc(execution::Column::Id)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get executions: {}", e)))?;

        rows.into_iter().map(execution_from_model).collect()
    }

    /// Get executions across all of an owner's jobs, most recent first.
    pub async fn get_executions_by_owner(&self, owner: Uuid) -> AppResult<Vec<JobExecution>> {
        let rows = ExecutionEntity::find()
            .join(JoinType::InnerJoin, Relation::Job.def())
            .filter(job::Column::OwnerId.eq(owner))
            .order_by_desc(execution::Column::StartedAt)
            .order_by_desc(execution::Column::Id)
            .all(self.connection())
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to get executions for owner: {}", e))
            })?;

        rows.into_iter().map(execution_from_model).collect()
    }

    /// Get one execution, scoped to the owner of its job.
    pub async fn get_execution_for_owner(
        &self,
        owner: Uuid,
        id: Uuid,
    ) -> AppResult<Option<JobExecution>> {
        let row = ExecutionEntity::find_by_id(id)
            .join(JoinType::InnerJoin, Relation::Job.def())
            .filter(job::Column::OwnerId.eq(owner))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get execution: {}", e)))?;

        row.map(execution_from_model).transpose()
    }

    /// Insert an execution record for an existing job.
    pub async fn insert_execution(
        &self,
        job_id: Uuid,
        new: NewExecution,
    ) -> AppResult<JobExecution> {
        if !self.job_exists(job_id).await? {
            return Err(AppError::NotFound(format!("Job {}", job_id)));
        }

        let model = ActiveModel {
            id: Set(Uuid::now_v7()),
            job_id: Set(job_id),
            status: Set(new.status.as_str().to_string()),
            started_at: Set(new.started_at),
            finished_at: Set(new.finished_at),
            error_message: Set(new.error_message),
        };

        let result = model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert execution: {}", e)))?;

        execution_from_model(result)
    }
}
