//! Migration: Create jobs table.
//!
//! One row per submitted job. Status changes are written by the scheduler;
//! owners may only edit or delete rows while they are pending.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TABLE jobs (
                    id UUID PRIMARY KEY, -- UUIDv7 for time-ordered sorting
                    owner_id UUID NOT NULL,
                    name VARCHAR(255) NOT NULL,

                    status VARCHAR(20) NOT NULL DEFAULT 'pending'
                        CHECK (status IN ('pending', 'running', 'completed', 'failed')),
                    priority VARCHAR(10) NOT NULL DEFAULT 'medium'
                        CHECK (priority IN ('high', 'medium', 'low')),

                    deadline TIMESTAMPTZ,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    started_at TIMESTAMPTZ,
                    completed_at TIMESTAMPTZ,
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                -- Owner listing, newest first
                CREATE INDEX idx_jobs_owner_created ON jobs(owner_id, created_at DESC);

                -- Owner listing filtered by status
                CREATE INDEX idx_jobs_owner_status ON jobs(owner_id, status);
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS jobs CASCADE;")
            .await?;

        Ok(())
    }
}
