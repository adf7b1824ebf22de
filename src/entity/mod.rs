//! SeaORM entity definitions for PostgreSQL database.

pub mod job;
pub mod job_execution;
