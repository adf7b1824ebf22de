//! Job ledger library.
//!
//! Records submitted jobs and their executions, guards owner edits to jobs
//! that have not started yet, and computes per-owner job analytics.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod services;
