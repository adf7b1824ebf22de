//! Business logic services.

pub mod analytics;
pub mod guard;

pub use guard::{JobAction, can_delete, can_modify, ensure_allowed};
