//! # Checklist Task
//!
//! A discrete, checkable item belonging to exactly one stage of one lifecycle.
//! Tasks are created when the lifecycle is instantiated and afterwards only
//! ever have their completion flag flipped.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Task {
    /// Unique within the owning lifecycle and stable across requests
    pub id: i64,
    pub stage_id: String,
    pub task_name: String,
    pub is_completed: bool,
}

impl Task {
    pub fn new(id: i64, stage_id: impl Into<String>, task_name: impl Into<String>) -> Self {
        Self {
            id,
            stage_id: stage_id.into(),
            task_name: task_name.into(),
            is_completed: false,
        }
    }
}
