use serde::{Deserialize, Serialize};

/// Mutations a lifecycle instance accepts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum LifecycleEvent {
    /// Flip the completion flag of one task
    ToggleTask(i64),
    /// Move to the next stage in catalog order
    AdvanceStage,
    /// Archive the lifecycle from its final stage
    Complete,
    /// Farmer leaves the programme
    Disenroll,
}

impl LifecycleEvent {
    /// Get a string representation of the event type for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ToggleTask(_) => "toggle_task",
            Self::AdvanceStage => "advance_stage",
            Self::Complete => "complete",
            Self::Disenroll => "disenroll",
        }
    }

    /// Check if this event ends the enrollment
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Disenroll)
    }

    /// Task targeted by the event, if any
    pub fn task_id(&self) -> Option<i64> {
        match self {
            Self::ToggleTask(id) => Some(*id),
            _ => None,
        }
    }
}
