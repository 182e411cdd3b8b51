use thiserror::Error;

/// Failures raised by the stage catalog, task checklist and lifecycle engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("Unknown crop type: {crop_type}")]
    UnknownCropType { crop_type: String },

    #[error("Task {task_id} does not belong to this lifecycle")]
    TaskNotFound { task_id: i64 },

    #[error("Lifecycle is already at its final stage ({stage_id})")]
    AlreadyAtFinalStage { stage_id: String },

    #[error("Lifecycle is not at its final stage (currently {stage_id})")]
    NotAtFinalStage { stage_id: String },

    #[error("No lifecycle instance for farmer {farmer}")]
    InstanceNotFound { farmer: String },

    #[error("Stage order may not decrease (from {from} to {to})")]
    StageRegression { from: u32, to: u32 },

    #[error("Stage {stage_id} still has {remaining} open tasks")]
    StageTasksIncomplete { stage_id: String, remaining: usize },
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;

pub fn unknown_crop(crop_type: impl Into<String>) -> LifecycleError {
    LifecycleError::UnknownCropType {
        crop_type: crop_type.into(),
    }
}

pub fn instance_not_found(farmer: impl Into<String>) -> LifecycleError {
    LifecycleError::InstanceNotFound {
        farmer: farmer.into(),
    }
}
