use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Derived status of a stage relative to the lifecycle's current stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    /// Stage order is below the current stage
    Completed,
    /// The stage the farmer is working through
    Current,
    /// Not reached yet
    Upcoming,
}

impl StageStatus {
    /// Status of the stage at `order` when the lifecycle is at `current_order`
    pub fn relative_to(order: u32, current_order: u32) -> Self {
        match order.cmp(&current_order) {
            Ordering::Less => Self::Completed,
            Ordering::Equal => Self::Current,
            Ordering::Greater => Self::Upcoming,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }

    pub fn is_current(&self) -> bool {
        matches!(self, Self::Current)
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::Current => write!(f, "current"),
            Self::Upcoming => write!(f, "upcoming"),
        }
    }
}

impl std::str::FromStr for StageStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "completed" => Ok(Self::Completed),
            "current" => Ok(Self::Current),
            "upcoming" => Ok(Self::Upcoming),
            _ => Err(format!("Invalid stage status: {s}")),
        }
    }
}

/// Persisted lifecycle state of an enrollment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentState {
    /// The farmer's one live lifecycle
    #[default]
    Active,
    /// Terminated by completing the final stage, disenrolling or re-onboarding
    Archived,
}

impl EnrollmentState {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl fmt::Display for EnrollmentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Archived => write!(f, "archived"),
        }
    }
}

impl std::str::FromStr for EnrollmentState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "archived" => Ok(Self::Archived),
            _ => Err(format!("Invalid enrollment state: {s}")),
        }
    }
}
