//! # System Constants
//!
//! Names and thresholds shared across the lifecycle engine, the gateways and
//! the HTTP layer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle operation names used in structured logs
pub mod operations {
    pub const ONBOARD: &str = "onboard";
    pub const TOGGLE_TASK: &str = "toggle_task";
    pub const ADVANCE_STAGE: &str = "advance_stage";
    pub const COMPLETE: &str = "complete";
    pub const DISENROLL: &str = "disenroll";
    pub const ARCHIVE_PREVIOUS: &str = "archive_previous";
}

/// Onboarding input limits
pub mod onboarding {
    /// Furthest a sowing date may lie ahead of today
    pub const MAX_SOWING_LEAD_DAYS: i64 = 365;
}

/// Weather alert rules applied to a parsed report
pub mod weather {
    pub const HEAVY_RAIN_CHANCE: u32 = 70;
    pub const LIKELY_RAIN_CHANCE: u32 = 50;
    /// Rain chance reported while it is actually raining
    pub const RAINING_MIN_CHANCE: u32 = 70;
    pub const EXTREME_HEAT_CELSIUS: f64 = 40.0;
    pub const FROST_CELSIUS: f64 = 5.0;
    /// m/s to km/h
    pub const WIND_SPEED_FACTOR: f64 = 3.6;

    pub const HEAVY_RAIN_ALERT: &str = "Heavy rain expected";
    pub const LIKELY_RAIN_ALERT: &str = "Rain likely today";
    pub const EXTREME_HEAT_ALERT: &str = "Extreme heat warning";
    pub const FROST_ALERT: &str = "Frost warning";
    pub const ALERT_SEPARATOR: &str = " | ";
}

/// Independent sections of the dashboard summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardSection {
    Lifecycle,
    Weather,
    Profile,
    TodayAction,
}

impl DashboardSection {
    pub const ALL: [DashboardSection; 4] = [
        Self::Lifecycle,
        Self::Weather,
        Self::Profile,
        Self::TodayAction,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lifecycle => "lifecycle",
            Self::Weather => "weather",
            Self::Profile => "profile",
            Self::TodayAction => "today_action",
        }
    }
}

impl fmt::Display for DashboardSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
