use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A recommendation produced for the farmer, kept for the lifecycle history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdviceRecord {
    pub id: i64,
    pub farmer_email: String,
    pub recommendation: String,
    pub stage_at_time: Option<String>,
    pub weather_summary: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAdviceRecord {
    pub farmer_email: String,
    pub recommendation: String,
    pub stage_at_time: Option<String>,
    pub weather_summary: Option<String>,
}
