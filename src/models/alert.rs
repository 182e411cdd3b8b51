//! # Alerts
//!
//! Alert kind and severity arrive as loosely-cased strings ("weather",
//! "WEATHER", "Weather"). They are resolved once into closed enums when the
//! alert is ingested so nothing downstream matches on raw strings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertKind {
    Weather,
    Pest,
    Stage,
    General,
}

impl AlertKind {
    /// Case-insensitive parse; unrecognised kinds become `General`
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "weather" => Self::Weather,
            "pest" | "disease" => Self::Pest,
            "stage" | "lifecycle" => Self::Stage,
            _ => Self::General,
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Weather => write!(f, "Weather"),
            Self::Pest => write!(f, "Pest"),
            Self::Stage => write!(f, "Stage"),
            Self::General => write!(f, "General"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

impl AlertSeverity {
    /// Case-insensitive parse; unrecognised severities become `Info`
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "critical" | "high" => Self::Critical,
            "warning" | "medium" => Self::Warning,
            _ => Self::Info,
        }
    }
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "Info"),
            Self::Warning => write!(f, "Warning"),
            Self::Critical => write!(f, "Critical"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub message: String,
    pub severity: AlertSeverity,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAlert {
    pub farmer_email: String,
    pub kind: AlertKind,
    pub message: String,
    pub severity: AlertSeverity,
}

impl NewAlert {
    /// Build an alert from raw, untrusted tags
    pub fn from_tags(
        farmer_email: impl Into<String>,
        kind: &str,
        severity: &str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            farmer_email: farmer_email.into(),
            kind: AlertKind::from_tag(kind),
            message: message.into(),
            severity: AlertSeverity::from_tag(severity),
        }
    }
}
