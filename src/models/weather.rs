use serde::{Deserialize, Serialize};

/// Current conditions at a farm, in metric units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    /// Celsius
    pub temperature: f64,
    pub feels_like: f64,
    pub condition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Percent
    pub humidity: u32,
    /// km/h
    pub wind_speed: f64,
    /// Percent
    pub rain_chance: u32,
    pub rain_amount: Option<String>,
    pub alert: Option<String>,
}

impl WeatherReport {
    /// One-line summary, e.g. `Clear - 31.2°C`
    pub fn summary(&self) -> String {
        format!("{} - {}°C", self.condition, self.temperature)
    }
}
