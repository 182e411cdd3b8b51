//! Stub upstream collaborators.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use cropmind_core::gateways::{
    ActionRequest, AdvisoryGateway, UpstreamError, WeatherLocation, WeatherProvider,
};
use cropmind_core::models::WeatherReport;

pub fn clear_weather() -> WeatherReport {
    WeatherReport {
        temperature: 31.0,
        feels_like: 33.5,
        condition: "Clear".to_string(),
        description: Some("clear sky".to_string()),
        humidity: 40,
        wind_speed: 12.6,
        rain_chance: 10,
        rain_amount: None,
        alert: None,
    }
}

pub fn stormy_weather() -> WeatherReport {
    WeatherReport {
        condition: "Thunderstorm".to_string(),
        rain_chance: 85,
        rain_amount: Some("12.4mm".to_string()),
        alert: Some("Heavy rain expected".to_string()),
        ..clear_weather()
    }
}

/// Weather provider that fails every call
pub struct FailingWeather;

#[async_trait]
impl WeatherProvider for FailingWeather {
    async fn current(&self, _location: &WeatherLocation) -> Result<WeatherReport, UpstreamError> {
        Err(UpstreamError::unavailable("weather", "connection refused"))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// Weather provider that answers after a delay
pub struct SlowWeather {
    pub delay: Duration,
    pub report: WeatherReport,
}

#[async_trait]
impl WeatherProvider for SlowWeather {
    async fn current(&self, _location: &WeatherLocation) -> Result<WeatherReport, UpstreamError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.report.clone())
    }

    fn name(&self) -> &'static str {
        "slow"
    }
}

/// Advisory gateway with a canned planner answer that counts its calls
pub struct ScriptedAdvisory {
    pub answer: String,
    pub calls: AtomicUsize,
}

impl ScriptedAdvisory {
    pub fn new(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AdvisoryGateway for ScriptedAdvisory {
    async fn plan_action(&self, _request: &ActionRequest) -> Result<String, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.answer.clone())
    }

    async fn translate(&self, content: &str, target_language: &str) -> Result<String, UpstreamError> {
        Ok(format!("[{target_language}] {content}"))
    }
}
