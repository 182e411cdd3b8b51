//! Weather providers.
//!
//! `OpenWeatherMapProvider` talks to the OpenWeatherMap current-weather API,
//! `StaticWeatherProvider` answers with a fixed report when no API is enabled,
//! and `CachedWeatherProvider` keeps recent reports per location.

use async_trait::async_trait;
use dashmap::DashMap;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use super::UpstreamError;
use crate::config::WeatherConfig;
use crate::constants::weather as rules;
use crate::models::{FarmDetails, WeatherReport};

const SERVICE: &str = "weather";

/// Where to look the weather up
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherLocation {
    Coordinates { latitude: f64, longitude: f64 },
    Query(String),
}

impl WeatherLocation {
    /// Coordinates when both are known, otherwise `village,district,state`
    pub fn for_farm(farm: &FarmDetails) -> Self {
        match farm.coordinates() {
            Some((latitude, longitude)) => Self::Coordinates {
                latitude,
                longitude,
            },
            None => Self::Query(farm.location_query()),
        }
    }

    fn cache_key(&self) -> String {
        match self {
            Self::Coordinates {
                latitude,
                longitude,
            } => format!("{latitude:.4}_{longitude:.4}"),
            Self::Query(query) => query.to_lowercase(),
        }
    }
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current(&self, location: &WeatherLocation) -> Result<WeatherReport, UpstreamError>;

    fn name(&self) -> &'static str;
}

pub struct OpenWeatherMapProvider {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl OpenWeatherMapProvider {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UpstreamError::unavailable(SERVICE, e))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }

    pub fn from_config(config: &WeatherConfig) -> Result<Self, UpstreamError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| UpstreamError::not_configured(SERVICE))?;
        Self::new(config.endpoint.clone(), api_key, config.timeout())
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherMapProvider {
    async fn current(&self, location: &WeatherLocation) -> Result<WeatherReport, UpstreamError> {
        let mut params: Vec<(&str, String)> = vec![
            ("appid", self.api_key.clone()),
            ("units", "metric".to_string()),
        ];
        match location {
            WeatherLocation::Coordinates {
                latitude,
                longitude,
            } => {
                params.push(("lat", latitude.to_string()));
                params.push(("lon", longitude.to_string()));
            }
            WeatherLocation::Query(query) => params.push(("q", query.clone())),
        }

        let response = self
            .client
            .get(&self.endpoint)
            .query(&params)
            .send()
            .await
            .map_err(|e| UpstreamError::unavailable(SERVICE, e))?;

        if !response.status().is_success() {
            return Err(UpstreamError::unavailable(
                SERVICE,
                format!("HTTP {}", response.status()),
            ));
        }

        let body: OwmResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::invalid_response(SERVICE, e))?;

        Ok(parse_openweathermap(body))
    }

    fn name(&self) -> &'static str {
        "openweathermap"
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct OwmResponse {
    #[serde(default)]
    main: OwmMain,
    #[serde(default)]
    weather: Vec<OwmCondition>,
    #[serde(default)]
    wind: OwmWind,
    #[serde(default)]
    rain: OwmRain,
    #[serde(default)]
    clouds: OwmClouds,
}

#[derive(Debug, Default, Deserialize)]
struct OwmMain {
    #[serde(default)]
    temp: f64,
    #[serde(default)]
    feels_like: f64,
    #[serde(default)]
    humidity: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwmCondition {
    main: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OwmWind {
    #[serde(default)]
    speed: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwmRain {
    #[serde(rename = "1h", default)]
    one_hour: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwmClouds {
    #[serde(default)]
    all: f64,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Normalise an OpenWeatherMap payload.
///
/// The API has no rain probability, so cloudiness stands in for it, raised to
/// at least 70% while it is actually raining.
pub fn parse_openweathermap(body: OwmResponse) -> WeatherReport {
    let condition = body.weather.into_iter().next().unwrap_or_default();
    let rain_1h = body.rain.one_hour;

    let mut rain_chance = body.clouds.all.clamp(0.0, 100.0).round() as u32;
    if rain_1h > 0.0 {
        rain_chance = rain_chance.max(rules::RAINING_MIN_CHANCE);
    }

    WeatherReport {
        temperature: round1(body.main.temp),
        feels_like: round1(body.main.feels_like),
        condition: condition.main.unwrap_or_else(|| "Unknown".to_string()),
        description: condition.description,
        humidity: body.main.humidity.clamp(0.0, 100.0).round() as u32,
        wind_speed: round1(body.wind.speed * rules::WIND_SPEED_FACTOR),
        rain_chance,
        rain_amount: (rain_1h > 0.0).then(|| format!("{rain_1h:.1}mm")),
        alert: weather_alert(rain_chance, body.main.temp),
    }
}

/// Alert text for a report, `None` when conditions are unremarkable
pub fn weather_alert(rain_chance: u32, temperature: f64) -> Option<String> {
    let mut alerts = Vec::new();

    if rain_chance > rules::HEAVY_RAIN_CHANCE {
        alerts.push(rules::HEAVY_RAIN_ALERT);
    } else if rain_chance > rules::LIKELY_RAIN_CHANCE {
        alerts.push(rules::LIKELY_RAIN_ALERT);
    }

    if temperature > rules::EXTREME_HEAT_CELSIUS {
        alerts.push(rules::EXTREME_HEAT_ALERT);
    } else if temperature < rules::FROST_CELSIUS {
        alerts.push(rules::FROST_ALERT);
    }

    (!alerts.is_empty()).then(|| alerts.join(rules::ALERT_SEPARATOR))
}

/// Fixed report served while the weather API is disabled
pub struct StaticWeatherProvider {
    report: WeatherReport,
}

impl StaticWeatherProvider {
    pub fn new(report: WeatherReport) -> Self {
        Self { report }
    }
}

impl Default for StaticWeatherProvider {
    fn default() -> Self {
        Self::new(WeatherReport {
            temperature: 28.0,
            feels_like: 30.0,
            condition: "Clear".to_string(),
            description: Some("Static weather data (weather API not configured)".to_string()),
            humidity: 60,
            wind_speed: 10.0,
            rain_chance: 20,
            rain_amount: None,
            alert: None,
        })
    }
}

#[async_trait]
impl WeatherProvider for StaticWeatherProvider {
    async fn current(&self, _location: &WeatherLocation) -> Result<WeatherReport, UpstreamError> {
        Ok(self.report.clone())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

/// Keeps each location's report for a fixed time to live
pub struct CachedWeatherProvider {
    inner: Arc<dyn WeatherProvider>,
    ttl: Duration,
    cache: DashMap<String, (WeatherReport, Instant)>,
}

impl CachedWeatherProvider {
    pub fn new(inner: Arc<dyn WeatherProvider>, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            cache: DashMap::new(),
        }
    }

    /// Number of locations currently held
    pub fn cached_locations(&self) -> usize {
        self.cache.len()
    }
}

#[async_trait]
impl WeatherProvider for CachedWeatherProvider {
    async fn current(&self, location: &WeatherLocation) -> Result<WeatherReport, UpstreamError> {
        let key = location.cache_key();
        if let Some(entry) = self.cache.get(&key) {
            let (report, fetched_at) = entry.value();
            if fetched_at.elapsed() < self.ttl {
                debug!(location = %key, "Weather cache hit");
                return Ok(report.clone());
            }
        }

        // Expired reports are dropped on every miss so the map only holds live locations
        self.cache
            .retain(|_, (_, fetched_at)| fetched_at.elapsed() < self.ttl);

        let report = self.inner.current(location).await?;
        self.cache.insert(key, (report.clone(), Instant::now()));
        Ok(report)
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}
