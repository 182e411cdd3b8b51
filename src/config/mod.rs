//! # CropMind Configuration
//!
//! Configuration is read from `config/cropmind-config.yaml`. The file holds the
//! base settings plus `development`, `test` and `production` sections which are
//! deep-merged over the base for the active environment. Environment variables
//! prefixed `CROPMIND__` are applied last, with `__` separating path segments
//! (`CROPMIND__WEATHER__API_KEY`).
//!
//! ```rust,no_run
//! use cropmind_core::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let bind = &manager.config().server.bind_address;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CropMindConfig {
    /// Filled in by the loader from the detected environment
    pub environment: String,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub catalog: CatalogConfig,
    pub lifecycle: LifecycleConfig,
    pub weather: WeatherConfig,
    pub advisory: AdvisoryConfig,
    pub dashboard: DashboardConfig,
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub request_timeout_ms: u64,
    /// `*` allows any origin
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
            request_timeout_ms: 30_000,
            cors_allowed_origins: vec!["*".to_string()],
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn allows_any_origin(&self) -> bool {
        self.cors_allowed_origins.is_empty()
            || self.cors_allowed_origins.iter().any(|origin| origin == "*")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub backend: StorageBackend,
    pub url: Option<String>,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_ms: u64,
    pub run_migrations: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            url: None,
            max_connections: 10,
            min_connections: 1,
            acquire_timeout_ms: 5_000,
            run_migrations: true,
        }
    }
}

impl DatabaseConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Crop catalog YAML; the bundled catalog is used when unset
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Refuse to advance while the current stage has open tasks
    pub require_stage_tasks_before_advance: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub cache_ttl_seconds: u64,
    pub timeout_ms: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: "https://api.openweathermap.org/data/2.5/weather".to_string(),
            api_key: None,
            cache_ttl_seconds: 1_800,
            timeout_ms: 10_000,
        }
    }
}

impl WeatherConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisoryConfig {
    pub enabled: bool,
    /// OpenAI-compatible chat completions base URL
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: String,
    pub planner_temperature: f32,
    pub translation_temperature: f32,
    pub max_tokens: u32,
    pub timeout_ms: u64,
    /// Shown to the farmer when the advisory service cannot answer
    pub fallback_message: String,
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            planner_temperature: 0.3,
            translation_temperature: 0.2,
            max_tokens: 300,
            timeout_ms: 15_000,
            fallback_message: "Sorry, I'm having trouble answering right now. Please try again in a moment."
                .to_string(),
        }
    }
}

impl AdvisoryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Upper bound for each section of the dashboard summary
    pub section_timeout_ms: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            section_timeout_ms: 8_000,
        }
    }
}

impl DashboardConfig {
    pub fn section_timeout(&self) -> Duration {
        Duration::from_millis(self.section_timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub app_name: String,
    pub user_name: String,
    pub language: String,
    /// Advice entries returned with the lifecycle status
    pub history_limit: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            app_name: "CropMind".to_string(),
            user_name: "Farmer".to_string(),
            language: "English".to_string(),
            history_limit: 5,
        }
    }
}

impl CropMindConfig {
    /// Validate configuration for consistency and required fields
    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.bind_address.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "server.bind_address",
                "server configuration",
            ));
        }

        let timeouts = [
            ("server.request_timeout_ms", self.server.request_timeout_ms),
            ("database.acquire_timeout_ms", self.database.acquire_timeout_ms),
            ("weather.timeout_ms", self.weather.timeout_ms),
            ("advisory.timeout_ms", self.advisory.timeout_ms),
            ("dashboard.section_timeout_ms", self.dashboard.section_timeout_ms),
        ];
        for (field, value) in timeouts {
            if value == 0 {
                return Err(ConfigurationError::invalid_value(
                    field,
                    "0",
                    "timeout must be greater than 0",
                ));
            }
        }

        if self.database.backend == StorageBackend::Postgres {
            if self.database.url.as_deref().map_or(true, str::is_empty) {
                return Err(ConfigurationError::missing_required_field(
                    "database.url",
                    "postgres backend",
                ));
            }
            if self.database.max_connections == 0 {
                return Err(ConfigurationError::invalid_value(
                    "database.max_connections",
                    "0",
                    "pool size must be greater than 0",
                ));
            }
        }

        if self.weather.enabled && !has_value(&self.weather.api_key) {
            return Err(ConfigurationError::missing_required_field(
                "weather.api_key",
                "enabled weather provider",
            ));
        }

        if self.advisory.enabled && !has_value(&self.advisory.api_key) {
            return Err(ConfigurationError::missing_required_field(
                "advisory.api_key",
                "enabled advisory gateway",
            ));
        }

        if self.defaults.history_limit == 0 {
            return Err(ConfigurationError::invalid_value(
                "defaults.history_limit",
                "0",
                "history limit must be greater than 0",
            ));
        }

        Ok(())
    }

    pub fn is_test_environment(&self) -> bool {
        self.environment == "test"
    }

    pub fn is_production_environment(&self) -> bool {
        self.environment == "production"
    }
}

fn has_value(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}
