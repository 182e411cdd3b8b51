//! Configuration Loader
//!
//! Environment-aware configuration loading: YAML file discovery, environment
//! section merging and the `CROPMIND__` environment-variable overlay.

use super::error::{ConfigResult, ConfigurationError};
use super::CropMindConfig;
use serde_yaml::Value as YamlValue;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

const CONFIG_FILE_NAMES: [&str; 2] = ["cropmind-config.yaml", "cropmind-config.yml"];
const ENVIRONMENT_SECTIONS: [&str; 3] = ["development", "test", "production"];
const ENV_PREFIX: &str = "CROPMIND";
const ENV_SEPARATOR: &str = "__";

pub struct ConfigManager {
    config: CropMindConfig,
    environment: String,
    config_directory: PathBuf,
}

impl ConfigManager {
    /// Load configuration with environment auto-detection
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        Self::load_from_directory(None)
    }

    /// Load configuration from a specific directory
    pub fn load_from_directory(config_dir: Option<PathBuf>) -> ConfigResult<Arc<ConfigManager>> {
        let environment = Self::detect_environment();
        Self::load_from_directory_with_env(config_dir, &environment)
    }

    /// Load configuration from a specific directory with explicit environment.
    /// Tests use this to avoid touching process-wide variables.
    pub fn load_from_directory_with_env(
        config_dir: Option<PathBuf>,
        environment: &str,
    ) -> ConfigResult<Arc<ConfigManager>> {
        let config_directory = config_dir.unwrap_or_else(Self::default_config_directory);

        debug!(
            environment = environment,
            directory = %config_directory.display(),
            "Loading configuration"
        );

        let merged = Self::load_and_merge_config(&config_directory, environment)?;
        let mut config = Self::apply_environment_overlay(merged)?;
        config.environment = environment.to_string();

        // Relative catalog paths are resolved against the config directory
        if let Some(path) = config.catalog.path.as_mut() {
            if path.is_relative() {
                *path = config_directory.join(&*path);
            }
        }

        config.validate()?;

        debug!(
            config = %Self::sanitize_config_for_logging(&config),
            "Configuration loaded"
        );
        info!(
            environment = environment,
            bind_address = %config.server.bind_address,
            backend = ?config.database.backend,
            weather_enabled = config.weather.enabled,
            advisory_enabled = config.advisory.enabled,
            "✅ Configuration loaded successfully"
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
            config_directory,
        }))
    }

    /// Wrap an already built configuration, validating it first
    pub fn from_config(config: CropMindConfig) -> ConfigResult<Arc<ConfigManager>> {
        config.validate()?;
        let environment = if config.environment.is_empty() {
            Self::detect_environment()
        } else {
            config.environment.clone()
        };
        Ok(Arc::new(ConfigManager {
            config,
            environment,
            config_directory: PathBuf::from("config"),
        }))
    }

    pub fn config(&self) -> &CropMindConfig {
        &self.config
    }

    /// Configuration as JSON with secrets masked
    pub fn debug_config(&self) -> serde_json::Value {
        Self::sanitize_config_for_logging(&self.config)
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn config_directory(&self) -> &Path {
        &self.config_directory
    }

    /// Resolve a path relative to the configuration directory
    pub fn resolve_config_path<P: AsRef<Path>>(&self, relative_path: P) -> PathBuf {
        self.config_directory.join(relative_path)
    }

    /// Detect current environment: CROPMIND_ENV || APP_ENV || 'development'
    pub fn detect_environment() -> String {
        env::var("CROPMIND_ENV")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string())
            .to_lowercase()
    }

    fn default_config_directory() -> PathBuf {
        if let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") {
            let dir = PathBuf::from(manifest_dir).join("config");
            if dir.exists() {
                return dir;
            }
        }
        PathBuf::from("config")
    }

    fn find_config_file(config_directory: &Path) -> ConfigResult<PathBuf> {
        let mut searched_paths = Vec::new();

        for name in CONFIG_FILE_NAMES {
            let config_path = config_directory.join(name);
            searched_paths.push(config_path.clone());

            if config_path.exists() {
                debug!(path = %config_path.display(), "Found configuration file");
                return Ok(config_path);
            }
        }

        Err(ConfigurationError::config_file_not_found(searched_paths))
    }

    fn read_config_file_safely(path: &Path) -> ConfigResult<String> {
        const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

        let metadata = std::fs::metadata(path)
            .map_err(|e| ConfigurationError::file_read_error(path.display().to_string(), e))?;

        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigurationError::invalid_value(
                "file_size",
                metadata.len().to_string(),
                "configuration file larger than 1MB",
            ));
        }

        if !metadata.is_file() {
            return Err(ConfigurationError::invalid_value(
                "file_type",
                "directory or special file",
                "configuration path must point to a regular file",
            ));
        }

        std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::file_read_error(path.display().to_string(), e))
    }

    /// Read the file and merge the active environment section over the base
    fn load_and_merge_config(config_directory: &Path, environment: &str) -> ConfigResult<YamlValue> {
        let config_file = Self::find_config_file(config_directory)?;
        let yaml_content = Self::read_config_file_safely(&config_file)?;

        let mut yaml_data: YamlValue = serde_yaml::from_str(&yaml_content)
            .map_err(|e| ConfigurationError::invalid_yaml(config_file.display().to_string(), e))?;

        if let Some(env_overrides) = yaml_data
            .get(YamlValue::String(environment.to_string()))
            .cloned()
        {
            debug!(environment = environment, "Applying environment-specific overrides");
            merge_yaml_values(&mut yaml_data, env_overrides);
        }

        if let YamlValue::Mapping(ref mut map) = yaml_data {
            for section in ENVIRONMENT_SECTIONS {
                map.remove(YamlValue::String(section.to_string()));
            }
        }

        Ok(yaml_data)
    }

    /// Layer `CROPMIND__SECTION__KEY` variables over the merged YAML
    fn apply_environment_overlay(merged: YamlValue) -> ConfigResult<CropMindConfig> {
        let yaml = serde_yaml::to_string(&merged)
            .map_err(|e| ConfigurationError::invalid_yaml("merged configuration", e))?;

        config::Config::builder()
            .add_source(config::File::from_str(&yaml, config::FileFormat::Yaml))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()
            .and_then(|built| built.try_deserialize::<CropMindConfig>())
            .map_err(|e| ConfigurationError::EnvironmentOverride(e.to_string()))
    }

    fn sanitize_config_for_logging(config: &CropMindConfig) -> serde_json::Value {
        let mut config_json = serde_json::json!(config);
        let sensitive_patterns = ["password", "secret", "key", "token", "url"];
        sanitize_json_recursive(&mut config_json, &sensitive_patterns);
        config_json
    }
}

/// Recursively merge YAML values (environment overrides into base config)
fn merge_yaml_values(base: &mut YamlValue, override_value: YamlValue) {
    match (&mut *base, override_value) {
        (YamlValue::Mapping(base_map), YamlValue::Mapping(override_map)) => {
            for (key, value) in override_map {
                if let Some(existing_value) = base_map.get_mut(&key) {
                    merge_yaml_values(existing_value, value);
                } else {
                    base_map.insert(key, value);
                }
            }
        }
        (base_ref, override_val) => {
            *base_ref = override_val;
        }
    }
}

fn sanitize_json_recursive(value: &mut serde_json::Value, sensitive_patterns: &[&str]) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, val) in map.iter_mut() {
                let key_lower = key.to_lowercase();
                let is_sensitive = sensitive_patterns
                    .iter()
                    .any(|pattern| key_lower.contains(pattern));

                if is_sensitive {
                    if !val.is_null() {
                        *val = serde_json::Value::String("[MASKED]".to_string());
                    }
                } else {
                    sanitize_json_recursive(val, sensitive_patterns);
                }
            }
        }
        serde_json::Value::Array(items) => {
            for item in items.iter_mut() {
                sanitize_json_recursive(item, sensitive_patterns);
            }
        }
        _ => {}
    }
}
