//! # Web API Application State
//!
//! Shared state handed to every handler: the wired services and the loaded
//! configuration. [`AppState::from_config`] builds the whole object graph
//! (store, catalog, gateways, clock) from a [`CropMindConfig`].

use std::sync::Arc;
use tracing::{info, warn};

use crate::catalog::StageCatalog;
use crate::config::{CropMindConfig, StorageBackend};
use crate::error::{CropMindError, Result};
use crate::gateways::{
    AdvisoryGateway, CachedWeatherProvider, ChatCompletionsGateway, DisabledAdvisoryGateway,
    OpenWeatherMapProvider, StaticWeatherProvider, WeatherProvider,
};
use crate::services::{CropMindServices, ServiceContext};
use crate::store::{FarmStore, InMemoryFarmStore};
use crate::utils::{Clock, SystemClock};

#[derive(Clone)]
pub struct AppState {
    pub services: CropMindServices,
    pub config: Arc<CropMindConfig>,
}

impl AppState {
    pub fn new(services: CropMindServices) -> Self {
        let config = Arc::clone(&services.context.config);
        Self { services, config }
    }

    /// Build store, catalog and gateways as configured, on the system clock
    pub async fn from_config(config: CropMindConfig) -> Result<Self> {
        config.validate()?;

        let catalog = StageCatalog::load(config.catalog.path.as_deref())
            .map_err(|e| CropMindError::ConfigurationError(e.to_string()))?;
        let store = build_store(&config).await?;
        let weather = build_weather_provider(&config)?;
        let advisory = build_advisory_gateway(&config)?;
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        info!(
            environment = %config.environment,
            store = store.backend_name(),
            weather = weather.name(),
            crops = ?catalog.available_crops(),
            "🚀 Application state ready"
        );

        let context = ServiceContext {
            store,
            catalog: Arc::new(catalog),
            weather,
            advisory,
            clock,
            config: Arc::new(config),
        };
        Ok(Self::new(CropMindServices::new(context)))
    }
}

async fn build_store(config: &CropMindConfig) -> Result<Arc<dyn FarmStore>> {
    match config.database.backend {
        StorageBackend::Memory => {
            warn!("Using in-memory store; data is lost on restart");
            Ok(Arc::new(InMemoryFarmStore::new()))
        }
        #[cfg(feature = "postgres")]
        StorageBackend::Postgres => {
            let connection = crate::database::DatabaseConnection::connect(&config.database).await?;
            Ok(Arc::new(crate::store::PgFarmStore::from_connection(&connection)))
        }
        #[cfg(not(feature = "postgres"))]
        StorageBackend::Postgres => Err(CropMindError::ConfigurationError(
            "postgres backend requires the `postgres` feature".to_string(),
        )),
    }
}

fn build_weather_provider(config: &CropMindConfig) -> Result<Arc<dyn WeatherProvider>> {
    if !config.weather.enabled {
        return Ok(Arc::new(StaticWeatherProvider::default()));
    }
    let provider = OpenWeatherMapProvider::from_config(&config.weather)?;
    Ok(Arc::new(CachedWeatherProvider::new(
        Arc::new(provider),
        config.weather.cache_ttl(),
    )))
}

fn build_advisory_gateway(config: &CropMindConfig) -> Result<Arc<dyn AdvisoryGateway>> {
    if !config.advisory.enabled {
        return Ok(Arc::new(DisabledAdvisoryGateway));
    }
    Ok(Arc::new(ChatCompletionsGateway::from_config(&config.advisory)?))
}
