//! # Services
//!
//! Application services sitting between the HTTP layer and the lifecycle
//! engine. Each service owns one slice of the farmer-facing contract and shares
//! the same [`ServiceContext`]: store, catalog, upstream gateways, clock and
//! configuration.

pub mod alert_service;
pub mod chat_service;
pub mod dashboard_aggregator;
pub mod lifecycle_service;
pub mod locks;
pub mod onboarding;
pub mod profile_service;
pub mod weather_service;

use std::sync::Arc;

use crate::catalog::StageCatalog;
use crate::config::CropMindConfig;
use crate::gateways::{AdvisoryGateway, WeatherProvider};
use crate::store::FarmStore;
use crate::utils::Clock;

pub use alert_service::AlertService;
pub use chat_service::{ChatAnswer, ChatQuery, ChatService};
pub use dashboard_aggregator::{DashboardAggregator, DashboardSummary, DashboardViewModel};
pub use lifecycle_service::LifecycleService;
pub use locks::{FarmerLockGuard, InstanceLocks};
pub use onboarding::{OnboardingRequest, OnboardingResult, OnboardingService};
pub use profile_service::{ProfileService, ProfileView, UserInfo};
pub use weather_service::FarmWeatherService;

/// Shared collaborators handed to every service
#[derive(Clone)]
pub struct ServiceContext {
    pub store: Arc<dyn FarmStore>,
    pub catalog: Arc<StageCatalog>,
    pub weather: Arc<dyn WeatherProvider>,
    pub advisory: Arc<dyn AdvisoryGateway>,
    pub clock: Arc<dyn Clock>,
    pub config: Arc<CropMindConfig>,
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("store", &self.store.backend_name())
            .field("weather", &self.weather.name())
            .field("environment", &self.config.environment)
            .finish()
    }
}

impl ServiceContext {
    /// Farmer's preferred language, or the configured default
    pub(crate) fn language_or_default(&self, preferred: Option<&str>) -> String {
        preferred
            .map(str::trim)
            .filter(|language| !language.is_empty())
            .unwrap_or(&self.config.defaults.language)
            .to_string()
    }
}

/// Every service, wired over one context and one lock table
#[derive(Clone)]
pub struct CropMindServices {
    pub context: ServiceContext,
    pub lifecycle: Arc<LifecycleService>,
    pub onboarding: Arc<OnboardingService>,
    pub profile: Arc<ProfileService>,
    pub alerts: Arc<AlertService>,
    pub chat: Arc<ChatService>,
    pub weather: Arc<FarmWeatherService>,
    pub dashboard: Arc<DashboardAggregator>,
    pub locks: Arc<InstanceLocks>,
}

impl CropMindServices {
    pub fn new(context: ServiceContext) -> Self {
        let locks = Arc::new(InstanceLocks::new());
        let alerts = Arc::new(AlertService::new(&context));
        let weather = Arc::new(FarmWeatherService::new(&context));
        let lifecycle = Arc::new(LifecycleService::new(
            &context,
            Arc::clone(&locks),
            Arc::clone(&alerts),
        ));
        let onboarding = Arc::new(OnboardingService::new(
            &context,
            Arc::clone(&locks),
            Arc::clone(&alerts),
        ));
        let profile = Arc::new(ProfileService::new(&context));
        let chat = Arc::new(ChatService::new(&context, Arc::clone(&weather)));
        let dashboard = Arc::new(DashboardAggregator::new(
            &context,
            Arc::clone(&lifecycle),
            Arc::clone(&weather),
            Arc::clone(&profile),
            Arc::clone(&alerts),
        ));

        Self {
            context,
            lifecycle,
            onboarding,
            profile,
            alerts,
            chat,
            weather,
            dashboard,
            locks,
        }
    }
}
