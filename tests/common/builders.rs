//! Test harness builder over the in-memory store.

use std::sync::Arc;

use chrono::NaiveDate;
use cropmind_core::catalog::StageCatalog;
use cropmind_core::config::CropMindConfig;
use cropmind_core::gateways::{
    AdvisoryGateway, DisabledAdvisoryGateway, StaticWeatherProvider, WeatherProvider,
};
use cropmind_core::services::{CropMindServices, OnboardingRequest, ServiceContext};
use cropmind_core::store::InMemoryFarmStore;
use cropmind_core::utils::FixedClock;
use cropmind_core::web::{create_router, AppState};

use super::{clear_weather, date};

pub struct TestApp {
    pub services: CropMindServices,
    pub store: Arc<InMemoryFarmStore>,
    pub clock: Arc<FixedClock>,
}

impl TestApp {
    pub fn router(&self) -> axum::Router {
        create_router(AppState::new(self.services.clone()))
    }
}

pub struct TestAppBuilder {
    today: NaiveDate,
    config: CropMindConfig,
    weather: Arc<dyn WeatherProvider>,
    advisory: Arc<dyn AdvisoryGateway>,
}

impl TestAppBuilder {
    pub fn new() -> Self {
        let mut config = CropMindConfig::default();
        config.environment = "test".to_string();
        config.dashboard.section_timeout_ms = 500;
        config.advisory.timeout_ms = 500;
        Self {
            today: date(2025, 7, 1),
            config,
            weather: Arc::new(StaticWeatherProvider::new(clear_weather())),
            advisory: Arc::new(DisabledAdvisoryGateway),
        }
    }

    pub fn today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn weather(mut self, weather: Arc<dyn WeatherProvider>) -> Self {
        self.weather = weather;
        self
    }

    pub fn advisory(mut self, advisory: Arc<dyn AdvisoryGateway>) -> Self {
        self.advisory = advisory;
        self
    }

    pub fn configure(mut self, apply: impl FnOnce(&mut CropMindConfig)) -> Self {
        apply(&mut self.config);
        self
    }

    pub fn build(self) -> TestApp {
        let store = Arc::new(InMemoryFarmStore::new());
        let clock = Arc::new(FixedClock::at_date(self.today));
        let context = ServiceContext {
            store: store.clone(),
            catalog: Arc::new(StageCatalog::bundled().expect("bundled catalog")),
            weather: self.weather,
            advisory: self.advisory,
            clock: clock.clone(),
            config: Arc::new(self.config),
        };
        TestApp {
            services: CropMindServices::new(context),
            store,
            clock,
        }
    }
}

impl Default for TestAppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn onboarding_request(email: &str, crop: &str, sowing_date: NaiveDate) -> OnboardingRequest {
    OnboardingRequest {
        user_email: email.to_string(),
        crop: crop.to_string(),
        sowing_date,
        state: "Punjab".to_string(),
        district: "Ludhiana".to_string(),
        village: "Dehlon".to_string(),
        preferred_language: None,
        latitude: Some(30.9),
        longitude: Some(75.85),
    }
}
