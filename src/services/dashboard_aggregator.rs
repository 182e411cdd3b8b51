//! # Dashboard Aggregator
//!
//! Builds the dashboard from four independent sections: lifecycle progress,
//! weather, the farmer's profile card and today's action. Sections are fetched
//! concurrently and each is bounded by the configured section timeout. A
//! failing section becomes an absent field plus an entry in
//! `unavailable_sections`; it never fails its siblings.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{instrument, warn};

use super::{AlertService, FarmWeatherService, LifecycleService, ProfileService, ServiceContext, UserInfo};
use crate::constants::DashboardSection;
use crate::error::{CropMindError, Result};
use crate::gateways::{self, advisory::default_knowledge, ActionRequest};
use crate::logging::log_aggregation_outcome;
use crate::models::{NewAdviceRecord, WeatherReport};
use crate::state_machine::LifecycleSnapshot;

/// Section that could not be produced, with the reason
#[derive(Debug, Clone, PartialEq)]
pub struct SectionFailure {
    pub section: DashboardSection,
    pub error: CropMindError,
}

/// Every section that resolved, plus the failures of those that did not
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardViewModel {
    pub lifecycle: Option<LifecycleSnapshot>,
    pub weather: Option<WeatherReport>,
    pub profile: Option<UserInfo>,
    pub today_action: Option<String>,
    pub failures: Vec<SectionFailure>,
}

impl DashboardViewModel {
    pub fn unavailable_sections(&self) -> Vec<DashboardSection> {
        self.failures.iter().map(|f| f.section).collect()
    }

    pub fn failure(&self, section: DashboardSection) -> Option<&CropMindError> {
        self.failures
            .iter()
            .find(|f| f.section == section)
            .map(|f| &f.error)
    }

    fn absorb<T>(&mut self, section: DashboardSection, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                warn!(section = %section, error = %error, "Dashboard section unavailable");
                self.failures.push(SectionFailure { section, error });
                None
            }
        }
    }

    /// Flatten into the summary response. A farmer without a lifecycle has
    /// nothing to summarise, so a missing lifecycle fails the whole summary.
    pub fn into_summary(self) -> Result<DashboardSummary> {
        if let Some(error) = self.failure(DashboardSection::Lifecycle) {
            if error.is_not_found() {
                return Err(error.clone());
            }
        }

        let unavailable_sections = self.unavailable_sections();
        let lifecycle = self.lifecycle.as_ref();
        Ok(DashboardSummary {
            current_stage: lifecycle.map(|l| l.current_stage_label.clone()),
            day_count: lifecycle.map(|l| l.day_count),
            progress_percentage: lifecycle
                .map(|l| crate::state_machine::progress::round_percentage(l.progress_percentage)),
            today_action: self.today_action,
            weather_summary: self.weather.as_ref().map(WeatherReport::summary),
            user_name: self.profile.as_ref().map(|p| p.name.clone()),
            unavailable_sections,
        })
    }
}

/// Response of `GET /dashboard/summary`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub current_stage: Option<String>,
    pub day_count: Option<u32>,
    pub today_action: Option<String>,
    pub weather_summary: Option<String>,
    pub progress_percentage: Option<f64>,
    pub user_name: Option<String>,
    pub unavailable_sections: Vec<DashboardSection>,
}

pub struct DashboardAggregator {
    context: ServiceContext,
    lifecycle: Arc<LifecycleService>,
    weather: Arc<FarmWeatherService>,
    profile: Arc<ProfileService>,
    alerts: Arc<AlertService>,
    section_timeout: Duration,
    advisory_timeout: Duration,
}

impl DashboardAggregator {
    pub fn new(
        context: &ServiceContext,
        lifecycle: Arc<LifecycleService>,
        weather: Arc<FarmWeatherService>,
        profile: Arc<ProfileService>,
        alerts: Arc<AlertService>,
    ) -> Self {
        Self {
            context: context.clone(),
            lifecycle,
            weather,
            profile,
            alerts,
            section_timeout: context.config.dashboard.section_timeout(),
            advisory_timeout: context.config.advisory.timeout(),
        }
    }

    #[instrument(skip(self))]
    pub async fn aggregate(&self, email: &str) -> DashboardViewModel {
        let started = Instant::now();

        let (lifecycle, weather, profile, today_action) = tokio::join!(
            self.section(DashboardSection::Lifecycle, self.lifecycle.snapshot(email)),
            self.section(DashboardSection::Weather, self.weather_section(email)),
            self.section(DashboardSection::Profile, self.profile.user_info(email)),
            self.section(DashboardSection::TodayAction, self.today_action(email)),
        );

        let mut view = DashboardViewModel::default();
        view.lifecycle = view.absorb(DashboardSection::Lifecycle, lifecycle);
        view.weather = view.absorb(DashboardSection::Weather, weather);
        view.profile = view.absorb(DashboardSection::Profile, profile);
        view.today_action = view.absorb(DashboardSection::TodayAction, today_action);

        let unavailable: Vec<&str> = view.failures.iter().map(|f| f.section.as_str()).collect();
        let available: Vec<&str> = DashboardSection::ALL
            .iter()
            .map(DashboardSection::as_str)
            .filter(|s| !unavailable.contains(s))
            .collect();
        log_aggregation_outcome(
            email,
            &available,
            &unavailable,
            u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        );

        view
    }

    async fn section<T>(
        &self,
        section: DashboardSection,
        fetch: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        match tokio::time::timeout(self.section_timeout, fetch).await {
            Ok(result) => result,
            Err(_) => Err(CropMindError::UpstreamUnavailable(format!(
                "{section} section timed out after {}ms",
                self.section_timeout.as_millis()
            ))),
        }
    }

    /// Weather for the farm, raising a weather alert when the report carries one
    async fn weather_section(&self, email: &str) -> Result<WeatherReport> {
        let report = self.weather.for_farmer(email).await?;
        if let Some(message) = report.alert.as_deref() {
            if let Err(e) = self.alerts.record_weather_once(email, message).await {
                warn!(farmer = %email, error = %e, "Failed to record weather alert");
            }
        }
        Ok(report)
    }

    /// Ask the advisory service for today's single most important action and
    /// keep it in the farmer's advice history
    async fn today_action(&self, email: &str) -> Result<String> {
        let instance = self.lifecycle.active_instance(email).await?;
        let entry = self.context.catalog.entry(&instance.crop_type)?;
        let stage = entry
            .stage_at(instance.current_stage_order)
            .map(|s| s.label.clone())
            .unwrap_or_else(|| instance.current_stage_id.clone());

        let farmer = self.context.store.get_farmer(email).await?;
        let language = self
            .context
            .language_or_default(farmer.as_ref().and_then(|f| f.preferred_language.as_deref()));
        let weather_summary = match farmer.as_ref().and_then(|f| f.farm.as_ref()) {
            Some(farm) => self.weather.for_farm(farm).await.ok().map(|r| r.summary()),
            None => None,
        };

        let request = ActionRequest::daily(
            &stage,
            weather_summary.as_deref().unwrap_or("Unknown"),
            default_knowledge(&entry.display_name, &stage),
        );
        let action = gateways::bounded(
            "advisory",
            self.advisory_timeout,
            self.context.advisory.advise(&request, &language),
        )
        .await?;

        self.context
            .store
            .record_advice(
                NewAdviceRecord {
                    farmer_email: email.to_string(),
                    recommendation: action.clone(),
                    stage_at_time: Some(stage),
                    weather_summary,
                },
                self.context.clock.now(),
            )
            .await?;
        Ok(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(section: DashboardSection, error: CropMindError) -> SectionFailure {
        SectionFailure { section, error }
    }

    #[test]
    fn test_summary_without_lifecycle_is_not_found() {
        let view = DashboardViewModel {
            failures: vec![failure(
                DashboardSection::Lifecycle,
                CropMindError::NotFound("no lifecycle".to_string()),
            )],
            ..Default::default()
        };
        assert!(view.into_summary().unwrap_err().is_not_found());
    }

    #[test]
    fn test_summary_nulls_failed_sections() {
        let view = DashboardViewModel {
            today_action: Some("Irrigate".to_string()),
            failures: vec![
                failure(
                    DashboardSection::Weather,
                    CropMindError::UpstreamUnavailable("weather down".to_string()),
                ),
                failure(
                    DashboardSection::Lifecycle,
                    CropMindError::UpstreamUnavailable("timed out".to_string()),
                ),
            ],
            ..Default::default()
        };
        let summary = view.into_summary().unwrap();
        assert_eq!(summary.today_action.as_deref(), Some("Irrigate"));
        assert_eq!(summary.weather_summary, None);
        assert_eq!(summary.current_stage, None);
        assert_eq!(
            summary.unavailable_sections,
            vec![DashboardSection::Weather, DashboardSection::Lifecycle]
        );
    }
}
