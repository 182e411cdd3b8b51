//! # Onboarding
//!
//! Captures the farm profile and starts the farmer's lifecycle. Re-onboarding
//! archives the previous active lifecycle before the new one is created, so a
//! farmer never has two active instances.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{AlertService, InstanceLocks, ServiceContext};
use crate::constants::{onboarding as onboarding_limits, operations};
use crate::error::{CropMindError, Result};
use crate::logging::log_lifecycle_operation;
use crate::models::{AlertKind, AlertSeverity, FarmDetails, FarmerProfile, NewAlert, NewLifecycleInstance};
use crate::state_machine::{checklist::instantiate_tasks, LifecycleEvent, LifecycleStateMachine};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnboardingRequest {
    pub user_email: String,
    pub crop: String,
    pub sowing_date: NaiveDate,
    pub state: String,
    pub district: String,
    pub village: String,
    #[serde(default)]
    pub preferred_language: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnboardingResult {
    pub message: String,
    pub lifecycle_id: i64,
    pub crop: String,
    pub current_stage: String,
}

pub struct OnboardingService {
    context: ServiceContext,
    locks: Arc<InstanceLocks>,
    alerts: Arc<AlertService>,
}

impl OnboardingService {
    pub fn new(context: &ServiceContext, locks: Arc<InstanceLocks>, alerts: Arc<AlertService>) -> Self {
        Self {
            context: context.clone(),
            locks,
            alerts,
        }
    }

    #[instrument(skip(self, request), fields(farmer = %request.user_email, crop = %request.crop))]
    pub async fn setup(&self, request: OnboardingRequest) -> Result<OnboardingResult> {
        let request = self.validate(request)?;
        let email = request.user_email.clone();
        let catalog = &self.context.catalog;
        let entry = catalog
            .entry(&request.crop)
            .map_err(|e| CropMindError::ValidationError(e.to_string()))?;
        let first_stage = entry.first_stage().cloned().ok_or_else(|| {
            CropMindError::ValidationError(format!("crop '{}' has no stages", request.crop))
        })?;

        let _lock = self.locks.acquire(&email).await;
        let now = self.context.clock.now();

        let mut farmer = self
            .context
            .store
            .get_farmer(&email)
            .await?
            .unwrap_or_else(|| {
                let mut farmer = FarmerProfile::new(&email, now);
                farmer.name = Some(self.context.config.defaults.user_name.clone());
                farmer
            });
        farmer.preferred_language = Some(
            self.context
                .language_or_default(request.preferred_language.as_deref()),
        );
        farmer.farm = Some(FarmDetails {
            crop_type: entry.crop_type.clone(),
            sowing_date: request.sowing_date,
            state: request.state.trim().to_string(),
            district: request.district.trim().to_string(),
            village: request.village.trim().to_string(),
            latitude: request.latitude,
            longitude: request.longitude,
        });
        self.context.store.upsert_farmer(&farmer).await?;

        if let Some(mut previous) = self.context.store.active_lifecycle(&email).await? {
            let previous_entry = catalog.entry(&previous.crop_type)?;
            LifecycleStateMachine::new(&mut previous, previous_entry)
                .transition(LifecycleEvent::Disenroll, now)?;
            self.context.store.save_lifecycle(&previous).await?;
            log_lifecycle_operation(
                operations::ARCHIVE_PREVIOUS,
                &email,
                Some(previous.instance_id),
                Some(&previous.current_stage_id),
                "archived",
                None,
            );
        }

        let instance = self
            .context
            .store
            .create_lifecycle(
                NewLifecycleInstance {
                    farmer_email: email.clone(),
                    crop_type: entry.crop_type.clone(),
                    sowing_date: request.sowing_date,
                    current_stage_id: first_stage.id.clone(),
                    current_stage_order: first_stage.order,
                    tasks: instantiate_tasks(&entry.stages),
                },
                now,
            )
            .await?;

        log_lifecycle_operation(
            operations::ONBOARD,
            &email,
            Some(instance.instance_id),
            Some(&instance.current_stage_id),
            "created",
            Some(&format!("{} tasks", instance.tasks.len())),
        );

        self.alerts
            .record(NewAlert {
                farmer_email: email.clone(),
                kind: AlertKind::General,
                message: format!(
                    "Initial setup completed. Welcome to {}!",
                    self.context.config.defaults.app_name
                ),
                severity: AlertSeverity::Info,
            })
            .await?;

        info!(
            farmer = %email,
            lifecycle_id = instance.instance_id,
            "Onboarding completed"
        );

        Ok(OnboardingResult {
            message: "Onboarding successful".to_string(),
            lifecycle_id: instance.instance_id,
            crop: entry.display_name.clone(),
            current_stage: first_stage.label,
        })
    }

    fn validate(&self, mut request: OnboardingRequest) -> Result<OnboardingRequest> {
        request.user_email = request.user_email.trim().to_string();
        if !is_plausible_email(&request.user_email) {
            return Err(CropMindError::ValidationError(format!(
                "invalid email '{}'",
                request.user_email
            )));
        }

        request.crop = request.crop.trim().to_lowercase();
        if request.crop.is_empty() {
            return Err(CropMindError::ValidationError(
                "crop selection is required".to_string(),
            ));
        }
        if !self.context.catalog.contains(&request.crop) {
            return Err(CropMindError::ValidationError(format!(
                "unsupported crop '{}', available: {}",
                request.crop,
                self.context.catalog.available_crops().join(", ")
            )));
        }

        for (field, value) in [
            ("state", &request.state),
            ("district", &request.district),
            ("village", &request.village),
        ] {
            if value.trim().is_empty() {
                return Err(CropMindError::ValidationError(format!("{field} is required")));
            }
        }

        let today = self.context.clock.today();
        if (request.sowing_date - today).num_days() > onboarding_limits::MAX_SOWING_LEAD_DAYS {
            return Err(CropMindError::ValidationError(format!(
                "sowing date {} is more than {} days ahead",
                request.sowing_date,
                onboarding_limits::MAX_SOWING_LEAD_DAYS
            )));
        }

        if let Some(language) = &request.preferred_language {
            if language.chars().any(|c| !(c.is_alphabetic() || c == ' ' || c == '-')) {
                return Err(CropMindError::ValidationError(format!(
                    "invalid language '{language}'"
                )));
            }
        }

        if let (Some(latitude), Some(longitude)) = (request.latitude, request.longitude) {
            if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
                return Err(CropMindError::ValidationError(
                    "coordinates out of range".to_string(),
                ));
            }
        }

        Ok(request)
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{context, date};

    fn request(crop: &str) -> OnboardingRequest {
        OnboardingRequest {
            user_email: "kaur@farm.in".to_string(),
            crop: crop.to_string(),
            sowing_date: date(2025, 6, 1),
            state: "Punjab".to_string(),
            district: "Ludhiana".to_string(),
            village: "Dehlon".to_string(),
            preferred_language: None,
            latitude: None,
            longitude: None,
        }
    }

    fn service(context: &ServiceContext) -> OnboardingService {
        OnboardingService::new(
            context,
            Arc::new(InstanceLocks::new()),
            Arc::new(AlertService::new(context)),
        )
    }

    #[tokio::test]
    async fn test_onboarding_creates_farmer_and_lifecycle() {
        let (context, _) = context(date(2025, 6, 1));
        let result = service(&context).setup(request("Rice")).await.unwrap();

        assert_eq!(result.message, "Onboarding successful");
        assert_eq!(result.crop, "Rice");

        let farmer = context.store.get_farmer("kaur@farm.in").await.unwrap().unwrap();
        assert_eq!(farmer.name.as_deref(), Some("Farmer"));
        assert_eq!(farmer.preferred_language.as_deref(), Some("English"));
        assert_eq!(farmer.farm.unwrap().crop_type, "rice");

        let instance = context
            .store
            .active_lifecycle("kaur@farm.in")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(instance.instance_id, result.lifecycle_id);
        assert_eq!(instance.current_stage_order, 0);
        assert!(instance.tasks.iter().all(|t| !t.is_completed));
    }

    #[tokio::test]
    async fn test_reonboarding_archives_previous() {
        let (context, _) = context(date(2025, 6, 1));
        let onboarding = service(&context);
        let first = onboarding.setup(request("wheat")).await.unwrap();
        let second = onboarding.setup(request("cotton")).await.unwrap();
        assert_ne!(first.lifecycle_id, second.lifecycle_id);

        let active = context
            .store
            .active_lifecycle("kaur@farm.in")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(active.crop_type, "cotton");
    }

    #[tokio::test]
    async fn test_validation_errors() {
        let (context, _) = context(date(2025, 6, 1));
        let onboarding = service(&context);

        for bad in [
            OnboardingRequest { crop: "".to_string(), ..request("wheat") },
            OnboardingRequest { crop: "quinoa".to_string(), ..request("wheat") },
            OnboardingRequest { user_email: "not-an-email".to_string(), ..request("wheat") },
            OnboardingRequest { village: "  ".to_string(), ..request("wheat") },
            OnboardingRequest { preferred_language: Some("<script>".to_string()), ..request("wheat") },
            OnboardingRequest { sowing_date: NaiveDate::MAX, ..request("wheat") },
            OnboardingRequest { sowing_date: date(2026, 6, 2), ..request("wheat") },
        ] {
            let err = onboarding.setup(bad).await.unwrap_err();
            assert!(matches!(err, CropMindError::ValidationError(_)), "{err:?}");
        }
        assert!(context.store.get_farmer("kaur@farm.in").await.unwrap().is_none());
    }

    #[test]
    fn test_email_plausibility() {
        assert!(is_plausible_email("a@b.in"));
        assert!(!is_plausible_email("@b.in"));
        assert!(!is_plausible_email("a@localhost"));
        assert!(!is_plausible_email("a b@c.in"));
    }

    #[tokio::test]
    async fn test_sowing_date_within_a_year_is_accepted() {
        let (context, _) = context(date(2025, 6, 1));
        let result = service(&context)
            .setup(OnboardingRequest { sowing_date: date(2026, 6, 1), ..request("wheat") })
            .await
            .unwrap();
        assert_eq!(result.current_stage, "Planning");
    }
}
