//! Farmer profile reads and edits, and the dashboard's user-info card.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

use super::ServiceContext;
use crate::config::DefaultsConfig;
use crate::error::{CropMindError, Result};
use crate::models::{FarmerProfile, ProfileUpdate};
use crate::store::FarmStore;

/// Profile with farm fields flattened; farm fields are null before onboarding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileView {
    pub email: String,
    pub name: Option<String>,
    pub preferred_language: Option<String>,
    pub state: Option<String>,
    pub district: Option<String>,
    pub village: Option<String>,
    pub crop: Option<String>,
    pub sowing_date: Option<NaiveDate>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub has_farm_profile: bool,
}

impl From<&FarmerProfile> for ProfileView {
    fn from(profile: &FarmerProfile) -> Self {
        let farm = profile.farm.as_ref();
        Self {
            email: profile.email.clone(),
            name: profile.name.clone(),
            preferred_language: profile.preferred_language.clone(),
            state: farm.map(|f| f.state.clone()),
            district: farm.map(|f| f.district.clone()),
            village: farm.map(|f| f.village.clone()),
            crop: farm.map(|f| f.crop_type.clone()),
            sowing_date: farm.map(|f| f.sowing_date),
            latitude: farm.and_then(|f| f.latitude),
            longitude: farm.and_then(|f| f.longitude),
            has_farm_profile: profile.has_farm_profile(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub name: String,
    pub email: String,
    pub crop_type: Option<String>,
    pub has_farm_profile: bool,
    pub preferred_language: String,
}

impl UserInfo {
    fn from_profile(profile: &FarmerProfile, defaults: &DefaultsConfig) -> Self {
        Self {
            name: non_blank(profile.name.as_deref()).unwrap_or(&defaults.user_name).to_string(),
            email: profile.email.clone(),
            crop_type: profile.farm.as_ref().map(|f| f.crop_type.clone()),
            has_farm_profile: profile.has_farm_profile(),
            preferred_language: non_blank(profile.preferred_language.as_deref())
                .unwrap_or(&defaults.language)
                .to_string(),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

pub struct ProfileService {
    store: Arc<dyn FarmStore>,
    defaults: DefaultsConfig,
}

impl ProfileService {
    pub fn new(context: &ServiceContext) -> Self {
        Self {
            store: Arc::clone(&context.store),
            defaults: context.config.defaults.clone(),
        }
    }

    #[instrument(skip(self))]
    pub async fn profile(&self, email: &str) -> Result<ProfileView> {
        let farmer = self.farmer(email).await?;
        Ok(ProfileView::from(&farmer))
    }

    /// Crop and sowing date are fixed at onboarding and cannot be edited here
    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, email: &str, update: ProfileUpdate) -> Result<ProfileView> {
        let mut farmer = self.farmer(email).await?;
        for (field, value) in [
            ("name", &update.name),
            ("preferred_language", &update.preferred_language),
            ("state", &update.state),
            ("district", &update.district),
            ("village", &update.village),
        ] {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                return Err(CropMindError::ValidationError(format!(
                    "{field} must not be blank"
                )));
            }
        }

        farmer.apply(update);
        self.store.upsert_farmer(&farmer).await?;
        info!(farmer = %email, "Profile updated");
        Ok(ProfileView::from(&farmer))
    }

    #[instrument(skip(self))]
    pub async fn user_info(&self, email: &str) -> Result<UserInfo> {
        let farmer = self.farmer(email).await?;
        Ok(UserInfo::from_profile(&farmer, &self.defaults))
    }

    async fn farmer(&self, email: &str) -> Result<FarmerProfile> {
        self.store
            .get_farmer(email)
            .await?
            .ok_or_else(|| CropMindError::NotFound(format!("user {email}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{context, date};
    use crate::utils::Clock;

    #[tokio::test]
    async fn test_user_info_applies_defaults() {
        let (context, clock) = context(date(2025, 6, 1));
        let service = ProfileService::new(&context);
        assert!(service.user_info("a@b.in").await.unwrap_err().is_not_found());

        context
            .store
            .upsert_farmer(&FarmerProfile::new("a@b.in", clock.now()))
            .await
            .unwrap();
        let info = service.user_info("a@b.in").await.unwrap();
        assert_eq!(info.name, "Farmer");
        assert_eq!(info.preferred_language, "English");
        assert!(!info.has_farm_profile);
        assert_eq!(info.crop_type, None);
    }

    #[tokio::test]
    async fn test_update_without_farm_keeps_farm_fields_null() {
        let (context, clock) = context(date(2025, 6, 1));
        let service = ProfileService::new(&context);
        context
            .store
            .upsert_farmer(&FarmerProfile::new("a@b.in", clock.now()))
            .await
            .unwrap();

        let view = service
            .update_profile(
                "a@b.in",
                ProfileUpdate {
                    name: Some("Harjit".to_string()),
                    village: Some("Dehlon".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(view.name.as_deref(), Some("Harjit"));
        assert_eq!(view.village, None);

        let err = service
            .update_profile(
                "a@b.in",
                ProfileUpdate {
                    name: Some(" ".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CropMindError::ValidationError(_)));
    }
}
