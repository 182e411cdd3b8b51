//! Farmer identity and farm profile.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A farmer keyed by email, with the farm captured at onboarding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmerProfile {
    pub email: String,
    pub name: Option<String>,
    pub preferred_language: Option<String>,
    pub farm: Option<FarmDetails>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmDetails {
    pub crop_type: String,
    pub sowing_date: NaiveDate,
    pub state: String,
    pub district: String,
    pub village: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl FarmDetails {
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }

    /// Free-text location used when coordinates are missing
    pub fn location_query(&self) -> String {
        format!("{},{},{}", self.village, self.district, self.state)
    }
}

/// Partial profile update; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub preferred_language: Option<String>,
    pub state: Option<String>,
    pub district: Option<String>,
    pub village: Option<String>,
}

impl FarmerProfile {
    pub fn new(email: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            email: email.into(),
            name: None,
            preferred_language: None,
            farm: None,
            created_at: now,
        }
    }

    pub fn has_farm_profile(&self) -> bool {
        self.farm.is_some()
    }

    /// Apply an update. Farm fields are ignored when there is no farm yet.
    pub fn apply(&mut self, update: ProfileUpdate) {
        if let Some(name) = update.name {
            self.name = Some(name);
        }
        if let Some(language) = update.preferred_language {
            self.preferred_language = Some(language);
        }
        if let Some(farm) = self.farm.as_mut() {
            if let Some(state) = update.state {
                farm.state = state;
            }
            if let Some(district) = update.district {
                farm.district = district;
            }
            if let Some(village) = update.village {
                farm.village = village;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn farm() -> FarmDetails {
        FarmDetails {
            crop_type: "rice".to_string(),
            sowing_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            state: "Punjab".to_string(),
            district: "Ludhiana".to_string(),
            village: "Dehlon".to_string(),
            latitude: None,
            longitude: Some(75.8),
        }
    }

    #[test]
    fn test_location_query_without_full_coordinates() {
        let farm = farm();
        assert_eq!(farm.coordinates(), None);
        assert_eq!(farm.location_query(), "Dehlon,Ludhiana,Punjab");
    }

    #[test]
    fn test_apply_update_skips_farm_fields_without_farm() {
        let mut profile = FarmerProfile::new("a@b.in", Utc::now());
        profile.apply(ProfileUpdate {
            name: Some("Gurpreet".to_string()),
            state: Some("Haryana".to_string()),
            ..Default::default()
        });
        assert_eq!(profile.name.as_deref(), Some("Gurpreet"));
        assert!(profile.farm.is_none());

        profile.farm = Some(farm());
        profile.apply(ProfileUpdate {
            village: Some("Sahnewal".to_string()),
            ..Default::default()
        });
        assert_eq!(profile.farm.unwrap().village, "Sahnewal");
    }
}
