//! Current weather at a farmer's farm.

use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

use super::ServiceContext;
use crate::error::{CropMindError, Result};
use crate::gateways::{self, WeatherLocation, WeatherProvider};
use crate::models::{FarmDetails, WeatherReport};
use crate::store::FarmStore;

pub struct FarmWeatherService {
    store: Arc<dyn FarmStore>,
    provider: Arc<dyn WeatherProvider>,
    timeout: Duration,
}

impl FarmWeatherService {
    pub fn new(context: &ServiceContext) -> Self {
        Self {
            store: Arc::clone(&context.store),
            provider: Arc::clone(&context.weather),
            timeout: context.config.weather.timeout(),
        }
    }

    #[instrument(skip(self))]
    pub async fn for_farmer(&self, email: &str) -> Result<WeatherReport> {
        let farm = self.farm(email).await?;
        self.for_farm(&farm).await
    }

    pub async fn for_farm(&self, farm: &FarmDetails) -> Result<WeatherReport> {
        let location = WeatherLocation::for_farm(farm);
        let report =
            gateways::bounded("weather", self.timeout, self.provider.current(&location)).await?;
        Ok(report)
    }

    async fn farm(&self, email: &str) -> Result<FarmDetails> {
        self.store
            .get_farmer(email)
            .await?
            .and_then(|farmer| farmer.farm)
            .ok_or_else(|| CropMindError::NotFound(format!("farm profile for {email}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FarmerProfile;
    use crate::services::test_support::{context, date};
    use crate::utils::Clock;

    #[tokio::test]
    async fn test_weather_requires_farm() {
        let (context, clock) = context(date(2025, 7, 1));
        let service = FarmWeatherService::new(&context);
        assert!(service.for_farmer("a@b.in").await.unwrap_err().is_not_found());

        let mut farmer = FarmerProfile::new("a@b.in", clock.now());
        farmer.farm = Some(FarmDetails {
            crop_type: "wheat".to_string(),
            sowing_date: date(2025, 6, 1),
            state: "Punjab".to_string(),
            district: "Ludhiana".to_string(),
            village: "Dehlon".to_string(),
            latitude: None,
            longitude: None,
        });
        context.store.upsert_farmer(&farmer).await.unwrap();

        let report = service.for_farmer("a@b.in").await.unwrap();
        assert_eq!(report.condition, "Clear");
    }
}
