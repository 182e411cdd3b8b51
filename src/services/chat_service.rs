//! Farmer questions answered by the advisory gateway.
//!
//! An advisory failure never fails the request: the farmer gets the configured
//! fallback message and an empty step list.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{instrument, warn};

use super::{FarmWeatherService, ServiceContext};
use crate::catalog::StageCatalog;
use crate::error::{CropMindError, Result};
use crate::gateways::{
    self,
    advisory::{default_knowledge, parse_actionable_steps},
    ActionRequest, AdvisoryGateway,
};
use crate::state_machine::progress::day_count;
use crate::store::FarmStore;
use crate::utils::Clock;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatQuery {
    pub user_email: String,
    pub question: String,
    /// Stage the farmer is asking about; defaults to the current stage
    #[serde(default)]
    pub stage: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatAnswer {
    pub answer: String,
    pub stage: String,
    pub actionable_steps: Vec<String>,
}

pub struct ChatService {
    context: ServiceContext,
    weather: Arc<FarmWeatherService>,
    timeout: Duration,
}

impl ChatService {
    pub fn new(context: &ServiceContext, weather: Arc<FarmWeatherService>) -> Self {
        Self {
            context: context.clone(),
            weather,
            timeout: context.config.advisory.timeout(),
        }
    }

    #[instrument(skip(self, query), fields(farmer = %query.user_email))]
    pub async fn ask(&self, query: ChatQuery) -> Result<ChatAnswer> {
        let question = query.question.trim();
        if question.is_empty() {
            return Err(CropMindError::ValidationError(
                "question must not be empty".to_string(),
            ));
        }

        let farmer = self
            .context
            .store
            .get_farmer(&query.user_email)
            .await?
            .ok_or_else(|| CropMindError::NotFound(format!("user {}", query.user_email)))?;
        let farm = farmer.farm.as_ref().ok_or_else(|| {
            CropMindError::NotFound(format!("farm profile for {}", query.user_email))
        })?;

        let stage = match query.stage.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(stage) => stage.to_string(),
            None => self.current_stage_label(&query.user_email, &farm.crop_type, farm.sowing_date).await?,
        };
        let crop = self
            .context
            .catalog
            .entry(&farm.crop_type)
            .map(|entry| entry.display_name.clone())
            .unwrap_or_else(|_| farm.crop_type.clone());

        let weather = match self.weather.for_farm(farm).await {
            Ok(report) => report.summary(),
            Err(e) => {
                warn!(error = %e, "Weather context unavailable for chat");
                "Unknown".to_string()
            }
        };

        let language = self
            .context
            .language_or_default(farmer.preferred_language.as_deref());
        let request = ActionRequest::daily(&stage, weather, default_knowledge(&crop, &stage))
            .with_question(question);

        let answer = gateways::bounded(
            "advisory",
            self.timeout,
            self.context.advisory.advise(&request, &language),
        )
        .await;

        Ok(match answer {
            Ok(answer) => ChatAnswer {
                actionable_steps: parse_actionable_steps(&answer),
                answer,
                stage,
            },
            Err(e) => {
                warn!(error = %e, "Advisory unavailable, answering with fallback");
                ChatAnswer {
                    answer: self.context.config.advisory.fallback_message.clone(),
                    stage,
                    actionable_steps: Vec::new(),
                }
            }
        })
    }

    /// Label of the active lifecycle's stage, or the calendar estimate without one
    async fn current_stage_label(
        &self,
        email: &str,
        crop_type: &str,
        sowing_date: chrono::NaiveDate,
    ) -> Result<String> {
        let catalog: &StageCatalog = &self.context.catalog;
        let entry = catalog.entry(crop_type)?;
        if let Some(instance) = self.context.store.active_lifecycle(email).await? {
            if let Some(stage) = entry.stage_at(instance.current_stage_order) {
                return Ok(stage.label.clone());
            }
        }
        let days = day_count(sowing_date, self.context.clock.today());
        Ok(entry
            .nominal_stage_for_day(days)
            .map(|stage| stage.label.clone())
            .unwrap_or_else(|| "Unknown".to_string()))
    }
}
