//! Farmer alerts: listing plus the two producers inside the backend, stage
//! advances and weather warnings.

use std::sync::Arc;
use tracing::{debug, instrument};

use super::ServiceContext;
use crate::error::Result;
use crate::models::{Alert, AlertKind, AlertSeverity, NewAlert};
use crate::store::FarmStore;
use crate::utils::Clock;

pub struct AlertService {
    store: Arc<dyn FarmStore>,
    clock: Arc<dyn Clock>,
}

impl AlertService {
    pub fn new(context: &ServiceContext) -> Self {
        Self {
            store: Arc::clone(&context.store),
            clock: Arc::clone(&context.clock),
        }
    }

    /// Newest first. Farmers without a farm profile have no alerts.
    #[instrument(skip(self))]
    pub async fn list(&self, email: &str) -> Result<Vec<Alert>> {
        let has_farm = self
            .store
            .get_farmer(email)
            .await?
            .is_some_and(|farmer| farmer.has_farm_profile());
        if !has_farm {
            return Ok(Vec::new());
        }
        self.store.alerts_for(email).await
    }

    pub async fn record(&self, alert: NewAlert) -> Result<Alert> {
        self.store.record_alert(alert, self.clock.now()).await
    }

    pub async fn record_stage_entered(
        &self,
        email: &str,
        crop: &str,
        stage_label: &str,
    ) -> Result<Alert> {
        self.record(NewAlert {
            farmer_email: email.to_string(),
            kind: AlertKind::Stage,
            message: format!("Your {crop} has entered the {stage_label} stage."),
            severity: AlertSeverity::Info,
        })
        .await
    }

    /// Record a weather warning unless the same message was already raised today
    pub async fn record_weather_once(&self, email: &str, message: &str) -> Result<Option<Alert>> {
        let today = self.clock.today();
        let already_raised = self.store.alerts_for(email).await?.iter().any(|alert| {
            alert.kind == AlertKind::Weather
                && alert.message == message
                && alert.created_at.date_naive() == today
        });
        if already_raised {
            debug!(farmer = %email, "Weather alert already raised today");
            return Ok(None);
        }

        let alert = self
            .record(NewAlert {
                farmer_email: email.to_string(),
                kind: AlertKind::Weather,
                message: message.to_string(),
                severity: AlertSeverity::Warning,
            })
            .await?;
        Ok(Some(alert))
    }
}
