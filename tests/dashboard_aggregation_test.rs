//! Partial-failure behaviour of the dashboard aggregator.

mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use common::{
    clear_weather, date, onboarding_request, stormy_weather, unique_email, FailingWeather,
    ScriptedAdvisory, SlowWeather, TestApp, TestAppBuilder,
};
use cropmind_core::constants::DashboardSection;
use cropmind_core::gateways::StaticWeatherProvider;
use cropmind_core::models::AlertKind;
use cropmind_core::store::FarmStore;

async fn onboarded(app: &TestApp, prefix: &str) -> String {
    let email = unique_email(prefix);
    app.services
        .onboarding
        .setup(onboarding_request(&email, "wheat", date(2025, 6, 1)))
        .await
        .unwrap();
    email
}

fn planner() -> Arc<ScriptedAdvisory> {
    Arc::new(ScriptedAdvisory::new(
        "ACTION: Check field drainage\nREASON: Rain expected",
    ))
}

#[tokio::test]
async fn test_weather_failure_keeps_other_sections() {
    let app = TestAppBuilder::new()
        .weather(Arc::new(FailingWeather))
        .advisory(planner())
        .build();
    let email = onboarded(&app, "weather-down").await;

    let view = app.services.dashboard.aggregate(&email).await;
    assert!(view.weather.is_none());
    assert!(view.lifecycle.is_some());
    assert!(view.profile.is_some());
    assert!(view.today_action.is_some());
    assert_eq!(view.unavailable_sections(), vec![DashboardSection::Weather]);

    let summary = view.into_summary().unwrap();
    assert_eq!(summary.current_stage.as_deref(), Some("Planning"));
    assert_eq!(summary.day_count, Some(30));
    assert_eq!(summary.weather_summary, None);
    assert_eq!(summary.user_name.as_deref(), Some("Farmer"));
}

#[tokio::test]
async fn test_all_sections_present() {
    let app = TestAppBuilder::new().advisory(planner()).build();
    let email = onboarded(&app, "all-good").await;

    let summary = app
        .services
        .dashboard
        .aggregate(&email)
        .await
        .into_summary()
        .unwrap();
    assert!(summary.unavailable_sections.is_empty());
    assert_eq!(summary.weather_summary.as_deref(), Some("Clear - 31°C"));
    assert_eq!(summary.progress_percentage, Some(0.0));
    assert_eq!(
        summary.today_action.as_deref(),
        Some("ACTION: Check field drainage\nREASON: Rain expected")
    );

    let advice = app.store.recent_advice(&email, 5).await.unwrap();
    assert_eq!(advice.len(), 1);
    assert_eq!(advice[0].stage_at_time.as_deref(), Some("Planning"));
}

#[tokio::test]
async fn test_advisory_outage_only_drops_today_action() {
    let app = TestAppBuilder::new().build();
    let email = onboarded(&app, "no-advisory").await;

    let view = app.services.dashboard.aggregate(&email).await;
    assert_eq!(view.unavailable_sections(), vec![DashboardSection::TodayAction]);
    assert!(view.weather.is_some());
    assert!(app.store.recent_advice(&email, 5).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_slow_section_is_cut_off() {
    let app = TestAppBuilder::new()
        .weather(Arc::new(SlowWeather {
            delay: Duration::from_secs(5),
            report: clear_weather(),
        }))
        .advisory(planner())
        .configure(|config| {
            config.dashboard.section_timeout_ms = 100;
            config.weather.timeout_ms = 10_000;
        })
        .build();
    let email = onboarded(&app, "slow").await;

    let started = Instant::now();
    let view = app.services.dashboard.aggregate(&email).await;
    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(view.weather.is_none());
    assert!(view.lifecycle.is_some());
    assert!(view.profile.is_some());
    assert!(view
        .unavailable_sections()
        .contains(&DashboardSection::Weather));
}

#[tokio::test]
async fn test_unknown_farmer_summary_is_not_found() {
    let app = TestAppBuilder::new().build();
    let view = app.services.dashboard.aggregate("ghost@farm.test").await;
    assert_eq!(view.unavailable_sections().len(), 4);
    assert!(view.into_summary().unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_weather_alert_recorded_once_per_day() {
    let app = TestAppBuilder::new()
        .weather(Arc::new(StaticWeatherProvider::new(stormy_weather())))
        .build();
    let email = onboarded(&app, "storm").await;

    app.services.dashboard.aggregate(&email).await;
    app.services.dashboard.aggregate(&email).await;

    let weather_alerts: Vec<_> = app
        .services
        .alerts
        .list(&email)
        .await
        .unwrap()
        .into_iter()
        .filter(|a| a.kind == AlertKind::Weather)
        .collect();
    assert_eq!(weather_alerts.len(), 1);
    assert_eq!(weather_alerts[0].message, "Heavy rain expected");
}
