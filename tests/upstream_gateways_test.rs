//! HTTP collaborators against mock servers.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cropmind_core::config::AdvisoryConfig;
use cropmind_core::gateways::{
    ActionRequest, AdvisoryGateway, CachedWeatherProvider, ChatCompletionsGateway,
    OpenWeatherMapProvider, UpstreamError, WeatherLocation, WeatherProvider,
};

fn owm_body() -> serde_json::Value {
    json!({
        "main": {"temp": 41.2, "feels_like": 44.0, "humidity": 20},
        "weather": [{"main": "Clear", "description": "clear sky"}],
        "wind": {"speed": 2.5},
        "clouds": {"all": 10}
    })
}

#[tokio::test]
async fn test_openweathermap_by_coordinates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("appid", "test-key"))
        .and(query_param("units", "metric"))
        .and(query_param("lat", "30.9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(owm_body()))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenWeatherMapProvider::new(
        format!("{}/data/2.5/weather", server.uri()),
        "test-key",
        Duration::from_secs(2),
    )
    .unwrap();
    let report = provider
        .current(&WeatherLocation::Coordinates {
            latitude: 30.9,
            longitude: 75.85,
        })
        .await
        .unwrap();

    assert_eq!(report.temperature, 41.2);
    assert_eq!(report.wind_speed, 9.0);
    assert_eq!(report.alert.as_deref(), Some("Extreme heat warning"));
    assert_eq!(report.rain_amount, None);
}

#[tokio::test]
async fn test_openweathermap_error_status_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let provider =
        OpenWeatherMapProvider::new(server.uri(), "bad-key", Duration::from_secs(2)).unwrap();
    let err = provider
        .current(&WeatherLocation::Query("Dehlon,Ludhiana,Punjab".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(err, UpstreamError::Unavailable { .. }));
}

#[tokio::test]
async fn test_weather_cache_avoids_second_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("q", "Dehlon,Ludhiana,Punjab"))
        .respond_with(ResponseTemplate::new(200).set_body_json(owm_body()))
        .expect(1)
        .mount(&server)
        .await;

    let inner =
        OpenWeatherMapProvider::new(server.uri(), "test-key", Duration::from_secs(2)).unwrap();
    let cached = CachedWeatherProvider::new(Arc::new(inner), Duration::from_secs(1800));
    let location = WeatherLocation::Query("Dehlon,Ludhiana,Punjab".to_string());

    let first = cached.current(&location).await.unwrap();
    let second = cached.current(&location).await.unwrap();
    assert_eq!(first, second);
}

fn advisory_config(server: &MockServer) -> AdvisoryConfig {
    AdvisoryConfig {
        enabled: true,
        endpoint: format!("{}/v1", server.uri()),
        api_key: Some("sk-test".to_string()),
        model: "test-model".to_string(),
        timeout_ms: 2_000,
        ..AdvisoryConfig::default()
    }
}

fn completion(content: &str) -> serde_json::Value {
    json!({"choices": [{"message": {"role": "assistant", "content": content}}]})
}

#[tokio::test]
async fn test_chat_completions_plan_and_translate() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({"model": "test-model"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            "ACTION: Apply mulch\nREASON: Heat stress",
        )))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("ਮਲਚ ਲਗਾਓ")))
        .mount(&server)
        .await;

    let gateway = ChatCompletionsGateway::from_config(&advisory_config(&server)).unwrap();
    let request = ActionRequest::daily("Growth", "Clear - 41°C", "none");

    let english = gateway.advise(&request, "English").await.unwrap();
    assert_eq!(english, "ACTION: Apply mulch\nREASON: Heat stress");

    let punjabi = gateway.advise(&request, "Punjabi").await.unwrap();
    assert_eq!(punjabi, "ਮਲਚ ਲਗਾਓ");
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_chat_completions_empty_content_is_invalid() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let gateway = ChatCompletionsGateway::from_config(&advisory_config(&server)).unwrap();
    let err = gateway
        .plan_action(&ActionRequest::daily("Growth", "Clear", "none"))
        .await
        .unwrap_err();
    assert!(matches!(err, UpstreamError::InvalidResponse { .. }));
}
