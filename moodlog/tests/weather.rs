mod helpers;
use helpers::{spawn_app, TestClient};
use moodlog_client::weather::{current_weather, refresh_weather};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(mock: &MockServer) -> TestClient {
    let api_url = format!("{}/v1/forecast", mock.uri());
    TestClient::build_with("http://127.0.0.1:9", |b| {
        Ok(b.set_override("weather.latitude", 52.25)?
            .set_override("weather.longitude", 21.0)?
            .set_override("weather.api_url", api_url)?)
    })
    .unwrap()
}

fn forecast(temp: f64, code: i64, is_day: i64) -> serde_json::Value {
    serde_json::json!({
        "current": {
            "temperature_2m": temp,
            "weather_code": code,
            "is_day": is_day,
        }
    })
}

#[tokio::test]
async fn weather_is_fetched_then_served_from_cache() {
    let mock = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "52.25"))
        .and(query_param("current", "temperature_2m,weather_code,is_day"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast(12.5, 0, 1)))
        .expect(1)
        .mount(&mock)
        .await;

    let client = client_for(&mock);
    let ctx = client.context().await.unwrap();

    let report = current_weather(&ctx).await;
    assert!(report.text.ends_with(": 12.5°C"), "{}", report.text);
    assert_eq!(report.icon.as_deref(), Some("☀️"));
    assert_eq!(report.is_day, Some(true));
    assert!(!report.from_cache);

    let again = current_weather(&ctx).await;
    assert!(again.from_cache);
    assert_eq!(again.text, report.text);
}

#[tokio::test]
async fn refresh_skips_the_cache() {
    let mock = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast(3.0, 71, 0)))
        .expect(2)
        .mount(&mock)
        .await;

    let client = client_for(&mock);
    let ctx = client.context().await.unwrap();

    current_weather(&ctx).await;
    let report = refresh_weather(&ctx).await;
    assert!(!report.from_cache);
    assert_eq!(report.icon.as_deref(), Some("🌨️"));
}

#[tokio::test]
async fn failed_download_is_reported() {
    let mock = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock)
        .await;

    let client = client_for(&mock);
    let ctx = client.context().await.unwrap();

    let report = current_weather(&ctx).await;
    assert_eq!(report.text, "Weather download failed.");
    assert!(report.icon.is_none());
}

#[tokio::test]
async fn offline_uses_stale_cache_or_reports_no_data() {
    let mock = MockServer::start().await;
    let mut client = client_for(&mock);
    client.offline(true);
    let ctx = client.context().await.unwrap();

    let report = current_weather(&ctx).await;
    assert_eq!(report.text, "Offline: no weather data.");

    ctx.cache
        .set_raw(
            moodlog_client::cache::WEATHER_KEY,
            r#"{"ts":0,"text":"Warsaw: 4°C","icon":"☁️"}"#,
        )
        .await
        .unwrap();
    let report = current_weather(&ctx).await;
    assert_eq!(report.text, "Warsaw: 4°C");
    assert!(report.from_cache);
}

#[tokio::test]
async fn no_position_without_coordinates() {
    let server = spawn_app().await.unwrap();
    let client = TestClient::build(&server.address()).unwrap();
    let ctx = client.context().await.unwrap();

    let report = current_weather(&ctx).await;
    assert_eq!(report.text, "Geolocation unavailable.");
}
