//! HTTP adapters against a mock server

use std::time::Duration;

use reqwest::Url;
use skycast_weather::api::{http_client, HttpWeatherProvider, IpLocator};
use skycast_weather::location::LocationCapability;
use skycast_weather::weather::WeatherProvider;
use skycast_weather::{Coordinates, GeolocationErrorCode, PipelineErrorKind};
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

fn sample_weather_response() -> serde_json::Value {
    serde_json::json!({
        "coord": {"lon": -73.9, "lat": 40.7},
        "weather": [{"id": 801, "main": "Clouds", "description": "few clouds", "icon": "02d"}],
        "main": {"temp": 12.3, "feels_like": 11.0, "pressure": 1018, "humidity": 61},
        "name": "Brooklyn",
        "sys": {"country": "US", "sunrise": 1700000000, "sunset": 1700036000}
    })
}

fn weather_provider(server: &MockServer) -> HttpWeatherProvider {
    let url = Url::parse(&format!("{}/api/current", server.uri())).expect("mock url");
    HttpWeatherProvider::new(http_client(Duration::from_secs(5)).expect("client"), url)
}

fn locator(server: &MockServer, timeout: Duration) -> IpLocator {
    let url = Url::parse(&format!("{}/json", server.uri())).expect("mock url");
    IpLocator::new(http_client(timeout).expect("client"), url)
}

async fn mount_weather(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/api/current"))
        .respond_with(response)
        .mount(server)
        .await;
}

async fn mount_locate(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(response)
        .mount(server)
        .await;
}

// ============================================================================
// Weather
// ============================================================================

#[tokio::test]
async fn test_weather_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/current"))
        .and(query_param("lat", "40.7"))
        .and(query_param("lon", "-73.9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_weather_response()))
        .expect(1)
        .mount(&server)
        .await;

    let snapshot = weather_provider(&server)
        .current(Coordinates::new(40.7, -73.9))
        .await
        .expect("weather loads");

    assert_eq!(snapshot.location_name, "Brooklyn");
    assert_eq!(snapshot.country_code, "US");
    assert!((snapshot.temperature_celsius - 12.3).abs() < f64::EPSILON);
    assert_eq!(snapshot.humidity_percent, 61.0);
    assert_eq!(snapshot.pressure, 1018.0);
    assert_eq!(snapshot.condition_id, 801);
    assert_eq!(snapshot.condition_main, "Clouds");
    assert_eq!(snapshot.condition_description, "few clouds");
    assert_eq!(snapshot.icon_ref, "02d");
    assert_eq!(snapshot.sunset_epoch, Some(1_700_036_000));
}

#[tokio::test]
async fn test_weather_server_error() {
    let server = MockServer::start().await;
    mount_weather(&server, ResponseTemplate::new(500)).await;

    let err = weather_provider(&server)
        .current(Coordinates::new(1.0, 2.0))
        .await
        .unwrap_err();

    assert_eq!(err.kind, PipelineErrorKind::NetworkFailed);
    assert!(err.message.contains("500"), "message: {}", err.message);
}

#[tokio::test]
async fn test_weather_invalid_body() {
    let server = MockServer::start().await;
    mount_weather(
        &server,
        ResponseTemplate::new(200).set_body_string("{\"name\": \"Nowhere\"}"),
    )
    .await;

    let err = weather_provider(&server)
        .current(Coordinates::new(1.0, 2.0))
        .await
        .unwrap_err();

    assert_eq!(err.kind, PipelineErrorKind::ParseFailed);
}

#[tokio::test]
async fn test_weather_unreachable() {
    // Nothing listens here once the server is dropped
    let server = MockServer::start().await;
    let provider = weather_provider(&server);
    drop(server);

    let err = provider
        .current(Coordinates::new(1.0, 2.0))
        .await
        .unwrap_err();

    assert_eq!(err.kind, PipelineErrorKind::NetworkFailed);
}

// ============================================================================
// IP geolocation
// ============================================================================

#[tokio::test]
async fn test_locate_success() {
    let server = MockServer::start().await;
    mount_locate(
        &server,
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "success",
            "country": "United States",
            "city": "Ashburn",
            "lat": 39.03,
            "lon": -77.5,
        })),
    )
    .await;

    let coords = locator(&server, Duration::from_secs(5))
        .request_position()
        .await
        .expect("position");

    assert_eq!(coords, Coordinates::new(39.03, -77.5));
}

#[tokio::test]
async fn test_locate_long_field_names() {
    let server = MockServer::start().await;
    mount_locate(
        &server,
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "latitude": 51.5,
            "longitude": -0.12,
        })),
    )
    .await;

    let coords = locator(&server, Duration::from_secs(5))
        .request_position()
        .await
        .expect("position");

    assert_eq!(coords, Coordinates::new(51.5, -0.12));
}

#[tokio::test]
async fn test_locate_reported_failure() {
    let server = MockServer::start().await;
    mount_locate(
        &server,
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "fail",
            "message": "reserved range",
        })),
    )
    .await;

    let err = locator(&server, Duration::from_secs(5))
        .request_position()
        .await
        .unwrap_err();

    assert_eq!(err.code, GeolocationErrorCode::PositionUnavailable);
    assert_eq!(err.message, "reserved range");
}

#[tokio::test]
async fn test_locate_rate_limited() {
    let server = MockServer::start().await;
    mount_locate(&server, ResponseTemplate::new(429)).await;

    let err = locator(&server, Duration::from_secs(5))
        .request_position()
        .await
        .unwrap_err();

    assert_eq!(err.code, GeolocationErrorCode::PositionUnavailable);
}

#[tokio::test]
async fn test_locate_timeout() {
    let server = MockServer::start().await;
    mount_locate(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(serde_json::json!({"lat": 1.0, "lon": 2.0}))
            .set_delay(Duration::from_secs(3)),
    )
    .await;

    let err = locator(&server, Duration::from_millis(200))
        .request_position()
        .await
        .unwrap_err();

    assert_eq!(err.code, GeolocationErrorCode::Timeout);
}
