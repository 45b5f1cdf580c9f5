//! HTTP adapters
//!
//! - [`HttpWeatherProvider`]: current conditions from an OpenWeatherMap-style
//!   endpoint (`GET <base>?lat=..&lon=..`)
//! - [`IpLocator`]: approximate position from an IP geolocation service
//!
//! Both are plain capabilities; the pipeline never sees reqwest types.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::debug;

use crate::error::{ConfigError, GeolocationError, GeolocationErrorCode, PipelineError};
use crate::location::LocationCapability;
use crate::state::{Coordinates, WeatherSnapshot};
use crate::weather::WeatherProvider;

/// Build the HTTP client shared by the adapters
pub fn http_client(timeout: Duration) -> Result<Client, ConfigError> {
    Ok(Client::builder()
        .timeout(timeout)
        .user_agent(concat!("skycast/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

// ============================================================================
// Weather
// ============================================================================

/// Weather API response
#[derive(Debug, Deserialize)]
struct WeatherResponse {
    name: String,
    sys: Sys,
    main: Main,
    weather: Vec<Condition>,
}

#[derive(Debug, Deserialize)]
struct Sys {
    country: String,
    sunrise: Option<i64>,
    sunset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Main {
    temp: f64,
    humidity: f64,
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct Condition {
    id: u32,
    main: String,
    description: String,
    icon: String,
}

/// Parse a weather response body into a snapshot
///
/// Missing or mistyped required fields, and an empty `weather` list, are
/// `ParseFailed`.
pub fn parse_snapshot(body: &str) -> Result<WeatherSnapshot, PipelineError> {
    let response: WeatherResponse = serde_json::from_str(body)
        .map_err(|e| PipelineError::parse(format!("invalid weather response: {e}")))?;

    let condition = response
        .weather
        .into_iter()
        .next()
        .ok_or_else(|| PipelineError::parse("weather response has no conditions"))?;

    Ok(WeatherSnapshot {
        location_name: response.name,
        country_code: response.sys.country,
        temperature_celsius: response.main.temp,
        humidity_percent: response.main.humidity,
        pressure: response.main.pressure,
        condition_id: condition.id,
        condition_main: condition.main,
        condition_description: condition.description,
        icon_ref: condition.icon,
        sunrise_epoch: response.sys.sunrise,
        sunset_epoch: response.sys.sunset,
    })
}

/// Weather provider over HTTP
#[derive(Clone, Debug)]
pub struct HttpWeatherProvider {
    client: Client,
    base_url: Url,
}

impl HttpWeatherProvider {
    pub fn new(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

#[async_trait]
impl WeatherProvider for HttpWeatherProvider {
    async fn current(&self, coords: Coordinates) -> Result<WeatherSnapshot, PipelineError> {
        debug!(url = %self.base_url, %coords, "fetching weather");

        let response = self
            .client
            .get(self.base_url.clone())
            .query(&[("lat", coords.latitude), ("lon", coords.longitude)])
            .send()
            .await
            .map_err(|e| PipelineError::network(format!("weather request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::network(format!(
                "weather service returned {status}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| PipelineError::network(format!("weather response interrupted: {e}")))?;

        parse_snapshot(&body)
    }
}

// ============================================================================
// IP geolocation
// ============================================================================

/// IP geolocation response (ip-api.com style, `latitude`/`longitude` accepted)
#[derive(Debug, Deserialize)]
struct IpLocation {
    #[serde(alias = "latitude")]
    lat: Option<f64>,
    #[serde(alias = "longitude")]
    lon: Option<f64>,
    status: Option<String>,
    message: Option<String>,
}

/// Position from the public IP address
#[derive(Clone, Debug)]
pub struct IpLocator {
    client: Client,
    url: Url,
}

impl IpLocator {
    pub fn new(client: Client, url: Url) -> Self {
        Self { client, url }
    }
}

fn unavailable(message: impl Into<String>) -> GeolocationError {
    GeolocationError::new(GeolocationErrorCode::PositionUnavailable, message)
}

#[async_trait]
impl LocationCapability for IpLocator {
    async fn request_position(&self) -> Result<Coordinates, GeolocationError> {
        debug!(url = %self.url, "locating by IP");

        let response = self.client.get(self.url.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                GeolocationError::new(GeolocationErrorCode::Timeout, "position request timed out")
            } else {
                unavailable(format!("position request failed: {e}"))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(unavailable(format!("position service returned {status}")));
        }

        let location: IpLocation = response.json().await.map_err(|e| {
            if e.is_timeout() {
                GeolocationError::new(GeolocationErrorCode::Timeout, "position request timed out")
            } else {
                unavailable(format!("invalid position response: {e}"))
            }
        })?;

        if location.status.as_deref() == Some("fail") {
            return Err(unavailable(
                location
                    .message
                    .unwrap_or_else(|| "position lookup failed".to_string()),
            ));
        }

        match (location.lat, location.lon) {
            (Some(lat), Some(lon)) => Ok(Coordinates::new(lat, lon)),
            _ => Err(unavailable("position response has no coordinates")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineErrorKind;

    const NEW_YORK: &str = r#"{
        "coord": {"lon": -74.0, "lat": 40.7},
        "weather": [{"id": 800, "main": "Clear", "description": "clear sky", "icon": "01d"}],
        "base": "stations",
        "main": {"temp": 20.0, "temp_min": 18.0, "temp_max": 22.0, "pressure": 1012, "humidity": 55},
        "name": "New York",
        "sys": {"country": "US", "sunrise": 1700000000, "sunset": 1700040000}
    }"#;

    #[test]
    fn test_parse_snapshot() {
        let snapshot = parse_snapshot(NEW_YORK).expect("valid response");

        assert_eq!(snapshot.location_name, "New York");
        assert_eq!(snapshot.country_code, "US");
        assert_eq!(snapshot.temperature_celsius, 20.0);
        assert_eq!(snapshot.humidity_percent, 55.0);
        assert_eq!(snapshot.pressure, 1012.0);
        assert_eq!(snapshot.condition_id, 800);
        assert_eq!(snapshot.condition_main, "Clear");
        assert_eq!(snapshot.condition_description, "clear sky");
        assert_eq!(snapshot.icon_ref, "01d");
        assert_eq!(snapshot.sunrise_epoch, Some(1_700_000_000));
        assert_eq!(snapshot.sunset_epoch, Some(1_700_040_000));
    }

    #[test]
    fn test_parse_without_sun_times() {
        let body = r#"{
            "weather": [{"id": 500, "main": "Rain", "description": "light rain", "icon": "10n"}],
            "main": {"temp": 4.5, "pressure": 990.5, "humidity": 93},
            "name": "Bergen",
            "sys": {"country": "NO"}
        }"#;

        let snapshot = parse_snapshot(body).expect("valid response");
        assert_eq!(snapshot.sunrise_epoch, None);
        assert_eq!(snapshot.sunset_epoch, None);
        assert_eq!(snapshot.pressure, 990.5);
    }

    #[test]
    fn test_parse_missing_field() {
        let body = r#"{"weather": [], "main": {"temp": 1.0}, "name": "X", "sys": {"country": "Y"}}"#;
        let err = parse_snapshot(body).unwrap_err();
        assert_eq!(err.kind, PipelineErrorKind::ParseFailed);
    }

    #[test]
    fn test_parse_empty_conditions() {
        let body = r#"{
            "weather": [],
            "main": {"temp": 1.0, "pressure": 1000, "humidity": 10},
            "name": "X",
            "sys": {"country": "Y"}
        }"#;
        let err = parse_snapshot(body).unwrap_err();
        assert_eq!(err.kind, PipelineErrorKind::ParseFailed);
        assert_eq!(err.message, "weather response has no conditions");
    }

    #[test]
    fn test_parse_not_json() {
        let err = parse_snapshot("<html>502 Bad Gateway</html>").unwrap_err();
        assert_eq!(err.kind, PipelineErrorKind::ParseFailed);
    }
}
