//! Command line and environment configuration

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use reqwest::Url;

use crate::api::{http_client, HttpWeatherProvider, IpLocator};
use crate::error::ConfigError;
use crate::location::{FixedLocation, LocationCapability};
use crate::permission::HostPermission;
use crate::pipeline::Capabilities;
use crate::state::{Coordinates, PermissionState, TempUnit};

/// Current weather for your location
#[derive(Parser, Debug, Clone)]
#[command(name = "weather-now")]
#[command(about = "Current weather for your live location")]
pub struct Args {
    /// Weather endpoint, queried as <URL>?lat=<lat>&lon=<lon>
    #[arg(long, env = "SKYCAST_WEATHER_URL")]
    pub weather_url: String,

    /// HTTP request timeout in seconds
    #[arg(long, env = "SKYCAST_TIMEOUT_SECS", default_value_t = 10)]
    pub timeout_secs: u64,

    /// Location permission at startup (change it later with grant/deny/prompt)
    #[arg(long, value_enum, default_value_t = InitialPermission::Prompt)]
    pub permission: InitialPermission,

    /// Fixed latitude instead of IP geolocation
    #[arg(long, allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Fixed longitude instead of IP geolocation
    #[arg(long, allow_hyphen_values = true)]
    pub lon: Option<f64>,

    /// IP geolocation endpoint, used without --lat/--lon
    #[arg(long, env = "SKYCAST_LOCATE_URL", default_value = "http://ip-api.com/json")]
    pub locate_url: String,

    /// Show temperatures in Fahrenheit
    #[arg(long)]
    pub fahrenheit: bool,
}

/// Permission states a user can start with
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum InitialPermission {
    Granted,
    Prompt,
    Denied,
}

impl From<InitialPermission> for PermissionState {
    fn from(value: InitialPermission) -> Self {
        match value {
            InitialPermission::Granted => PermissionState::Granted,
            InitialPermission::Prompt => PermissionState::Prompt,
            InitialPermission::Denied => PermissionState::Denied,
        }
    }
}

/// Where positions come from
#[derive(Clone, Debug, PartialEq)]
pub enum PositionSource {
    Fixed(Coordinates),
    Ip(Url),
}

/// Validated configuration
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub weather_url: Url,
    pub timeout: Duration,
    pub initial_permission: PermissionState,
    pub position: PositionSource,
    pub unit: TempUnit,
}

fn parse_url(name: &'static str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value).map_err(|e| ConfigError::InvalidUrl {
        name,
        value: value.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl {
            name,
            value: value.to_string(),
            reason: "scheme must be http or https".to_string(),
        });
    }
    Ok(url)
}

fn check_range(name: &'static str, value: f64, limit: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value.abs() <= limit {
        Ok(value)
    } else {
        Err(ConfigError::OutOfRange { name, value })
    }
}

impl Args {
    pub fn into_config(self) -> Result<PipelineConfig, ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        let position = match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => PositionSource::Fixed(Coordinates::new(
                check_range("latitude", lat, 90.0)?,
                check_range("longitude", lon, 180.0)?,
            )),
            (None, None) => PositionSource::Ip(parse_url("locate", &self.locate_url)?),
            _ => return Err(ConfigError::PartialPosition),
        };

        Ok(PipelineConfig {
            weather_url: parse_url("weather", &self.weather_url)?,
            timeout: Duration::from_secs(self.timeout_secs),
            initial_permission: self.permission.into(),
            position,
            unit: if self.fahrenheit {
                TempUnit::Fahrenheit
            } else {
                TempUnit::Celsius
            },
        })
    }
}

impl PipelineConfig {
    /// Build the host capabilities, with `permission` as the permission gate.
    pub fn capabilities(&self, permission: HostPermission) -> Result<Capabilities, ConfigError> {
        let client = http_client(self.timeout)?;

        let location: Arc<dyn LocationCapability> = match &self.position {
            PositionSource::Fixed(coords) => Arc::new(FixedLocation(*coords)),
            PositionSource::Ip(url) => Arc::new(IpLocator::new(client.clone(), url.clone())),
        };

        Ok(Capabilities {
            permission: Arc::new(permission),
            location,
            weather: Arc::new(HttpWeatherProvider::new(client, self.weather_url.clone())),
        })
    }
}
