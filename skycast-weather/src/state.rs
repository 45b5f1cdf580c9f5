//! Pipeline state - single source of truth
//!
//! [`AppState`] is owned by the store and only the reducer mutates it.
//! [`ViewState`] is the part presentation gets to see; everything else is
//! bookkeeping for in-flight requests.

use std::fmt;
use std::str::FromStr;

use skycast::GenerationTracker;

use crate::error::PipelineError;

/// Where the pipeline currently is
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Status {
    /// Not started, or torn down
    #[default]
    Idle,
    /// Waiting for the permission query or for the user to grant access
    AwaitingPermission,
    /// Permission denied; recovers on a later grant
    Denied,
    /// Permission granted, position requested
    AwaitingLocation,
    /// Coordinates known, weather requested
    FetchingWeather,
    /// Weather snapshot available
    Ready,
    /// A stage failed; recovers on a later grant or refresh
    Failed,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Idle => "idle",
            Status::AwaitingPermission => "awaiting_permission",
            Status::Denied => "denied",
            Status::AwaitingLocation => "awaiting_location",
            Status::FetchingWeather => "fetching_weather",
            Status::Ready => "ready",
            Status::Failed => "failed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of the location permission as reported by the host
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PermissionState {
    /// Nothing reported yet
    #[default]
    Unknown,
    Prompt,
    Granted,
    Denied,
}

impl PermissionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionState::Unknown => "unknown",
            PermissionState::Prompt => "prompt",
            PermissionState::Granted => "granted",
            PermissionState::Denied => "denied",
        }
    }

    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionState::Granted)
    }
}

impl fmt::Display for PermissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PermissionState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unknown" => Ok(PermissionState::Unknown),
            "prompt" => Ok(PermissionState::Prompt),
            "granted" => Ok(PermissionState::Granted),
            "denied" => Ok(PermissionState::Denied),
            other => Err(format!("unknown permission state: {other}")),
        }
    }
}

/// A single position reading
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Current conditions at one place. Replaced as a whole, never patched.
#[derive(Clone, Debug, PartialEq)]
pub struct WeatherSnapshot {
    pub location_name: String,
    pub country_code: String,
    pub temperature_celsius: f64,
    pub humidity_percent: f64,
    /// hPa
    pub pressure: f64,
    /// Provider condition code (e.g. 800 = clear)
    pub condition_id: u32,
    pub condition_main: String,
    pub condition_description: String,
    pub icon_ref: String,
    pub sunrise_epoch: Option<i64>,
    pub sunset_epoch: Option<i64>,
}

/// Everything presentation observes
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ViewState {
    pub status: Status,
    pub permission: PermissionState,
    pub data: Option<WeatherSnapshot>,
    pub error: Option<PipelineError>,
    /// True while some stage waits on an outstanding request
    pub loading: bool,
}

/// Store state: the view plus request bookkeeping
#[derive(Clone, Debug, Default)]
pub struct AppState {
    pub view: ViewState,

    /// Last resolved position of the current grant
    pub coordinates: Option<Coordinates>,

    /// Location requests
    pub location: GenerationTracker,

    /// Weather requests
    pub weather: GenerationTracker,

    /// The initial permission query has not answered yet
    pub permission_query_pending: bool,
}

impl AppState {
    /// Whether some stage has an outstanding request.
    ///
    /// A prompt counts as outstanding while the pipeline waits on it: the
    /// user is being asked.
    pub fn has_outstanding_request(&self) -> bool {
        self.permission_query_pending
            || (self.view.status == Status::AwaitingPermission
                && self.view.permission == PermissionState::Prompt)
            || self.location.in_flight()
            || self.weather.in_flight()
    }
}

/// Temperature unit preference for display
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TempUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TempUnit {
    pub fn toggle(&self) -> Self {
        match self {
            TempUnit::Celsius => TempUnit::Fahrenheit,
            TempUnit::Fahrenheit => TempUnit::Celsius,
        }
    }

    pub fn convert(&self, celsius: f64) -> f64 {
        match self {
            TempUnit::Celsius => celsius,
            TempUnit::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
        }
    }

    pub fn format(&self, celsius: f64) -> String {
        match self {
            TempUnit::Celsius => format!("{:.1}°C", self.convert(celsius)),
            TempUnit::Fahrenheit => format!("{:.1}°F", self.convert(celsius)),
        }
    }
}
