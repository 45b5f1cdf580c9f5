//! Text host: stdin commands in, one line per view change out

use std::str::FromStr;

use crate::state::{PermissionState, Status, TempUnit, ViewState};

/// A line typed by the user
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Set the host permission
    Permission(PermissionState),
    /// Read the position again
    Refresh,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "grant" | "granted" | "allow" => Ok(Command::Permission(PermissionState::Granted)),
            "deny" | "denied" | "revoke" => Ok(Command::Permission(PermissionState::Denied)),
            "prompt" | "reset" => Ok(Command::Permission(PermissionState::Prompt)),
            "refresh" | "r" => Ok(Command::Refresh),
            "quit" | "q" | "exit" => Ok(Command::Quit),
            other => Err(format!(
                "unknown command {other:?} (grant, deny, prompt, refresh, quit)"
            )),
        }
    }
}

/// One line describing `view`
pub fn render_view(view: &ViewState, unit: TempUnit) -> String {
    let line = match view.status {
        Status::Idle => "idle".to_string(),
        Status::AwaitingPermission => match view.permission {
            PermissionState::Prompt => {
                "location permission requested (type grant or deny)".to_string()
            }
            _ => "checking location permission".to_string(),
        },
        Status::Denied => "location permission denied (type grant to allow)".to_string(),
        Status::AwaitingLocation => "locating".to_string(),
        Status::FetchingWeather => match &view.data {
            Some(data) => format!("updating weather for {}", data.location_name),
            None => "fetching weather".to_string(),
        },
        Status::Ready => match &view.data {
            Some(data) => format!(
                "{}, {}: {}, {} ({}), humidity {:.0}%, pressure {:.0} hPa",
                data.location_name,
                data.country_code,
                unit.format(data.temperature_celsius),
                data.condition_main,
                data.condition_description,
                data.humidity_percent,
                data.pressure,
            ),
            None => "ready".to_string(),
        },
        Status::Failed => match &view.error {
            Some(error) => format!("error: {error}"),
            None => "failed".to_string(),
        },
    };

    if view.loading {
        format!("{line} ...")
    } else {
        line
    }
}
