//! Pipeline actions
//!
//! Naming follows the two-phase convention:
//! - Intents end in a verb: `PipelineStart`, `LocationRefresh`
//! - Results carry `Did`: `LocationDidResolve`, `WeatherDidFail`
//!
//! Results of a request carry the [`Generation`] it was issued with, so the
//! reducer can tell a current answer from a superseded one.

use skycast::{ActionSummary, Generation};

use crate::error::PipelineError;
use crate::state::{Coordinates, PermissionState, WeatherSnapshot};

/// Application actions with automatic category inference
///
/// # Categories (auto-inferred from naming):
/// - `pipeline`: PipelineStart, PipelineStop
/// - `permission`: PermissionDidChange, PermissionDidFail
/// - `location`: LocationRefresh, LocationDidResolve, LocationDidFail
/// - `weather`: WeatherDidLoad, WeatherDidFail
#[derive(skycast::Action, Clone, Debug, PartialEq)]
#[action(infer_categories)]
pub enum Action {
    // ===== Pipeline category =====
    /// Intent: begin a session (query permission, then follow it)
    PipelineStart,

    /// Intent: end the session and release the permission subscription
    PipelineStop,

    // ===== Permission category =====
    /// Result: initial query answer or a later change notification
    PermissionDidChange(PermissionState),

    /// Result: the permission query itself failed
    PermissionDidFail(PipelineError),

    // ===== Location category =====
    /// Intent: read the position again while permission is granted
    LocationRefresh,

    /// Result: position reading for request `generation`
    LocationDidResolve {
        generation: Generation,
        coords: Coordinates,
    },

    /// Result: position request `generation` failed
    LocationDidFail {
        generation: Generation,
        error: PipelineError,
    },

    // ===== Weather category =====
    /// Result: snapshot for request `generation`
    WeatherDidLoad {
        generation: Generation,
        snapshot: WeatherSnapshot,
    },

    /// Result: weather request `generation` failed
    WeatherDidFail {
        generation: Generation,
        error: PipelineError,
    },
}

fn truncate(message: &str) -> String {
    if message.chars().count() > 40 {
        format!("{}...", message.chars().take(37).collect::<String>())
    } else {
        message.to_string()
    }
}

/// Concise summaries for the dispatch log
impl ActionSummary for Action {
    fn summary(&self) -> String {
        match self {
            Action::LocationDidResolve { generation, coords } => {
                format!("LocationDidResolve {{ {generation}, {coords} }}")
            }
            Action::WeatherDidLoad {
                generation,
                snapshot,
            } => format!(
                "WeatherDidLoad {{ {generation}, {}: {:.1}°C }}",
                snapshot.location_name, snapshot.temperature_celsius
            ),
            Action::LocationDidFail { generation, error }
            | Action::WeatherDidFail { generation, error } => format!(
                "{} {{ {generation}, {}: {:?} }}",
                skycast::Action::name(self),
                error.kind,
                truncate(&error.message)
            ),
            Action::PermissionDidFail(error) => {
                format!("PermissionDidFail({:?})", truncate(&error.message))
            }
            _ => format!("{:?}", self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skycast::GenerationTracker;

    #[test]
    fn test_categories() {
        assert_eq!(Action::PipelineStart.category(), Some("pipeline"));
        assert_eq!(
            Action::PermissionDidChange(PermissionState::Granted).category(),
            Some("permission")
        );
        assert_eq!(Action::LocationRefresh.category(), Some("location"));

        let generation = GenerationTracker::new().issue();
        let failed = Action::WeatherDidFail {
            generation,
            error: PipelineError::network("offline"),
        };
        assert!(failed.is_weather());
        assert_eq!(failed.category_enum(), ActionCategory::Weather);
    }

    #[test]
    fn test_summary_truncates_long_errors() {
        let generation = GenerationTracker::new().issue();
        let action = Action::LocationDidFail {
            generation,
            error: PipelineError::network("x".repeat(100)),
        };

        let summary = action.summary();
        assert!(summary.starts_with("LocationDidFail { #1, NetworkFailed: "));
        assert!(summary.contains("..."));
        assert!(summary.len() < 100);
    }

    #[test]
    fn test_summary_for_coordinates() {
        let generation = GenerationTracker::new().issue();
        let action = Action::LocationDidResolve {
            generation,
            coords: Coordinates::new(40.7, -74.0),
        };
        assert_eq!(
            action.summary(),
            "LocationDidResolve { #1, 40.7000, -74.0000 }"
        );
    }
}
