//! Reducer - the pipeline state machine
//!
//! fn(state, action) -> DispatchResult<Effect>
//! - All state mutations happen here
//! - Requests are described as effects, never performed
//! - Every result action is checked against the generation it was issued
//!   with; superseded results leave the state untouched
//! - `loading` is recomputed after every action

use skycast::{DispatchResult, Generation};
use tracing::debug;

use crate::action::Action;
use crate::effect::Effect;
use crate::error::PipelineError;
use crate::state::{AppState, Coordinates, PermissionState, Status, ViewState, WeatherSnapshot};

/// The reducer handles all state transitions
pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    let result = match action {
        Action::PipelineStart => start(state),
        Action::PipelineStop => stop(state),
        Action::PermissionDidChange(permission) => permission_changed(state, permission),
        Action::PermissionDidFail(error) => permission_failed(state, error),
        Action::LocationRefresh => refresh_location(state),
        Action::LocationDidResolve { generation, coords } => {
            location_resolved(state, generation, coords)
        }
        Action::LocationDidFail { generation, error } => location_failed(state, generation, error),
        Action::WeatherDidLoad {
            generation,
            snapshot,
        } => weather_loaded(state, generation, snapshot),
        Action::WeatherDidFail { generation, error } => weather_failed(state, generation, error),
    };

    sync_loading(state, result)
}

fn sync_loading(state: &mut AppState, result: DispatchResult<Effect>) -> DispatchResult<Effect> {
    let loading = state.has_outstanding_request();
    if state.view.loading == loading {
        return result;
    }
    state.view.loading = loading;
    result.mark_changed()
}

/// Invalidate both request stages. Returns whether anything was in flight.
fn invalidate_requests(state: &mut AppState) -> bool {
    let location = state.location.invalidate();
    let weather = state.weather.invalidate();
    location.is_some() || weather.is_some()
}

fn start(state: &mut AppState) -> DispatchResult<Effect> {
    if state.view.status != Status::Idle {
        debug!(status = %state.view.status, "pipeline already started");
        return DispatchResult::unchanged();
    }

    state.view.status = Status::AwaitingPermission;
    state.view.error = None;
    state.permission_query_pending = true;
    DispatchResult::changed_with(Effect::StartPermissionMonitor)
}

fn stop(state: &mut AppState) -> DispatchResult<Effect> {
    if state.view.status == Status::Idle {
        return DispatchResult::unchanged();
    }

    let cancelled = invalidate_requests(state);
    // Trackers survive so a later session never reuses a generation
    state.view = ViewState::default();
    state.coordinates = None;
    state.permission_query_pending = false;

    let result = DispatchResult::changed_with(Effect::StopPermissionMonitor);
    if cancelled {
        result.with(Effect::CancelRequests)
    } else {
        result
    }
}

fn permission_changed(state: &mut AppState, permission: PermissionState) -> DispatchResult<Effect> {
    if state.view.status == Status::Idle {
        debug!(%permission, "ignoring permission change while idle");
        return DispatchResult::unchanged();
    }

    let previous = state.view.permission;
    let was_pending = std::mem::replace(&mut state.permission_query_pending, false);
    state.view.permission = permission;

    match (previous.is_granted(), permission.is_granted()) {
        (false, true) => {
            state.view.status = Status::AwaitingLocation;
            state.view.error = None;
            state.view.data = None;
            state.coordinates = None;
            state.weather.invalidate();

            let generation = state.location.issue();
            debug!(%generation, "permission granted, requesting position");
            DispatchResult::changed_with(Effect::AcquireLocation { generation })
        }
        (true, true) => DispatchResult {
            changed: was_pending,
            effects: Vec::new(),
        },
        (was_granted, false) => {
            let mut result = DispatchResult::unchanged();
            if was_granted {
                if invalidate_requests(state) {
                    result = result.with(Effect::CancelRequests);
                }
                state.coordinates = None;
                state.view.data = None;
                state.view.error = None;
                debug!(%permission, "permission revoked, pipeline reset");
            }

            let status = match permission {
                PermissionState::Denied => Status::Denied,
                _ => Status::AwaitingPermission,
            };
            let changed =
                was_granted || was_pending || previous != permission || state.view.status != status;
            state.view.status = status;

            if changed {
                result.mark_changed()
            } else {
                result
            }
        }
    }
}

fn permission_failed(state: &mut AppState, error: PipelineError) -> DispatchResult<Effect> {
    if state.view.status == Status::Idle {
        return DispatchResult::unchanged();
    }

    state.permission_query_pending = false;
    state.view.status = Status::Failed;
    state.view.error = Some(error);
    DispatchResult::changed()
}

fn refresh_location(state: &mut AppState) -> DispatchResult<Effect> {
    if state.view.status == Status::Idle || !state.view.permission.is_granted() {
        debug!(
            status = %state.view.status,
            permission = %state.view.permission,
            "refresh ignored without a granted permission"
        );
        return DispatchResult::unchanged();
    }

    // Data stays visible until the new position arrives
    if state.view.status == Status::Failed {
        state.view.status = Status::AwaitingLocation;
        state.view.error = None;
    }

    let generation = state.location.issue();
    DispatchResult::changed_with(Effect::AcquireLocation { generation })
}

fn location_resolved(
    state: &mut AppState,
    generation: Generation,
    coords: Coordinates,
) -> DispatchResult<Effect> {
    if !state.location.complete(generation) {
        debug!(stage = "location", %generation, "discarding stale result");
        return DispatchResult::unchanged();
    }

    // Same position: the shown or pending weather already covers it
    let covered = (state.view.status == Status::Ready && state.view.data.is_some())
        || state.weather.in_flight();
    if covered && state.coordinates == Some(coords) {
        debug!(%coords, "position unchanged, keeping weather");
        return DispatchResult::unchanged();
    }

    state.coordinates = Some(coords);
    state.view.status = Status::FetchingWeather;
    state.view.error = None;

    let generation = state.weather.issue();
    DispatchResult::changed_with(Effect::FetchWeather { generation, coords })
}

fn location_failed(
    state: &mut AppState,
    generation: Generation,
    error: PipelineError,
) -> DispatchResult<Effect> {
    if !state.location.complete(generation) {
        debug!(stage = "location", %generation, "discarding stale error");
        return DispatchResult::unchanged();
    }

    state.view.status = Status::Failed;
    state.view.data = None;
    state.view.error = Some(error);

    // A fetch for the previous position must not revive the view
    if state.weather.invalidate().is_some() {
        DispatchResult::changed_with(Effect::CancelRequests)
    } else {
        DispatchResult::changed()
    }
}

fn weather_loaded(
    state: &mut AppState,
    generation: Generation,
    snapshot: WeatherSnapshot,
) -> DispatchResult<Effect> {
    if !state.weather.complete(generation) {
        debug!(stage = "weather", %generation, "discarding stale result");
        return DispatchResult::unchanged();
    }

    state.view.data = Some(snapshot);
    state.view.error = None;
    state.view.status = Status::Ready;
    DispatchResult::changed()
}

fn weather_failed(
    state: &mut AppState,
    generation: Generation,
    error: PipelineError,
) -> DispatchResult<Effect> {
    if !state.weather.complete(generation) {
        debug!(stage = "weather", %generation, "discarding stale error");
        return DispatchResult::unchanged();
    }

    state.view.status = Status::Failed;
    state.view.data = None;
    state.view.error = Some(error);
    DispatchResult::changed()
}
