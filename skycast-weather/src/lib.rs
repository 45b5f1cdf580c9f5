//! Current weather for the live location
//!
//! Three gated stages reconciled by one reducer:
//!
//! - [`permission`]: query the location permission and follow its changes
//! - [`location`]: one position reading per grant or refresh
//! - [`weather`]: one fetch per position
//! - [`pipeline`]: runs them and publishes a single [`ViewState`]
//!
//! Results carry the generation of the request that produced them; the
//! [`reducer`](reducer::reducer) drops any that were superseded, so a revoked
//! permission or a newer position always wins.

pub mod action;
pub mod api;
pub mod config;
pub mod effect;
pub mod error;
pub mod host;
pub mod location;
pub mod permission;
pub mod pipeline;
pub mod reducer;
pub mod state;
pub mod weather;

pub use action::Action;
pub use effect::Effect;
pub use error::{
    ConfigError, GeolocationError, GeolocationErrorCode, PermissionQueryError, PipelineError,
    PipelineErrorKind,
};
pub use pipeline::{Capabilities, Pipeline, PipelineHandle};
pub use state::{AppState, Coordinates, PermissionState, Status, ViewState, WeatherSnapshot};
