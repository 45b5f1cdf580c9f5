//! Effects - side effects declared by the reducer
//!
//! The reducer never talks to a capability. It returns these, and the
//! pipeline's effect handler turns them into tasks and subscriptions.

use skycast::Generation;

use crate::state::Coordinates;

/// Side effects that can be triggered by actions
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Query the permission and follow its changes
    StartPermissionMonitor,

    /// Release the permission change subscription
    StopPermissionMonitor,

    /// Request one position reading
    AcquireLocation { generation: Generation },

    /// Fetch current conditions at `coords`
    FetchWeather {
        generation: Generation,
        coords: Coordinates,
    },

    /// Abort outstanding location and weather requests
    CancelRequests,
}
