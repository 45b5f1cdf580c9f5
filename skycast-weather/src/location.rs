//! One-shot position acquisition
//!
//! The reducer asks for a position once per grant (or per refresh). Each
//! request carries its generation, which comes back on the result action.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use skycast::Generation;
use tracing::warn;

use crate::action::Action;
use crate::error::GeolocationError;
use crate::state::Coordinates;

/// Host source of position readings
#[async_trait]
pub trait LocationCapability: Send + Sync {
    /// One reading. No retries.
    async fn request_position(&self) -> Result<Coordinates, GeolocationError>;
}

/// Turns location requests into result actions.
#[derive(Clone)]
pub struct LocationAcquirer {
    capability: Arc<dyn LocationCapability>,
}

impl LocationAcquirer {
    pub fn new(capability: Arc<dyn LocationCapability>) -> Self {
        Self { capability }
    }

    /// Request a position for `generation`.
    ///
    /// The returned future always resolves to `LocationDidResolve` or
    /// `LocationDidFail` tagged with `generation`.
    pub fn acquire(&self, generation: Generation) -> impl Future<Output = Action> + Send + 'static {
        let capability = self.capability.clone();
        async move {
            match capability.request_position().await {
                Ok(coords) => Action::LocationDidResolve { generation, coords },
                Err(err) => {
                    warn!(%generation, code = %err.code, message = %err.message, "position unavailable");
                    Action::LocationDidFail {
                        generation,
                        error: err.into(),
                    }
                }
            }
        }
    }
}

/// A position that never changes
#[derive(Clone, Copy, Debug)]
pub struct FixedLocation(pub Coordinates);

#[async_trait]
impl LocationCapability for FixedLocation {
    async fn request_position(&self) -> Result<Coordinates, GeolocationError> {
        Ok(self.0)
    }
}
