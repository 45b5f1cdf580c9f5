//! Weather fetching
//!
//! One request per coordinate change. Superseded fetches are aborted by the
//! task manager when possible; results that still slip through are dropped
//! by the reducer's generation check.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use skycast::Generation;
use tracing::warn;

use crate::action::Action;
use crate::error::PipelineError;
use crate::state::{Coordinates, WeatherSnapshot};

/// Source of current conditions
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current(&self, coords: Coordinates) -> Result<WeatherSnapshot, PipelineError>;
}

/// Turns weather requests into result actions.
#[derive(Clone)]
pub struct WeatherFetcher {
    provider: Arc<dyn WeatherProvider>,
}

impl WeatherFetcher {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self { provider }
    }

    /// Fetch conditions at `coords` for request `generation`.
    pub fn fetch(
        &self,
        generation: Generation,
        coords: Coordinates,
    ) -> impl Future<Output = Action> + Send + 'static {
        let provider = self.provider.clone();
        async move {
            match provider.current(coords).await {
                Ok(snapshot) => Action::WeatherDidLoad {
                    generation,
                    snapshot,
                },
                Err(error) => {
                    warn!(%generation, kind = %error.kind, message = %error.message, "weather fetch failed");
                    Action::WeatherDidFail { generation, error }
                }
            }
        }
    }
}
