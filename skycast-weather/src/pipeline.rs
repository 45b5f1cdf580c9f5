//! Pipeline orchestrator
//!
//! Owns the effect runtime and the three stages, publishes the view state on
//! a watch channel, and tears everything down when stopped:
//!
//! 1. Permission changes, position readings and weather results arrive as
//!    actions
//! 2. The reducer updates state and returns effects
//! 3. Effects become tasks (location, weather) or the permission subscription
//! 4. If state changed, the new view is published
//!
//! ```ignore
//! let pipeline = Pipeline::new(capabilities);
//! let handle = pipeline.handle();
//! let mut views = pipeline.subscribe();
//!
//! tokio::spawn(async move {
//!     while views.changed().await.is_ok() {
//!         println!("{:?}", views.borrow_and_update().status);
//!     }
//! });
//!
//! let last = pipeline.run().await; // until handle.stop()
//! ```

use std::sync::Arc;

use skycast::{EffectContext, EffectRuntime, EffectStoreWithMiddleware, LoggingMiddleware, TaskKey};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::action::Action;
use crate::effect::Effect;
use crate::location::{LocationAcquirer, LocationCapability};
use crate::permission::{PermissionCapability, PermissionMonitor, GEOLOCATION};
use crate::reducer::reducer;
use crate::state::{AppState, ViewState};
use crate::weather::{WeatherFetcher, WeatherProvider};

const LOCATION_TASK: &str = "location";
const WEATHER_TASK: &str = "weather";

type Store = EffectStoreWithMiddleware<AppState, Action, Effect, LoggingMiddleware>;
type Runtime = EffectRuntime<AppState, Action, Effect, Store>;

/// Host capabilities the pipeline runs against
#[derive(Clone)]
pub struct Capabilities {
    pub permission: Arc<dyn PermissionCapability>,
    pub location: Arc<dyn LocationCapability>,
    pub weather: Arc<dyn WeatherProvider>,
}

/// The three stages, driven by effects
struct Stages {
    monitor: PermissionMonitor,
    acquirer: LocationAcquirer,
    fetcher: WeatherFetcher,
}

impl Stages {
    fn handle(&self, effect: Effect, ctx: &mut EffectContext<Action>) {
        match effect {
            Effect::StartPermissionMonitor => {
                self.monitor.start(ctx.subscriptions());
            }
            Effect::StopPermissionMonitor => {
                self.monitor.stop(ctx.subscriptions());
            }
            Effect::AcquireLocation { generation } => {
                ctx.tasks()
                    .spawn(LOCATION_TASK, self.acquirer.acquire(generation));
            }
            Effect::FetchWeather { generation, coords } => {
                ctx.tasks()
                    .spawn(WEATHER_TASK, self.fetcher.fetch(generation, coords));
            }
            Effect::CancelRequests => {
                let tasks = ctx.tasks();
                tasks.cancel(&TaskKey::new(LOCATION_TASK));
                tasks.cancel(&TaskKey::new(WEATHER_TASK));
            }
        }
    }
}

/// Commands into a running pipeline
#[derive(Clone, Debug)]
pub struct PipelineHandle {
    action_tx: mpsc::UnboundedSender<Action>,
    shutdown: CancellationToken,
}

impl PipelineHandle {
    /// Read the position again and refetch weather for it if it moved.
    ///
    /// Returns `false` once the pipeline has stopped.
    pub fn refresh(&self) -> bool {
        if self.action_tx.send(Action::LocationRefresh).is_err() {
            debug!("pipeline gone, refresh dropped");
            return false;
        }
        true
    }

    /// End the session. [`Pipeline::run`] tears down and returns.
    pub fn stop(&self) {
        self.shutdown.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

/// Permission → location → weather, reconciled into one [`ViewState`]
pub struct Pipeline {
    runtime: Runtime,
    stages: Stages,
    view_tx: watch::Sender<ViewState>,
    shutdown: CancellationToken,
}

impl Pipeline {
    pub fn new(capabilities: Capabilities) -> Self {
        let store = EffectStoreWithMiddleware::new(
            AppState::default(),
            reducer,
            LoggingMiddleware::new(),
        );
        let (view_tx, _) = watch::channel(ViewState::default());

        Self {
            runtime: EffectRuntime::from_store(store),
            stages: Stages {
                monitor: PermissionMonitor::new(capabilities.permission, GEOLOCATION),
                acquirer: LocationAcquirer::new(capabilities.location),
                fetcher: WeatherFetcher::new(capabilities.weather),
            },
            view_tx,
            shutdown: CancellationToken::new(),
        }
    }

    /// Observe the view state. The receiver sees every published change.
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.view_tx.subscribe()
    }

    pub fn handle(&self) -> PipelineHandle {
        PipelineHandle {
            action_tx: self.runtime.action_tx(),
            shutdown: self.shutdown.clone(),
        }
    }

    /// Start the session and process actions until stopped.
    ///
    /// On stop the permission subscription and all requests are released,
    /// the view goes back to idle, and that final view is returned.
    pub async fn run(self) -> ViewState {
        let Pipeline {
            mut runtime,
            stages,
            view_tx,
            shutdown,
        } = self;

        info!("pipeline started");
        runtime.enqueue(Action::PipelineStart);
        runtime
            .run(
                &shutdown,
                |state: &AppState| publish(&view_tx, &state.view),
                |effect, ctx| stages.handle(effect, ctx),
            )
            .await;

        if runtime.dispatch(Action::PipelineStop, &mut |effect, ctx| {
            stages.handle(effect, ctx)
        }) {
            publish(&view_tx, &runtime.state().view);
        }
        runtime.shutdown();
        info!("pipeline stopped");

        runtime.state().view.clone()
    }
}

fn publish(view_tx: &watch::Sender<ViewState>, view: &ViewState) {
    let changed = view_tx.send_if_modified(|current| {
        if current == view {
            false
        } else {
            *current = view.clone();
            true
        }
    });
    if changed {
        debug!(status = %view.status, loading = view.loading, "view updated");
    }
}
