//! Permission monitoring
//!
//! A [`PermissionCapability`] answers one query with the current state plus
//! a stream of later changes. [`PermissionMonitor`] turns that into a
//! subscription feeding `PermissionDidChange` actions to the runtime, so
//! changes made outside this session (system settings, another window) are
//! picked up too.

use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use skycast::{SubKey, Subscriptions};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, warn};

use crate::action::Action;
use crate::error::{PermissionQueryError, PipelineError};
use crate::state::PermissionState;

/// Name of the location permission
pub const GEOLOCATION: &str = "geolocation";

/// Change notifications following a query
pub type PermissionChanges = Pin<Box<dyn Stream<Item = PermissionState> + Send>>;

/// Answer to a permission query
pub struct PermissionStatus {
    /// State at query time
    pub state: PermissionState,
    /// Every later transition, until dropped
    pub changes: PermissionChanges,
}

/// Host gate controlling access to a named capability
#[async_trait]
pub trait PermissionCapability: Send + Sync {
    async fn query(&self, name: &str) -> Result<PermissionStatus, PermissionQueryError>;
}

/// Follows one permission for the lifetime of a session.
#[derive(Clone)]
pub struct PermissionMonitor {
    capability: Arc<dyn PermissionCapability>,
    name: String,
}

impl PermissionMonitor {
    pub fn new(capability: Arc<dyn PermissionCapability>, name: impl Into<String>) -> Self {
        Self {
            capability,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Subscription key; one subscription per monitored permission.
    pub fn key(&self) -> SubKey {
        SubKey::new(format!("permission:{}", self.name))
    }

    /// Query once, then forward every change as an action.
    ///
    /// Returns `false` without touching anything if this permission is
    /// already monitored.
    pub fn start(&self, subscriptions: &mut Subscriptions<Action>) -> bool {
        let key = self.key();
        if subscriptions.is_active(&key) {
            debug!(permission = %self.name, "already monitoring");
            return false;
        }

        subscriptions.stream_async(key, watch_permission(self.capability.clone(), self.name.clone()));
        true
    }

    /// Release the change subscription. Nothing is emitted afterwards.
    pub fn stop(&self, subscriptions: &mut Subscriptions<Action>) {
        subscriptions.cancel(&self.key());
    }
}

type ActionStream = Pin<Box<dyn Stream<Item = Action> + Send>>;

/// Initial state followed by changes, or a single failure.
async fn watch_permission(capability: Arc<dyn PermissionCapability>, name: String) -> ActionStream {
    match capability.query(&name).await {
        Ok(status) => {
            debug!(permission = %name, state = %status.state, "permission queried");
            Box::pin(
                tokio_stream::once(Action::PermissionDidChange(status.state))
                    .chain(status.changes.map(Action::PermissionDidChange)),
            )
        }
        Err(err) => {
            warn!(permission = %name, error = %err, "permission query failed");
            Box::pin(tokio_stream::once(Action::PermissionDidFail(
                PipelineError::from(err),
            )))
        }
    }
}

/// Permission capability driven by the host.
///
/// The host flips it with [`set`](Self::set). Every query observes the
/// current value and then each transition in order, none merged. Only
/// [`GEOLOCATION`] is known.
#[derive(Clone)]
pub struct HostPermission {
    shared: Arc<Mutex<Shared>>,
}

struct Shared {
    state: PermissionState,
    listeners: Vec<mpsc::UnboundedSender<PermissionState>>,
}

impl HostPermission {
    pub fn new(initial: PermissionState) -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                state: initial,
                listeners: Vec::new(),
            })),
        }
    }

    pub fn get(&self) -> PermissionState {
        self.shared.lock().state
    }

    /// Change the state. Setting the current value notifies nobody.
    pub fn set(&self, state: PermissionState) {
        let mut shared = self.shared.lock();
        if shared.state == state {
            return;
        }
        shared.state = state;
        shared.listeners.retain(|tx| tx.send(state).is_ok());
    }

    /// Number of live change subscriptions
    pub fn listeners(&self) -> usize {
        let mut shared = self.shared.lock();
        shared.listeners.retain(|tx| !tx.is_closed());
        shared.listeners.len()
    }
}

#[async_trait]
impl PermissionCapability for HostPermission {
    async fn query(&self, name: &str) -> Result<PermissionStatus, PermissionQueryError> {
        if name != GEOLOCATION {
            return Err(PermissionQueryError(format!(
                "unsupported permission: {name}"
            )));
        }

        // Read and register together so no transition falls in between
        let (tx, rx) = mpsc::unbounded_channel();
        let mut shared = self.shared.lock();
        shared.listeners.push(tx);
        Ok(PermissionStatus {
            state: shared.state,
            changes: Box::pin(UnboundedReceiverStream::new(rx)),
        })
    }
}
