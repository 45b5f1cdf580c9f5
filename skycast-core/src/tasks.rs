//! Task manager for one-shot async requests
//!
//! Each task is registered under a [`TaskKey`]. Spawning under a key that is
//! already running supersedes the old task: its handle is aborted so it stops
//! at its next suspension point. A task that already finished may have queued
//! its action before the abort, so reducers still guard results with a
//! [`Generation`](crate::Generation).
//!
//! ```ignore
//! let (action_tx, mut action_rx) = tokio::sync::mpsc::unbounded_channel();
//! let mut tasks = TaskManager::new(action_tx);
//!
//! tasks.spawn("weather", async move {
//!     match fetcher.fetch(coords).await {
//!         Ok(snapshot) => Action::WeatherDidLoad { generation, snapshot },
//!         Err(error) => Action::WeatherDidFail { generation, error },
//!     }
//! });
//!
//! // session end
//! tasks.cancel_all();
//! ```

use std::collections::HashMap;
use std::future::Future;

use tokio::sync::mpsc;
use tokio::task::AbortHandle;

use crate::Action;

/// Identifies a task slot. At most one task runs per key.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct TaskKey(String);

impl TaskKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for TaskKey {
    fn from(s: &'static str) -> Self {
        Self::new(s)
    }
}

impl From<String> for TaskKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Spawns keyed tasks whose output action is sent back to the runtime.
pub struct TaskManager<A> {
    tasks: HashMap<TaskKey, AbortHandle>,
    action_tx: mpsc::UnboundedSender<A>,
}

impl<A> TaskManager<A>
where
    A: Action,
{
    pub fn new(action_tx: mpsc::UnboundedSender<A>) -> Self {
        Self {
            tasks: HashMap::new(),
            action_tx,
        }
    }

    /// Spawn `future` under `key`, superseding whatever ran there.
    ///
    /// The action the future resolves to is sent to the runtime. If the
    /// runtime is gone by then the action is dropped.
    pub fn spawn<F>(&mut self, key: impl Into<TaskKey>, future: F) -> &mut Self
    where
        F: Future<Output = A> + Send + 'static,
    {
        let key = key.into();
        self.cancel(&key);
        self.tasks.retain(|_, handle| !handle.is_finished());

        let tx = self.action_tx.clone();
        let task_name = key.name().to_owned();
        let handle = tokio::spawn(async move {
            let action = future.await;
            if tx.send(action).is_err() {
                tracing::debug!(task = %task_name, "runtime gone, dropping task result");
            }
        });

        self.tasks.insert(key, handle.abort_handle());
        self
    }

    /// Abort the task under `key`, if any.
    pub fn cancel(&mut self, key: &TaskKey) {
        if let Some(handle) = self.tasks.remove(key) {
            handle.abort();
        }
    }

    /// Abort every task. Used at session teardown.
    pub fn cancel_all(&mut self) {
        for (_, handle) in self.tasks.drain() {
            handle.abort();
        }
    }

    /// Whether a task under `key` exists and has not finished yet.
    pub fn is_running(&self, key: &TaskKey) -> bool {
        self.tasks
            .get(key)
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn running_keys(&self) -> impl Iterator<Item = &TaskKey> {
        self.tasks.keys()
    }
}

impl<A> Drop for TaskManager<A> {
    fn drop(&mut self) {
        for (_, handle) in self.tasks.drain() {
            handle.abort();
        }
    }
}
