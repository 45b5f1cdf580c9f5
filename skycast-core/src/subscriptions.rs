//! Long-lived action sources
//!
//! A subscription forwards every item of a stream into the runtime as an
//! action, until the stream ends, the subscription is cancelled, or the
//! runtime goes away. Cancelling aborts the forwarding task, which drops the
//! stream and whatever host listener it holds.
//!
//! ```ignore
//! let (action_tx, mut action_rx) = tokio::sync::mpsc::unbounded_channel();
//! let mut subs = Subscriptions::new(action_tx);
//!
//! // Query first, then forward change notifications
//! subs.stream_async("permission:geolocation", monitor.watch());
//!
//! // Session end
//! subs.cancel_all();
//! ```

use std::collections::HashMap;
use std::future::Future;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::{Stream, StreamExt};

use crate::Action;

/// Identifies a subscription. At most one subscription is active per key.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct SubKey(String);

impl SubKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for SubKey {
    fn from(s: &'static str) -> Self {
        Self::new(s)
    }
}

impl From<String> for SubKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Registry of active subscriptions feeding one action channel.
pub struct Subscriptions<A> {
    handles: HashMap<SubKey, JoinHandle<()>>,
    action_tx: mpsc::UnboundedSender<A>,
}

impl<A> Subscriptions<A>
where
    A: Action,
{
    pub fn new(action_tx: mpsc::UnboundedSender<A>) -> Self {
        Self {
            handles: HashMap::new(),
            action_tx,
        }
    }

    /// Forward `stream` under `key`, replacing any subscription there.
    pub fn stream<S>(&mut self, key: impl Into<SubKey>, stream: S) -> &mut Self
    where
        S: Stream<Item = A> + Send + 'static,
    {
        self.stream_async(key, async move { stream })
    }

    /// Await `stream_fn` for the stream, then forward it under `key`.
    ///
    /// For sources whose stream only exists after an async setup step, like
    /// a permission query that must resolve before change notifications can
    /// be observed. Replaces any subscription under `key`.
    pub fn stream_async<F, S>(&mut self, key: impl Into<SubKey>, stream_fn: F) -> &mut Self
    where
        F: Future<Output = S> + Send + 'static,
        S: Stream<Item = A> + Send + 'static,
    {
        let key = key.into();
        self.cancel(&key);

        let tx = self.action_tx.clone();
        let name = key.name().to_owned();
        let handle = tokio::spawn(async move {
            let stream = stream_fn.await;
            tokio::pin!(stream);
            while let Some(action) = stream.next().await {
                if tx.send(action).is_err() {
                    tracing::debug!(subscription = %name, "runtime gone, closing subscription");
                    return;
                }
            }
            tracing::debug!(subscription = %name, "source stream ended");
        });

        self.handles.insert(key, handle);
        self
    }

    /// Cancel the subscription under `key`, if any.
    pub fn cancel(&mut self, key: &SubKey) {
        if let Some(handle) = self.handles.remove(key) {
            handle.abort();
        }
    }

    pub fn cancel_all(&mut self) {
        for (_, handle) in self.handles.drain() {
            handle.abort();
        }
    }

    /// Whether a subscription is registered under `key`.
    ///
    /// A subscription whose source stream ended stays registered until it is
    /// cancelled or replaced.
    pub fn is_active(&self, key: &SubKey) -> bool {
        self.handles.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn active_keys(&self) -> impl Iterator<Item = &SubKey> {
        self.handles.keys()
    }
}

impl<A> Drop for Subscriptions<A> {
    fn drop(&mut self) {
        for (_, handle) in self.handles.drain() {
            handle.abort();
        }
    }
}
