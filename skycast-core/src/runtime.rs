//! Headless effect runtime.
//!
//! Owns the store, the action channel, the task manager and the
//! subscriptions, and runs the receive → dispatch → handle effects → notify
//! loop until a [`CancellationToken`] fires.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::effect::{DispatchResult, EffectReducer, EffectStore, EffectStoreWithMiddleware};
use crate::middleware::Middleware;
use crate::Action;

#[cfg(feature = "subscriptions")]
use crate::subscriptions::Subscriptions;
#[cfg(feature = "tasks")]
use crate::tasks::TaskManager;

/// Store interface used by [`EffectRuntime`].
pub trait EffectStoreLike<S, A: Action, E> {
    /// Dispatch an action and return state changes plus effects.
    fn dispatch(&mut self, action: A) -> DispatchResult<E>;
    /// Get the current state.
    fn state(&self) -> &S;
}

impl<S, A: Action, E> EffectStoreLike<S, A, E> for EffectStore<S, A, E> {
    fn dispatch(&mut self, action: A) -> DispatchResult<E> {
        EffectStore::dispatch(self, action)
    }

    fn state(&self) -> &S {
        EffectStore::state(self)
    }
}

impl<S, A: Action, E, M: Middleware<A>> EffectStoreLike<S, A, E>
    for EffectStoreWithMiddleware<S, A, E, M>
{
    fn dispatch(&mut self, action: A) -> DispatchResult<E> {
        EffectStoreWithMiddleware::dispatch(self, action)
    }

    fn state(&self) -> &S {
        EffectStoreWithMiddleware::state(self)
    }
}

/// Context passed to effect handlers.
pub struct EffectContext<'a, A: Action> {
    action_tx: &'a mpsc::UnboundedSender<A>,
    #[cfg(feature = "tasks")]
    tasks: &'a mut TaskManager<A>,
    #[cfg(feature = "subscriptions")]
    subscriptions: &'a mut Subscriptions<A>,
}

impl<'a, A: Action> EffectContext<'a, A> {
    /// Queue an action behind the ones already waiting.
    pub fn emit(&self, action: A) {
        let _ = self.action_tx.send(action);
    }

    pub fn action_tx(&self) -> &mpsc::UnboundedSender<A> {
        self.action_tx
    }

    #[cfg(feature = "tasks")]
    pub fn tasks(&mut self) -> &mut TaskManager<A> {
        self.tasks
    }

    #[cfg(feature = "subscriptions")]
    pub fn subscriptions(&mut self) -> &mut Subscriptions<A> {
        self.subscriptions
    }
}

/// Runtime for effect-based stores without a terminal attached.
///
/// Actions arrive from the host (via [`enqueue`](Self::enqueue) or a cloned
/// [`action_tx`](Self::action_tx)), from finished tasks and from
/// subscriptions, and are processed strictly one at a time in arrival order.
pub struct EffectRuntime<S, A: Action, E, St: EffectStoreLike<S, A, E> = EffectStore<S, A, E>> {
    store: St,
    action_tx: mpsc::UnboundedSender<A>,
    action_rx: mpsc::UnboundedReceiver<A>,
    #[cfg(feature = "tasks")]
    tasks: TaskManager<A>,
    #[cfg(feature = "subscriptions")]
    subscriptions: Subscriptions<A>,
    _state: std::marker::PhantomData<S>,
    _effect: std::marker::PhantomData<E>,
}

impl<S: 'static, A: Action, E> EffectRuntime<S, A, E, EffectStore<S, A, E>> {
    /// Create a runtime from state + effect reducer.
    pub fn new(state: S, reducer: EffectReducer<S, A, E>) -> Self {
        Self::from_store(EffectStore::new(state, reducer))
    }
}

impl<S: 'static, A: Action, E, St: EffectStoreLike<S, A, E>> EffectRuntime<S, A, E, St> {
    /// Create a runtime from an existing effect store.
    pub fn from_store(store: St) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        #[cfg(feature = "tasks")]
        let tasks = TaskManager::new(action_tx.clone());
        #[cfg(feature = "subscriptions")]
        let subscriptions = Subscriptions::new(action_tx.clone());

        Self {
            store,
            action_tx,
            action_rx,
            #[cfg(feature = "tasks")]
            tasks,
            #[cfg(feature = "subscriptions")]
            subscriptions,
            _state: std::marker::PhantomData,
            _effect: std::marker::PhantomData,
        }
    }

    /// Send an action into the runtime queue.
    pub fn enqueue(&self, action: A) {
        let _ = self.action_tx.send(action);
    }

    /// Clone the action sender.
    pub fn action_tx(&self) -> mpsc::UnboundedSender<A> {
        self.action_tx.clone()
    }

    pub fn state(&self) -> &S {
        self.store.state()
    }

    #[cfg(feature = "tasks")]
    pub fn tasks(&mut self) -> &mut TaskManager<A> {
        &mut self.tasks
    }

    #[cfg(feature = "subscriptions")]
    pub fn subscriptions(&mut self) -> &mut Subscriptions<A> {
        &mut self.subscriptions
    }

    #[cfg(all(feature = "tasks", feature = "subscriptions"))]
    fn effect_context(&mut self) -> EffectContext<'_, A> {
        EffectContext {
            action_tx: &self.action_tx,
            tasks: &mut self.tasks,
            subscriptions: &mut self.subscriptions,
        }
    }

    #[cfg(all(feature = "tasks", not(feature = "subscriptions")))]
    fn effect_context(&mut self) -> EffectContext<'_, A> {
        EffectContext {
            action_tx: &self.action_tx,
            tasks: &mut self.tasks,
        }
    }

    #[cfg(all(not(feature = "tasks"), feature = "subscriptions"))]
    fn effect_context(&mut self) -> EffectContext<'_, A> {
        EffectContext {
            action_tx: &self.action_tx,
            subscriptions: &mut self.subscriptions,
        }
    }

    #[cfg(all(not(feature = "tasks"), not(feature = "subscriptions")))]
    fn effect_context(&mut self) -> EffectContext<'_, A> {
        EffectContext {
            action_tx: &self.action_tx,
        }
    }

    /// Dispatch one action immediately and run its effects.
    ///
    /// Returns whether the state changed.
    pub fn dispatch<FEffect>(&mut self, action: A, handle_effect: &mut FEffect) -> bool
    where
        FEffect: FnMut(E, &mut EffectContext<A>),
    {
        let result = self.store.dispatch(action);
        if result.has_effects() {
            let mut ctx = self.effect_context();
            for effect in result.effects {
                handle_effect(effect, &mut ctx);
            }
        }
        result.changed
    }

    /// Process actions until `shutdown` is cancelled.
    ///
    /// `observe` is called with the new state after every dispatch that
    /// changed it. Actions still queued when `shutdown` fires are not
    /// processed.
    pub async fn run<FObserve, FEffect>(
        &mut self,
        shutdown: &CancellationToken,
        mut observe: FObserve,
        mut handle_effect: FEffect,
    ) where
        FObserve: FnMut(&S),
        FEffect: FnMut(E, &mut EffectContext<A>),
    {
        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => break,

                Some(action) = self.action_rx.recv() => {
                    if self.dispatch(action, &mut handle_effect) {
                        observe(self.store.state());
                    }
                }
            }
        }
    }

    /// Release every subscription and task and discard queued actions.
    ///
    /// Nothing that resolves afterwards can reach the store.
    pub fn shutdown(&mut self) {
        #[cfg(feature = "subscriptions")]
        self.subscriptions.cancel_all();
        #[cfg(feature = "tasks")]
        self.tasks.cancel_all();

        let mut dropped = 0usize;
        while self.action_rx.try_recv().is_ok() {
            dropped += 1;
        }
        if dropped > 0 {
            tracing::debug!(dropped, "discarded queued actions at shutdown");
        }
    }
}

#[cfg(all(test, feature = "tasks", feature = "subscriptions"))]
mod tests {
    use super::*;
    use std::time::Duration;

    #[derive(Clone, Debug, PartialEq)]
    enum Step {
        Begin,
        DidFinish(u32),
    }

    impl Action for Step {
        fn name(&self) -> &'static str {
            match self {
                Step::Begin => "Begin",
                Step::DidFinish(_) => "DidFinish",
            }
        }
    }

    #[derive(Debug)]
    enum Work {
        Compute(u32),
    }

    #[derive(Default, Debug)]
    struct Tally {
        started: u32,
        results: Vec<u32>,
    }

    fn tally_reducer(state: &mut Tally, action: Step) -> DispatchResult<Work> {
        match action {
            Step::Begin => {
                state.started += 1;
                DispatchResult::changed_with(Work::Compute(state.started))
            }
            Step::DidFinish(n) => {
                state.results.push(n);
                DispatchResult::changed()
            }
        }
    }

    fn spawn_work(effect: Work, ctx: &mut EffectContext<Step>) {
        match effect {
            Work::Compute(n) => {
                ctx.tasks().spawn("compute", async move { Step::DidFinish(n * 10) });
            }
        }
    }

    #[tokio::test]
    async fn test_run_processes_effect_results() {
        let mut runtime = EffectRuntime::new(Tally::default(), tally_reducer);
        let shutdown = CancellationToken::new();
        runtime.enqueue(Step::Begin);

        let stop = shutdown.clone();
        let mut seen = Vec::new();
        runtime
            .run(
                &shutdown,
                |state: &Tally| {
                    seen.push(state.results.len());
                    if !state.results.is_empty() {
                        stop.cancel();
                    }
                },
                spawn_work,
            )
            .await;

        assert_eq!(runtime.state().results, vec![10]);
        assert_eq!(seen, vec![0, 1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_discards_late_results() {
        fn delayed_work(effect: Work, ctx: &mut EffectContext<Step>) {
            match effect {
                Work::Compute(n) => {
                    ctx.tasks().spawn("compute", async move {
                        tokio::time::sleep(Duration::from_secs(1)).await;
                        Step::DidFinish(n)
                    });
                }
            }
        }

        let mut runtime = EffectRuntime::new(Tally::default(), tally_reducer);
        let mut handler = delayed_work;

        assert!(runtime.dispatch(Step::Begin, &mut handler));
        runtime.enqueue(Step::DidFinish(99));
        runtime.shutdown();

        tokio::time::sleep(Duration::from_secs(2)).await;

        let shutdown = CancellationToken::new();
        shutdown.cancel();
        runtime.run(&shutdown, |_: &Tally| {}, handler).await;
        assert!(runtime.state().results.is_empty());
        assert!(runtime.tasks().is_empty());
    }
}
