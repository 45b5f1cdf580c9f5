//! Effect-based state management
//!
//! Reducers in skycast never perform I/O. Instead they describe the work they
//! want done as effects, returned next to the "state changed" flag:
//!
//! ```ignore
//! fn reducer(state: &mut S, action: A) -> DispatchResult<E>
//! ```
//!
//! The runtime hands each effect to an effect handler, which spawns tasks or
//! subscriptions. Their results come back as new actions.
//!
//! # Example
//!
//! ```ignore
//! use skycast::{Action, DispatchResult, EffectStore};
//!
//! enum Effect {
//!     RequestPosition { generation: Generation },
//! }
//!
//! fn reducer(state: &mut State, action: PipelineAction) -> DispatchResult<Effect> {
//!     match action {
//!         PipelineAction::PermissionDidChange(Permission::Granted) => {
//!             let generation = state.location.issue();
//!             DispatchResult::changed_with(Effect::RequestPosition { generation })
//!         }
//!         _ => DispatchResult::unchanged(),
//!     }
//! }
//!
//! let mut store = EffectStore::new(State::default(), reducer);
//! let result = store.dispatch(PipelineAction::PermissionDidChange(Permission::Granted));
//! for effect in result.effects {
//!     // spawn the request
//! }
//! ```

use std::marker::PhantomData;

use crate::action::Action;
use crate::middleware::Middleware;

/// Outcome of a single dispatch: whether state changed, plus the effects
/// the reducer asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchResult<E> {
    /// Whether the state was modified by this action.
    pub changed: bool,
    /// Effects to be processed after dispatch, in order.
    pub effects: Vec<E>,
}

impl<E> Default for DispatchResult<E> {
    fn default() -> Self {
        Self::unchanged()
    }
}

impl<E> DispatchResult<E> {
    /// No state change, no effects.
    #[inline]
    pub fn unchanged() -> Self {
        Self {
            changed: false,
            effects: Vec::new(),
        }
    }

    /// State changed, no effects.
    #[inline]
    pub fn changed() -> Self {
        Self {
            changed: true,
            effects: Vec::new(),
        }
    }

    /// A single effect without a state change.
    #[inline]
    pub fn effect(effect: E) -> Self {
        Self {
            changed: false,
            effects: vec![effect],
        }
    }

    /// Several effects without a state change.
    #[inline]
    pub fn effects(effects: Vec<E>) -> Self {
        Self {
            changed: false,
            effects,
        }
    }

    /// State changed and a single effect.
    #[inline]
    pub fn changed_with(effect: E) -> Self {
        Self {
            changed: true,
            effects: vec![effect],
        }
    }

    /// State changed and several effects.
    #[inline]
    pub fn changed_with_many(effects: Vec<E>) -> Self {
        Self {
            changed: true,
            effects,
        }
    }

    /// Append an effect.
    #[inline]
    pub fn with(mut self, effect: E) -> Self {
        self.effects.push(effect);
        self
    }

    /// Force the changed flag on.
    #[inline]
    pub fn mark_changed(mut self) -> Self {
        self.changed = true;
        self
    }

    #[inline]
    pub fn has_effects(&self) -> bool {
        !self.effects.is_empty()
    }
}

/// A reducer that can emit effects.
pub type EffectReducer<S, A, E> = fn(&mut S, A) -> DispatchResult<E>;

/// Owns the state and the reducer; the only place state is mutated.
pub struct EffectStore<S, A, E> {
    state: S,
    reducer: EffectReducer<S, A, E>,
    _marker: PhantomData<(A, E)>,
}

impl<S, A, E> EffectStore<S, A, E>
where
    A: Action,
{
    pub fn new(state: S, reducer: EffectReducer<S, A, E>) -> Self {
        Self {
            state,
            reducer,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Mutable access to the state, bypassing the reducer.
    ///
    /// Intended for test setup. Production code dispatches actions.
    #[inline]
    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }

    /// Run the reducer for one action.
    #[inline]
    pub fn dispatch(&mut self, action: A) -> DispatchResult<E> {
        (self.reducer)(&mut self.state, action)
    }
}

/// An [`EffectStore`] whose dispatches are wrapped by a [`Middleware`].
///
/// The middleware sees the action and the change flag, not the effects.
pub struct EffectStoreWithMiddleware<S, A, E, M>
where
    A: Action,
    M: Middleware<A>,
{
    store: EffectStore<S, A, E>,
    middleware: M,
}

impl<S, A, E, M> EffectStoreWithMiddleware<S, A, E, M>
where
    A: Action,
    M: Middleware<A>,
{
    pub fn new(state: S, reducer: EffectReducer<S, A, E>, middleware: M) -> Self {
        Self {
            store: EffectStore::new(state, reducer),
            middleware,
        }
    }

    #[inline]
    pub fn state(&self) -> &S {
        self.store.state()
    }

    #[inline]
    pub fn state_mut(&mut self) -> &mut S {
        self.store.state_mut()
    }

    #[inline]
    pub fn middleware(&self) -> &M {
        &self.middleware
    }

    #[inline]
    pub fn middleware_mut(&mut self) -> &mut M {
        &mut self.middleware
    }

    /// `before` hook, reducer, then `after` hook with the change flag.
    pub fn dispatch(&mut self, action: A) -> DispatchResult<E> {
        self.middleware.before(&action);
        let result = self.store.dispatch(action.clone());
        self.middleware.after(&action, result.changed);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug)]
    enum ProbeAction {
        Request,
        DidRespond(u32),
        Ignore,
    }

    impl Action for ProbeAction {
        fn name(&self) -> &'static str {
            match self {
                ProbeAction::Request => "Request",
                ProbeAction::DidRespond(_) => "DidRespond",
                ProbeAction::Ignore => "Ignore",
            }
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum ProbeEffect {
        Send { attempt: u32 },
        Trace(&'static str),
    }

    #[derive(Default)]
    struct ProbeState {
        attempts: u32,
        last_response: Option<u32>,
    }

    fn probe_reducer(state: &mut ProbeState, action: ProbeAction) -> DispatchResult<ProbeEffect> {
        match action {
            ProbeAction::Request => {
                state.attempts += 1;
                DispatchResult::changed_with(ProbeEffect::Send {
                    attempt: state.attempts,
                })
                .with(ProbeEffect::Trace("request"))
            }
            ProbeAction::DidRespond(value) => {
                state.last_response = Some(value);
                DispatchResult::changed()
            }
            ProbeAction::Ignore => DispatchResult::unchanged(),
        }
    }

    #[test]
    fn test_dispatch_result_builders() {
        let r: DispatchResult<ProbeEffect> = DispatchResult::unchanged();
        assert!(!r.changed);
        assert!(!r.has_effects());

        let r: DispatchResult<ProbeEffect> = DispatchResult::changed();
        assert!(r.changed);
        assert!(r.effects.is_empty());

        let r = DispatchResult::effect(ProbeEffect::Trace("x"));
        assert!(!r.changed);
        assert!(r.has_effects());

        let r = DispatchResult::changed_with_many(vec![
            ProbeEffect::Trace("a"),
            ProbeEffect::Send { attempt: 1 },
        ]);
        assert!(r.changed);
        assert_eq!(r.effects.len(), 2);

        let r: DispatchResult<ProbeEffect> =
            DispatchResult::effects(vec![ProbeEffect::Trace("b")]).mark_changed();
        assert!(r.changed);
        assert_eq!(r.effects, vec![ProbeEffect::Trace("b")]);
    }

    #[test]
    fn test_effects_keep_reducer_order() {
        let mut store = EffectStore::new(ProbeState::default(), probe_reducer);

        let result = store.dispatch(ProbeAction::Request);
        assert_eq!(
            result.effects,
            vec![ProbeEffect::Send { attempt: 1 }, ProbeEffect::Trace("request")]
        );

        let result = store.dispatch(ProbeAction::Request);
        assert_eq!(result.effects[0], ProbeEffect::Send { attempt: 2 });
        assert_eq!(store.state().attempts, 2);
    }

    #[test]
    fn test_unchanged_dispatch_leaves_state() {
        let mut store = EffectStore::new(ProbeState::default(), probe_reducer);

        let result = store.dispatch(ProbeAction::Ignore);
        assert!(!result.changed);
        assert_eq!(store.state().attempts, 0);

        store.dispatch(ProbeAction::DidRespond(7));
        assert_eq!(store.state().last_response, Some(7));
    }

    #[derive(Default)]
    struct Recorder {
        seen: Vec<(&'static str, bool)>,
    }

    impl Middleware<ProbeAction> for Recorder {
        fn before(&mut self, _action: &ProbeAction) {}

        fn after(&mut self, action: &ProbeAction, state_changed: bool) {
            self.seen.push((action.name(), state_changed));
        }
    }

    #[test]
    fn test_middleware_sees_change_flag() {
        let mut store = EffectStoreWithMiddleware::new(
            ProbeState::default(),
            probe_reducer,
            Recorder::default(),
        );

        let result = store.dispatch(ProbeAction::Request);
        assert!(result.has_effects());
        store.dispatch(ProbeAction::Ignore);

        assert_eq!(
            store.middleware().seen,
            vec![("Request", true), ("Ignore", false)]
        );
    }
}
