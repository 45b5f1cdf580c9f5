//! Test utilities for skycast reducers
//!
//! - [`EffectHarness`]: drives an effect reducer directly, records every
//!   effect it emits, and offers an action channel for fakes that want to
//!   send results back
//! - Assertion macros for action and effect lists
//!
//! ```ignore
//! use skycast::testing::EffectHarness;
//!
//! let mut harness = EffectHarness::new(AppState::default(), reducer);
//! harness.dispatch(Action::PipelineStart);
//! harness.dispatch(Action::PermissionDidChange(PermissionState::Granted));
//!
//! let effects = harness.drain_effects();
//! assert_emitted!(effects, Effect::AcquireLocation { .. });
//! ```

use tokio::sync::mpsc;

use crate::effect::{DispatchResult, EffectReducer, EffectStore};
use crate::{Action, ActionCategory};

/// Runs a reducer synchronously and records what it asks for.
pub struct EffectHarness<S, A: Action, E> {
    store: EffectStore<S, A, E>,
    effects: Vec<E>,
    tx: mpsc::UnboundedSender<A>,
    rx: mpsc::UnboundedReceiver<A>,
}

impl<S, A: Action, E: Clone> EffectHarness<S, A, E> {
    pub fn new(state: S, reducer: EffectReducer<S, A, E>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            store: EffectStore::new(state, reducer),
            effects: Vec::new(),
            tx,
            rx,
        }
    }

    pub fn state(&self) -> &S {
        self.store.state()
    }

    pub fn state_mut(&mut self) -> &mut S {
        self.store.state_mut()
    }

    /// Dispatch one action, recording its effects.
    pub fn dispatch(&mut self, action: A) -> DispatchResult<E> {
        let result = self.store.dispatch(action);
        self.effects.extend(result.effects.iter().cloned());
        result
    }

    /// Dispatch several actions in order. Returns whether any changed state.
    pub fn dispatch_all(&mut self, actions: impl IntoIterator<Item = A>) -> bool {
        actions
            .into_iter()
            .fold(false, |changed, action| self.dispatch(action).changed || changed)
    }

    /// Take all effects recorded so far.
    pub fn drain_effects(&mut self) -> Vec<E> {
        std::mem::take(&mut self.effects)
    }

    /// Sender for fakes that emit actions.
    pub fn sender(&self) -> mpsc::UnboundedSender<A> {
        self.tx.clone()
    }

    /// Queue an action without dispatching it.
    pub fn emit(&self, action: A) {
        let _ = self.tx.send(action);
    }

    /// Take every queued action without dispatching.
    pub fn drain_emitted(&mut self) -> Vec<A> {
        let mut actions = Vec::new();
        while let Ok(action) = self.rx.try_recv() {
            actions.push(action);
        }
        actions
    }

    /// Dispatch every queued action in arrival order.
    pub fn process_emitted(&mut self) -> usize {
        let actions = self.drain_emitted();
        let count = actions.len();
        for action in actions {
            self.dispatch(action);
        }
        count
    }
}

impl<S, A: ActionCategory, E: Clone> EffectHarness<S, A, E> {
    /// Drain queued actions of one category, leaving the others queued.
    pub fn drain_category(&mut self, category: &str) -> Vec<A> {
        let (matching, rest): (Vec<A>, Vec<A>) = self
            .drain_emitted()
            .into_iter()
            .partition(|action| action.category() == Some(category));

        for action in rest {
            let _ = self.tx.send(action);
        }
        matching
    }
}

/// Assert that an item matching the pattern is in the list.
///
/// ```ignore
/// let effects = harness.drain_effects();
/// assert_emitted!(effects, Effect::FetchWeather { .. });
/// ```
#[macro_export]
macro_rules! assert_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            $actions.iter().any(|a| matches!(a, $pattern $(if $guard)?)),
            "Expected item matching `{}`, but got: {:?}",
            stringify!($pattern),
            $actions
        );
    };
}

/// Assert that no item matching the pattern is in the list.
#[macro_export]
macro_rules! assert_not_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            !$actions.iter().any(|a| matches!(a, $pattern $(if $guard)?)),
            "Expected no item matching `{}`, but got: {:?}",
            stringify!($pattern),
            $actions
        );
    };
}

/// First item matching the pattern.
#[macro_export]
macro_rules! find_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        $actions.iter().find(|a| matches!(a, $pattern $(if $guard)?))
    };
}

/// Number of items matching the pattern.
#[macro_export]
macro_rules! count_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        $actions.iter().filter(|a| matches!(a, $pattern $(if $guard)?)).count()
    };
}

/// Assert that an action of the given category is in the list.
#[macro_export]
macro_rules! assert_category_emitted {
    ($actions:expr, $category:expr) => {
        assert!(
            $actions.iter().any(|a| {
                use $crate::ActionCategory;
                a.category() == Some($category)
            }),
            "Expected action with category `{}`, but got: {:?}",
            $category,
            $actions
        );
    };
}

/// Assert that no action of the given category is in the list.
#[macro_export]
macro_rules! assert_category_not_emitted {
    ($actions:expr, $category:expr) => {
        assert!(
            !$actions.iter().any(|a| {
                use $crate::ActionCategory;
                a.category() == Some($category)
            }),
            "Expected no action with category `{}`, but got: {:?}",
            $category,
            $actions
        );
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    enum Knob {
        Turn(i32),
        DidSettle,
    }

    impl Action for Knob {
        fn name(&self) -> &'static str {
            match self {
                Knob::Turn(_) => "Turn",
                Knob::DidSettle => "DidSettle",
            }
        }
    }

    impl ActionCategory for Knob {
        type Category = Option<&'static str>;

        fn category(&self) -> Option<&'static str> {
            match self {
                Knob::Turn(_) => Some("knob"),
                Knob::DidSettle => None,
            }
        }

        fn category_enum(&self) -> Self::Category {
            ActionCategory::category(self)
        }
    }

    #[derive(Clone, Debug, PartialEq)]
    enum Motor {
        Step(i32),
    }

    fn knob_reducer(position: &mut i32, action: Knob) -> DispatchResult<Motor> {
        match action {
            Knob::Turn(delta) => {
                *position += delta;
                DispatchResult::changed_with(Motor::Step(delta))
            }
            Knob::DidSettle => DispatchResult::unchanged(),
        }
    }

    #[test]
    fn test_harness_records_effects() {
        let mut harness = EffectHarness::new(0, knob_reducer);

        assert!(harness.dispatch_all([Knob::Turn(2), Knob::DidSettle, Knob::Turn(-1)]));
        assert_eq!(*harness.state(), 1);

        let effects = harness.drain_effects();
        assert_eq!(effects, vec![Motor::Step(2), Motor::Step(-1)]);
        assert!(harness.drain_effects().is_empty());
    }

    #[test]
    fn test_process_emitted_dispatches_in_order() {
        let mut harness = EffectHarness::new(0, knob_reducer);
        let tx = harness.sender();
        let _ = tx.send(Knob::Turn(5));
        harness.emit(Knob::Turn(1));

        assert_eq!(harness.process_emitted(), 2);
        assert_eq!(*harness.state(), 6);
        assert_eq!(
            harness.drain_effects(),
            vec![Motor::Step(5), Motor::Step(1)]
        );
    }

    #[test]
    fn test_drain_category_keeps_others() {
        let mut harness = EffectHarness::new(0, knob_reducer);
        harness.emit(Knob::Turn(1));
        harness.emit(Knob::DidSettle);

        let knob = harness.drain_category("knob");
        assert_eq!(knob, vec![Knob::Turn(1)]);
        assert_eq!(harness.drain_emitted(), vec![Knob::DidSettle]);
    }

    #[test]
    fn test_assert_macros() {
        let actions = vec![Knob::Turn(1), Knob::DidSettle];

        assert_emitted!(actions, Knob::Turn(_));
        assert_emitted!(actions, Knob::Turn(n) if *n == 1);
        assert_not_emitted!(actions, Knob::Turn(9));
        assert!(find_emitted!(actions, Knob::DidSettle).is_some());
        assert_eq!(count_emitted!(actions, Knob::Turn(_)), 1);
        assert_category_emitted!(actions, "knob");
        assert_category_not_emitted!(actions, "motor");
    }
}
