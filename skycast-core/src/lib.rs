//! Core traits and types for skycast
//!
//! This crate provides the foundational abstractions for building async
//! pipelines around a single state machine, following a Redux/Elm-inspired
//! architecture.
//!
//! # Core Concepts
//!
//! - **Action**: Events that describe state changes
//! - **EffectStore**: Centralized state container whose reducer returns effects
//! - **Generation**: Tokens that let the reducer discard superseded results
//! - **TaskManager**: Keyed one-shot async requests (`tasks` feature)
//! - **Subscriptions**: Long-lived action sources (`subscriptions` feature)
//! - **EffectRuntime**: The loop tying them together
//!
//! # Basic Example
//!
//! ```ignore
//! use skycast_core::prelude::*;
//!
//! #[derive(Action, Clone, Debug)]
//! enum Action {
//!     Refresh,
//!     DidLoad(u32),
//! }
//!
//! enum Effect {
//!     Load,
//! }
//!
//! fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
//!     match action {
//!         Action::Refresh => {
//!             state.loading = true;
//!             DispatchResult::changed_with(Effect::Load)
//!         }
//!         Action::DidLoad(value) => {
//!             state.loading = false;
//!             state.value = Some(value);
//!             DispatchResult::changed()
//!         }
//!     }
//! }
//!
//! let mut runtime = EffectRuntime::new(AppState::default(), reducer);
//! runtime.enqueue(Action::Refresh);
//! runtime
//!     .run(&shutdown, |state| println!("{state:?}"), |effect, ctx| match effect {
//!         Effect::Load => {
//!             ctx.tasks().spawn("load", async { Action::DidLoad(42) });
//!         }
//!     })
//!     .await;
//! ```
//!
//! # Async Handler Pattern
//!
//! Async work uses a two-phase action pattern:
//!
//! 1. **Intent actions** make the reducer emit an effect (e.g., `LocationRefresh`)
//! 2. **Result actions** carry the outcome back (e.g., `LocationDidResolve`)
//!
//! The `Did*` naming convention identifies result actions. With
//! `#[action(infer_categories)]`, intents and results of one stage share a
//! category (`LocationRefresh` and `LocationDidResolve` both get `"location"`).

pub mod action;
pub mod effect;
pub mod generation;
pub mod middleware;
pub mod runtime;
#[cfg(feature = "subscriptions")]
pub mod subscriptions;
#[cfg(feature = "tasks")]
pub mod tasks;
pub mod testing;

// Core trait exports
pub use action::{Action, ActionCategory, ActionSummary};

// Middleware exports
pub use middleware::{ComposedMiddleware, LoggingMiddleware, Middleware, NoopMiddleware};

// Effect exports
pub use effect::{DispatchResult, EffectReducer, EffectStore, EffectStoreWithMiddleware};
pub use generation::{Generation, GenerationTracker};
pub use runtime::{EffectContext, EffectRuntime, EffectStoreLike};

// Task exports (requires "tasks" feature)
#[cfg(feature = "tasks")]
pub use tasks::{TaskKey, TaskManager};

// Subscription exports (requires "subscriptions" feature)
#[cfg(feature = "subscriptions")]
pub use subscriptions::{SubKey, Subscriptions};

// Shutdown signal used by EffectRuntime::run
pub use tokio_util::sync::CancellationToken;

// Testing exports
pub use testing::EffectHarness;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::action::{Action, ActionCategory, ActionSummary};
    pub use crate::effect::{
        DispatchResult, EffectReducer, EffectStore, EffectStoreWithMiddleware,
    };
    pub use crate::generation::{Generation, GenerationTracker};
    pub use crate::middleware::{
        ComposedMiddleware, LoggingMiddleware, Middleware, NoopMiddleware,
    };
    pub use crate::runtime::{EffectContext, EffectRuntime};
    #[cfg(feature = "subscriptions")]
    pub use crate::subscriptions::{SubKey, Subscriptions};
    #[cfg(feature = "tasks")]
    pub use crate::tasks::{TaskKey, TaskManager};
    pub use tokio_util::sync::CancellationToken;
}
