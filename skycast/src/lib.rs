//! skycast: generation-guarded async pipelines around a single reducer
//!
//! Like Redux/Elm, but headless. All state mutations happen through
//! dispatched actions; reducers describe I/O as effects, and stale async
//! results are recognised by their [`Generation`].
//!
//! # Example
//! ```ignore
//! use skycast::prelude::*;
//!
//! #[derive(Action, Clone, Debug)]
//! #[action(infer_categories)]
//! enum Action {
//!     LocationRefresh,
//!     LocationDidResolve { generation: Generation, lat: f64, lon: f64 },
//! }
//!
//! assert_eq!(Action::LocationRefresh.category(), Some("location"));
//! ```

// Re-export everything from core
pub use skycast_core::*;

// Re-export derive macros
pub use skycast_macros::Action;

/// Prelude for convenient imports
pub mod prelude {
    // Traits
    pub use skycast_core::{Action, ActionCategory, ActionSummary};

    // Store and effects
    pub use skycast_core::{
        DispatchResult, EffectContext, EffectReducer, EffectRuntime, EffectStore,
        EffectStoreWithMiddleware, Generation, GenerationTracker,
    };

    // Middleware
    pub use skycast_core::{ComposedMiddleware, LoggingMiddleware, Middleware, NoopMiddleware};

    #[cfg(feature = "subscriptions")]
    pub use skycast_core::{SubKey, Subscriptions};
    #[cfg(feature = "tasks")]
    pub use skycast_core::{TaskKey, TaskManager};

    pub use skycast_core::CancellationToken;

    // Derive macros
    pub use skycast_macros::Action;
}
