//! Action traits for type-safe state transitions

use std::fmt::Debug;

/// Marker trait for actions that can be dispatched to the store
///
/// Actions describe something that happened: an intent from the host
/// (`PipelineStart`) or the outcome of an async request (`LocationDidResolve`).
/// They should be:
/// - Clone: Actions may be logged or inspected by middleware
/// - Debug: For debugging and logging
/// - Send + 'static: Async tasks send them back over a channel
///
/// Use `#[derive(Action)]` from `skycast-macros` to auto-implement this trait.
pub trait Action: Clone + Debug + Send + 'static {
    /// Get the action name for logging and filtering
    fn name(&self) -> &'static str;
}

/// Category information generated by `#[action(infer_categories)]`.
///
/// Categories group related actions (`LocationRefresh`, `LocationDidResolve`
/// and `LocationDidFail` all belong to `"location"`).
pub trait ActionCategory: Action {
    /// The generated category enum type.
    type Category: Copy + Eq + Debug;

    /// Category name, or `None` for uncategorized actions.
    fn category(&self) -> Option<&'static str>;

    /// Category as an enum value.
    fn category_enum(&self) -> Self::Category;
}

/// Concise one-line description of an action for logs.
///
/// The default uses the `Debug` representation. Override it for actions
/// carrying large payloads.
pub trait ActionSummary: Action {
    fn summary(&self) -> String {
        format!("{:?}", self)
    }
}
