//! Dispatch middleware
//!
//! Middleware observes every action going through an
//! [`EffectStoreWithMiddleware`](crate::EffectStoreWithMiddleware), before and
//! after the reducer runs. It cannot change the action or the state.

use crate::action::{Action, ActionSummary};

/// Hooks around a single dispatch.
pub trait Middleware<A: Action> {
    /// Called before the action is handed to the reducer
    fn before(&mut self, action: &A);

    /// Called after the reducer ran
    fn after(&mut self, action: &A, state_changed: bool);
}

/// Middleware that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMiddleware;

impl<A: Action> Middleware<A> for NoopMiddleware {
    fn before(&mut self, _action: &A) {}
    fn after(&mut self, _action: &A, _state_changed: bool) {}
}

/// Logs dispatched actions through `tracing` at debug level.
///
/// Uses [`ActionSummary::summary`] so result actions carrying payloads stay
/// on one line.
#[derive(Debug, Clone, Default)]
pub struct LoggingMiddleware {
    /// Log when the action enters the reducer
    pub log_before: bool,
    /// Log after the reducer with the change flag
    pub log_after: bool,
}

impl LoggingMiddleware {
    /// Log after dispatch only
    pub fn new() -> Self {
        Self {
            log_before: false,
            log_after: true,
        }
    }

    /// Log both before and after dispatch
    pub fn verbose() -> Self {
        Self {
            log_before: true,
            log_after: true,
        }
    }
}

impl<A: ActionSummary> Middleware<A> for LoggingMiddleware {
    fn before(&mut self, action: &A) {
        if self.log_before {
            tracing::debug!(action = %action.name(), summary = %action.summary(), "dispatching");
        }
    }

    fn after(&mut self, action: &A, state_changed: bool) {
        if self.log_after {
            tracing::debug!(
                action = %action.name(),
                summary = %action.summary(),
                state_changed,
                "dispatched"
            );
        }
    }
}

/// Runs several middleware in sequence.
///
/// `before` hooks run in insertion order, `after` hooks in reverse.
pub struct ComposedMiddleware<A: Action> {
    middlewares: Vec<Box<dyn Middleware<A> + Send>>,
}

impl<A: Action> std::fmt::Debug for ComposedMiddleware<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComposedMiddleware")
            .field("middlewares_count", &self.middlewares.len())
            .finish()
    }
}

impl<A: Action> Default for ComposedMiddleware<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Action> ComposedMiddleware<A> {
    pub fn new() -> Self {
        Self {
            middlewares: Vec::new(),
        }
    }

    /// Append a middleware.
    pub fn add<M: Middleware<A> + Send + 'static>(mut self, middleware: M) -> Self {
        self.middlewares.push(Box::new(middleware));
        self
    }
}

impl<A: Action> Middleware<A> for ComposedMiddleware<A> {
    fn before(&mut self, action: &A) {
        for middleware in &mut self.middlewares {
            middleware.before(action);
        }
    }

    fn after(&mut self, action: &A, state_changed: bool) {
        for middleware in self.middlewares.iter_mut().rev() {
            middleware.after(action, state_changed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Debug)]
    struct Ping;

    impl Action for Ping {
        fn name(&self) -> &'static str {
            "Ping"
        }
    }

    impl ActionSummary for Ping {}

    struct Journal {
        label: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Middleware<Ping> for Journal {
        fn before(&mut self, _action: &Ping) {
            if let Ok(mut log) = self.log.lock() {
                log.push(format!("{}:before", self.label));
            }
        }

        fn after(&mut self, _action: &Ping, state_changed: bool) {
            if let Ok(mut log) = self.log.lock() {
                log.push(format!("{}:after:{}", self.label, state_changed));
            }
        }
    }

    #[test]
    fn test_composed_order_nests() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut composed = ComposedMiddleware::new()
            .add(Journal {
                label: "outer",
                log: log.clone(),
            })
            .add(Journal {
                label: "inner",
                log: log.clone(),
            });

        composed.before(&Ping);
        composed.after(&Ping, true);

        let log = log.lock().expect("poisoned").clone();
        assert_eq!(
            log,
            vec![
                "outer:before",
                "inner:before",
                "inner:after:true",
                "outer:after:true"
            ]
        );
    }

    #[test]
    fn test_logging_middleware_defaults() {
        let quiet = LoggingMiddleware::new();
        assert!(!quiet.log_before);
        assert!(quiet.log_after);

        let mut verbose = LoggingMiddleware::verbose();
        assert!(verbose.log_before);
        // No subscriber installed: must not panic.
        verbose.before(&Ping);
        verbose.after(&Ping, false);
    }

    #[test]
    fn test_default_summary_is_debug() {
        assert_eq!(Ping.summary(), "Ping");
    }
}
