//! Generation tokens for superseding async requests
//!
//! Some requests cannot be aborted once issued, and a result may already be
//! sitting in the action channel when a newer request starts. A
//! [`GenerationTracker`] lives in the state, hands out a fresh [`Generation`]
//! for every request of one stage, and tells the reducer at resolution time
//! whether a result still matters.
//!
//! ```ignore
//! // issuing
//! let generation = state.weather.issue();
//! DispatchResult::changed_with(Effect::FetchWeather { generation, coords })
//!
//! // resolving
//! if !state.weather.complete(generation) {
//!     return DispatchResult::unchanged(); // stale
//! }
//! ```

use std::fmt;

/// Identifies one request within a stage. Strictly increasing per tracker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Tracks the latest issued generation of a stage and whether it is still
/// outstanding.
///
/// Invariant: at most one generation is in flight. Issuing a new one
/// supersedes the previous; the counter never goes backwards, even across
/// [`invalidate`](Self::invalidate).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GenerationTracker {
    issued: u64,
    in_flight: Option<Generation>,
}

impl GenerationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, superseding any outstanding one.
    pub fn issue(&mut self) -> Generation {
        self.issued += 1;
        let generation = Generation(self.issued);
        self.in_flight = Some(generation);
        generation
    }

    /// Whether `generation` is the outstanding request.
    pub fn is_current(&self, generation: Generation) -> bool {
        self.in_flight == Some(generation)
    }

    /// Resolve `generation`. Returns `false` (and changes nothing) when it
    /// was superseded or invalidated.
    pub fn complete(&mut self, generation: Generation) -> bool {
        if self.is_current(generation) {
            self.in_flight = None;
            true
        } else {
            false
        }
    }

    /// Forget the outstanding request; its result will be treated as stale.
    pub fn invalidate(&mut self) -> Option<Generation> {
        self.in_flight.take()
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// The most recently issued generation, resolved or not.
    pub fn latest(&self) -> Option<Generation> {
        (self.issued > 0).then_some(Generation(self.issued))
    }
}
