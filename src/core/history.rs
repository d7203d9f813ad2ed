//! Transition history tracking.
//!
//! The history log is a bounded FIFO of committed transitions. Records
//! are appended only after a transition's enter handler has succeeded,
//! so the log never contains an aborted dispatch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::event::Event;
use super::state::State;

/// Record of a single committed transition.
///
/// The event value is stored with its payload, so the record carries the
/// arguments the dispatch was invoked with.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct TransitionRecord<S: State, E: Event> {
    /// The event that drove the transition, including its arguments
    pub event: E,
    /// The state being transitioned from
    pub from: S,
    /// The state being transitioned to
    pub to: S,
    /// When the transition committed
    pub timestamp: DateTime<Utc>,
}

/// Ordered history of committed transitions.
///
/// The log is append-only from the engine's point of view; `record`
/// returns a new log with the entry added. When a capacity is configured,
/// the oldest entries are dropped first.
///
/// # Example
///
/// ```rust
/// use statecraft::core::{Event, HistoryLog, State, TransitionRecord};
/// use serde::{Deserialize, Serialize};
/// use chrono::Utc;
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum Phase { Draft, Review }
///
/// impl State for Phase {
///     fn name(&self) -> &str {
///         match self {
///             Self::Draft => "Draft",
///             Self::Review => "Review",
///         }
///     }
/// }
///
/// #[derive(Clone, Debug, Serialize, Deserialize)]
/// enum PhaseEvent { Submit }
///
/// impl Event for PhaseEvent {
///     fn name(&self) -> &str { "Submit" }
/// }
///
/// let log = HistoryLog::new();
/// let log = log.record(TransitionRecord {
///     event: PhaseEvent::Submit,
///     from: Phase::Draft,
///     to: Phase::Review,
///     timestamp: Utc::now(),
/// });
///
/// assert_eq!(log.len(), 1);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct HistoryLog<S: State, E: Event> {
    entries: VecDeque<TransitionRecord<S, E>>,
    capacity: Option<usize>,
}

impl<S: State, E: Event> Default for HistoryLog<S, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State, E: Event> HistoryLog<S, E> {
    /// Create a new unbounded history log.
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: None,
        }
    }

    /// Create a history log that retains at most `capacity` entries,
    /// discarding the oldest first.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: Some(capacity),
        }
    }

    /// Record a transition, returning a new log.
    ///
    /// If the log is at capacity the oldest entry is dropped.
    pub fn record(&self, record: TransitionRecord<S, E>) -> Self {
        let mut entries = self.entries.clone();
        entries.push_back(record);
        if let Some(capacity) = self.capacity {
            while entries.len() > capacity {
                entries.pop_front();
            }
        }
        Self {
            entries,
            capacity: self.capacity,
        }
    }

    /// All recorded entries, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &TransitionRecord<S, E>> {
        self.entries.iter()
    }

    /// The most recent `n` entries, oldest of those first.
    pub fn recent(&self, n: usize) -> Vec<&TransitionRecord<S, E>> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(skip).collect()
    }

    /// The most recent entry, if any.
    pub fn last(&self) -> Option<&TransitionRecord<S, E>> {
        self.entries.back()
    }

    /// Number of recorded transitions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether any transition has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The configured capacity, if bounded.
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }
}
