//! Transition declarations and the declaration-ordered transition table.

use std::sync::Arc;

use crate::core::{Event, GuardFn, HandlerFn, State};

/// A declared transition from one state to another on a named event.
///
/// The event is identified by name so that one declaration serves every
/// payload a dispatch may carry. Guards and handlers are stored behind
/// `Arc`s; a multi-source declaration expands into several entries that
/// share the same callbacks.
pub struct Transition<S: State, E: Event, C> {
    pub from: S,
    pub event: String,
    pub to: S,
    pub guard: Option<GuardFn<E, C>>,
    pub on_enter: Option<HandlerFn<E, C>>,
    pub on_exit: Option<HandlerFn<E, C>>,
}

impl<S: State, E: Event, C> Transition<S, E, C> {
    /// Whether this entry is a candidate for `(current, event)`.
    pub fn matches(&self, current: &S, event: &str) -> bool {
        self.from == *current && self.event == event
    }
}

impl<S: State, E: Event, C> Clone for Transition<S, E, C> {
    fn clone(&self) -> Self {
        Self {
            from: self.from.clone(),
            event: self.event.clone(),
            to: self.to.clone(),
            guard: self.guard.as_ref().map(Arc::clone),
            on_enter: self.on_enter.as_ref().map(Arc::clone),
            on_exit: self.on_exit.as_ref().map(Arc::clone),
        }
    }
}

impl<S: State, E: Event, C> std::fmt::Debug for Transition<S, E, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transition")
            .field("from", &self.from)
            .field("event", &self.event)
            .field("to", &self.to)
            .field("guard", &self.guard.is_some())
            .field("on_enter", &self.on_enter.is_some())
            .field("on_exit", &self.on_exit.is_some())
            .finish()
    }
}

/// Store of declared transitions, in declaration order.
///
/// Multiple entries may share a `(from, event)` key; resolution picks the
/// first whose guard admits the dispatch, so order is preserved exactly
/// as declared. Late binding appends; removal drops every entry for a
/// key.
pub struct TransitionTable<S: State, E: Event, C> {
    entries: Vec<Transition<S, E, C>>,
}

impl<S: State, E: Event, C> TransitionTable<S, E, C> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append a transition under its key. Redeclaration is permitted.
    pub fn add(&mut self, transition: Transition<S, E, C>) {
        self.entries.push(transition);
    }

    /// Remove every entry for `(from, event)`.
    pub fn remove(&mut self, from: &S, event: &str) {
        self.entries.retain(|t| !t.matches(from, event));
    }

    /// Candidate transitions for `(from, event)`, in declaration order.
    ///
    /// An empty result is legal and means "no transition".
    pub fn candidates<'t>(
        &'t self,
        from: &'t S,
        event: &'t str,
    ) -> impl Iterator<Item = &'t Transition<S, E, C>> + 't {
        self.entries.iter().filter(move |t| t.matches(from, event))
    }

    /// Whether any entry declares the event, from any source state.
    pub fn declares_event(&self, event: &str) -> bool {
        self.entries.iter().any(|t| t.event == event)
    }

    /// All entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Transition<S, E, C>> {
        self.entries.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Transition<S, E, C>> {
        self.entries.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: State, E: Event, C> Default for TransitionTable<S, E, C> {
    fn default() -> Self {
        Self::new()
    }
}
