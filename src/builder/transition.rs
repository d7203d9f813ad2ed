//! Builder for transition declarations.

use crate::builder::error::BuildError;
use crate::core::{guard, handler, Context, Event, GuardFn, HandlerFn, State};
use crate::machine::Transition;

/// Builder for constructing transitions with a fluent API.
///
/// A declaration may name several source states via `from_any`; `build`
/// expands it into one table entry per source, all sharing the same
/// guard and handler allocations.
pub struct TransitionBuilder<S: State, E: Event, C> {
    from: Vec<S>,
    event: Option<String>,
    to: Option<S>,
    guard: Option<GuardFn<E, C>>,
    on_enter: Option<HandlerFn<E, C>>,
    on_exit: Option<HandlerFn<E, C>>,
}

impl<S: State, E: Event, C> TransitionBuilder<S, E, C> {
    /// Create a new transition builder.
    pub fn new() -> Self {
        Self {
            from: Vec::new(),
            event: None,
            to: None,
            guard: None,
            on_enter: None,
            on_exit: None,
        }
    }

    /// Set a single source state (required, unless `from_any` is used).
    pub fn from(mut self, state: S) -> Self {
        self.from = vec![state];
        self
    }

    /// Set several source states. The declaration behaves as one entry
    /// per source, sharing guard and handlers.
    pub fn from_any(mut self, states: impl IntoIterator<Item = S>) -> Self {
        self.from = states.into_iter().collect();
        self
    }

    /// Set the event name this transition reacts to (required).
    pub fn on(mut self, event: impl Into<String>) -> Self {
        self.event = Some(event.into());
        self
    }

    /// Set the target state (required).
    pub fn to(mut self, state: S) -> Self {
        self.to = Some(state);
        self
    }

    /// Add a guard using a synchronous predicate (optional).
    pub fn when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Context<C>, &E) -> bool + Send + Sync + 'static,
    {
        self.guard = Some(guard(predicate));
        self
    }

    /// Add a prebuilt, possibly asynchronous guard (optional).
    pub fn guard(mut self, guard: GuardFn<E, C>) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Add a synchronous enter handler (optional). The handler may
    /// return a follow-up event.
    pub fn on_enter<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Context<C>, &E) -> Option<E> + Send + Sync + 'static,
    {
        self.on_enter = Some(handler(f));
        self
    }

    /// Add a prebuilt, possibly asynchronous enter handler (optional).
    pub fn on_enter_async(mut self, f: HandlerFn<E, C>) -> Self {
        self.on_enter = Some(f);
        self
    }

    /// Add a synchronous exit handler (optional).
    pub fn on_exit<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Context<C>, &E) -> Option<E> + Send + Sync + 'static,
    {
        self.on_exit = Some(handler(f));
        self
    }

    /// Add a prebuilt, possibly asynchronous exit handler (optional).
    pub fn on_exit_async(mut self, f: HandlerFn<E, C>) -> Self {
        self.on_exit = Some(f);
        self
    }

    /// Build the table entries, one per source state.
    pub fn build(self) -> Result<Vec<Transition<S, E, C>>, BuildError> {
        if self.from.is_empty() {
            return Err(BuildError::MissingFromState);
        }
        let event = self.event.ok_or(BuildError::MissingEvent)?;
        let to = self.to.ok_or(BuildError::MissingToState)?;

        Ok(self
            .from
            .into_iter()
            .map(|from| Transition {
                from,
                event: event.clone(),
                to: to.clone(),
                guard: self.guard.clone(),
                on_enter: self.on_enter.clone(),
                on_exit: self.on_exit.clone(),
            })
            .collect())
    }
}

impl<S: State, E: Event, C> Default for TransitionBuilder<S, E, C> {
    fn default() -> Self {
        Self::new()
    }
}
