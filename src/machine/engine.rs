//! The dispatch engine.
//!
//! One operation drives everything: `send`. A dispatch resolves the
//! transition, evaluates guards, fans out to subscribers, runs the exit
//! handler, advances the state, runs the enter handler, appends history,
//! and cascades to nested machines, in that order, each callback awaited
//! before the next.
//!
//! Callbacks never hold a reference to the machine itself, so a callback
//! that wants to drive another transition returns a follow-up event
//! instead. Follow-ups are queued FIFO and dispatched after the current
//! dispatch completes, which serializes reentrant sends per machine.

use std::collections::{BTreeMap, VecDeque};

use chrono::Utc;
use tracing::{debug, trace, warn};

use crate::core::{
    BoxFuture, Context, Event, HandlerFn, HistoryLog, State, SubscriberFn, TransitionRecord,
};
use crate::machine::error::{HandlerStage, MachineError};
use crate::machine::subscribers::SubscriberRegistry;
use crate::machine::table::{Transition, TransitionTable};

/// The transition selected by guard resolution, detached from the table
/// so its handlers can run while the machine is mutated.
struct ChosenTransition<S: State, E: Event, C> {
    from: S,
    to: S,
    on_enter: Option<HandlerFn<E, C>>,
    on_exit: Option<HandlerFn<E, C>>,
}

/// A state machine bound to one current state, a context cell, a
/// transition table, subscriber lists, a history log, and any nested
/// child machines.
///
/// Children are owned by their parent and share its type parameters;
/// ownership makes an ancestor cycle unrepresentable.
pub struct Machine<S: State, E: Event, C> {
    current: S,
    context: Context<C>,
    table: TransitionTable<S, E, C>,
    subscribers: SubscriberRegistry<E, C>,
    history: HistoryLog<S, E>,
    children: BTreeMap<String, Machine<S, E, C>>,
}

impl<S, E, C> Machine<S, E, C>
where
    S: State + 'static,
    E: Event,
    C: Send + Sync + 'static,
{
    /// Create a machine in the given initial state with an empty table.
    ///
    /// This is the raw constructor; [`MachineBuilder`] adds declaration
    /// validation on top of it.
    ///
    /// [`MachineBuilder`]: crate::builder::MachineBuilder
    pub fn new(initial: S, context: C) -> Self {
        Self {
            current: initial,
            context: Context::new(context),
            table: TransitionTable::new(),
            subscribers: SubscriberRegistry::new(),
            history: HistoryLog::new(),
            children: BTreeMap::new(),
        }
    }

    /// The active state.
    pub fn current(&self) -> &S {
        &self.current
    }

    /// Whether the machine is currently in `state`.
    pub fn is(&self, state: &S) -> bool {
        self.current == *state
    }

    /// The live context cell.
    pub fn context(&self) -> &Context<C> {
        &self.context
    }

    /// Mutable access to the context cell.
    pub fn context_mut(&mut self) -> &mut Context<C> {
        &mut self.context
    }

    /// Set or replace an injected context key. All subsequent guards,
    /// handlers, and subscribers observe the new value.
    pub fn inject<T: std::any::Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        self.context.inject(key, value);
    }

    /// The committed transition history.
    pub fn history(&self) -> &HistoryLog<S, E> {
        &self.history
    }

    pub(crate) fn set_history(&mut self, history: HistoryLog<S, E>) {
        self.history = history;
    }

    /// The transition table.
    pub fn table(&self) -> &TransitionTable<S, E, C> {
        &self.table
    }

    pub(crate) fn table_mut(&mut self) -> &mut TransitionTable<S, E, C> {
        &mut self.table
    }

    /// Late-bind a transition. It is admissible on the next `send`.
    pub fn add_transition(&mut self, transition: Transition<S, E, C>) {
        self.table.add(transition);
    }

    /// Late-bind several transitions, e.g. the expansion of a
    /// multi-source declaration.
    pub fn add_transitions(&mut self, transitions: impl IntoIterator<Item = Transition<S, E, C>>) {
        for transition in transitions {
            self.table.add(transition);
        }
    }

    /// Remove every transition declared for `(from, event)`.
    pub fn remove_transition(&mut self, from: &S, event: &str) {
        self.table.remove(from, event);
    }

    /// Subscribe a callback to an event. Fires on every dispatch of the
    /// event, before the transition's own handlers.
    pub fn on(&mut self, event: impl Into<String>, callback: SubscriberFn<E, C>) {
        self.subscribers.on(event, callback);
    }

    /// Subscribe a callback that is removed after its first invocation.
    pub fn once(&mut self, event: impl Into<String>, callback: SubscriberFn<E, C>) {
        self.subscribers.once(event, callback);
    }

    /// Unsubscribe the first entry holding the same callback allocation.
    pub fn off(&mut self, event: &str, callback: &SubscriberFn<E, C>) -> bool {
        self.subscribers.off(event, callback)
    }

    /// Number of live subscribers for an event.
    pub fn subscriber_count(&self, event: &str) -> usize {
        self.subscribers.count(event)
    }

    /// Attach a child machine under a name. The child participates in
    /// every subsequent dispatch of events its own table declares.
    pub fn add_child(&mut self, name: impl Into<String>, child: Machine<S, E, C>) {
        self.children.insert(name.into(), child);
    }

    /// A child machine by name.
    pub fn child(&self, name: &str) -> Option<&Machine<S, E, C>> {
        self.children.get(name)
    }

    /// Mutable access to a child machine.
    pub fn child_mut(&mut self, name: &str) -> Option<&mut Machine<S, E, C>> {
        self.children.get_mut(name)
    }

    /// The attached children, in name order.
    pub fn children(&self) -> impl Iterator<Item = (&str, &Machine<S, E, C>)> {
        self.children.iter().map(|(name, child)| (name.as_str(), child))
    }

    /// Drive a transition.
    ///
    /// Resolution and handler composition follow a fixed order: lookup,
    /// guard selection in declaration order, subscriber pre-broadcast in
    /// registration order, `on_exit`, state change, `on_enter`, history
    /// append, child cascade. Any error aborts the dispatch; the state
    /// has changed only if the failure happened after the `on_exit`
    /// stage.
    ///
    /// Follow-up events returned by callbacks (including those of
    /// cascaded children) run after the triggering dispatch completes,
    /// in FIFO order.
    pub async fn send(&mut self, event: E) -> Result<S, MachineError> {
        let followups = self.dispatch(&event).await?;
        self.drain(followups).await?;
        Ok(self.current.clone())
    }

    /// Whether `send(event)` would get past guard selection, without
    /// mutating anything.
    ///
    /// Returns `Ok(false)` when the event is not dispatchable from the
    /// current state; `Err` only when a guard itself fails.
    pub async fn can(&self, event: &E) -> Result<bool, MachineError> {
        let name = event.name();
        for candidate in self.table.candidates(&self.current, name) {
            let admitted = match &candidate.guard {
                Some(guard) => {
                    guard(&self.context, event)
                        .await
                        .map_err(|source| MachineError::Handler {
                            stage: HandlerStage::Guard,
                            event: name.to_string(),
                            from: self.current.name().to_string(),
                            to: candidate.to.name().to_string(),
                            source,
                        })?
                }
                None => true,
            };
            if admitted {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Run one dispatch and return the follow-up events it produced.
    fn dispatch<'a>(&'a mut self, event: &'a E) -> BoxFuture<'a, Result<Vec<E>, MachineError>> {
        Box::pin(async move {
            let name = event.name();
            trace!(event = name, state = self.current.name(), "dispatching");

            if self.table.candidates(&self.current, name).next().is_none() {
                if !self.table.declares_event(name) {
                    return Err(MachineError::UnknownEvent {
                        event: name.to_string(),
                    });
                }
                return Err(MachineError::InvalidTransition {
                    state: self.current.name().to_string(),
                    event: name.to_string(),
                });
            }

            let mut chosen: Option<ChosenTransition<S, E, C>> = None;
            for candidate in self.table.candidates(&self.current, name) {
                let admitted = match &candidate.guard {
                    Some(guard) => {
                        guard(&self.context, event)
                            .await
                            .map_err(|source| MachineError::Handler {
                                stage: HandlerStage::Guard,
                                event: name.to_string(),
                                from: self.current.name().to_string(),
                                to: candidate.to.name().to_string(),
                                source,
                            })?
                    }
                    None => true,
                };
                if admitted {
                    chosen = Some(ChosenTransition {
                        from: self.current.clone(),
                        to: candidate.to.clone(),
                        on_enter: candidate.on_enter.clone(),
                        on_exit: candidate.on_exit.clone(),
                    });
                    break;
                }
            }

            let Some(chosen) = chosen else {
                trace!(event = name, state = self.current.name(), "all guards rejected");
                return Err(MachineError::GuardRejected {
                    state: self.current.name().to_string(),
                    event: name.to_string(),
                });
            };

            let mut followups = Vec::new();

            // Pre-broadcast over a snapshot so registration order holds
            // even if the registry changes mid-flight. A one-shot entry
            // is consumed once it has fired, including when a later
            // subscriber aborts the dispatch.
            for entry in self.subscribers.snapshot(name) {
                let outcome = (entry.callback)(&mut self.context, event).await;
                if entry.once {
                    self.subscribers.consume(name, &entry.callback);
                }
                match outcome {
                    Ok(Some(followup)) => followups.push(followup),
                    Ok(None) => {}
                    Err(source) => {
                        warn!(event = name, "subscriber aborted dispatch");
                        return Err(MachineError::Handler {
                            stage: HandlerStage::Subscriber,
                            event: name.to_string(),
                            from: chosen.from.name().to_string(),
                            to: chosen.to.name().to_string(),
                            source,
                        });
                    }
                }
            }

            // Exit runs while the machine still reports the source state.
            if let Some(on_exit) = &chosen.on_exit {
                match on_exit(&mut self.context, event).await {
                    Ok(Some(followup)) => followups.push(followup),
                    Ok(None) => {}
                    Err(source) => {
                        return Err(MachineError::Handler {
                            stage: HandlerStage::Exit,
                            event: name.to_string(),
                            from: chosen.from.name().to_string(),
                            to: chosen.to.name().to_string(),
                            source,
                        });
                    }
                }
            }

            self.current = chosen.to.clone();

            // Enter failures leave the machine in the target state; the
            // history append below is skipped.
            if let Some(on_enter) = &chosen.on_enter {
                match on_enter(&mut self.context, event).await {
                    Ok(Some(followup)) => followups.push(followup),
                    Ok(None) => {}
                    Err(source) => {
                        warn!(event = name, to = chosen.to.name(), "enter handler failed");
                        return Err(MachineError::Handler {
                            stage: HandlerStage::Enter,
                            event: name.to_string(),
                            from: chosen.from.name().to_string(),
                            to: chosen.to.name().to_string(),
                            source,
                        });
                    }
                }
            }

            self.history = self.history.record(TransitionRecord {
                event: event.clone(),
                from: chosen.from.clone(),
                to: chosen.to.clone(),
                timestamp: Utc::now(),
            });

            debug!(
                event = name,
                from = chosen.from.name(),
                to = chosen.to.name(),
                "transition committed"
            );

            // Cascade. A child failure surfaces as this dispatch's
            // failure; the state change above is not rolled back.
            for child in self.children.values_mut() {
                child.deliver(event).await?;
            }

            Ok(followups)
        })
    }

    /// Deliver a cascaded event: run a full dispatch if this machine's
    /// table admits it, skip silently otherwise. Returns whether a
    /// transition committed.
    fn deliver<'a>(&'a mut self, event: &'a E) -> BoxFuture<'a, Result<bool, MachineError>> {
        Box::pin(async move {
            let outcome = self.dispatch(event).await;
            match outcome {
                Ok(followups) => {
                    self.drain(followups).await?;
                    Ok(true)
                }
                Err(MachineError::UnknownEvent { .. })
                | Err(MachineError::InvalidTransition { .. })
                | Err(MachineError::GuardRejected { .. }) => Ok(false),
                Err(err) => Err(err),
            }
        })
    }

    /// Dispatch queued follow-up events in FIFO order, appending any
    /// follow-ups they produce in turn.
    async fn drain(&mut self, followups: Vec<E>) -> Result<(), MachineError> {
        let mut queue: VecDeque<E> = followups.into();
        while let Some(next) = queue.pop_front() {
            queue.extend(self.dispatch(&next).await?);
        }
        Ok(())
    }
}

impl<S: State, E: Event, C> std::fmt::Debug for Machine<S, E, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Machine")
            .field("current", &self.current)
            .field("transitions", &self.table.len())
            .field("history", &self.history.len())
            .field("children", &self.children.keys().collect::<Vec<_>>())
            .finish()
    }
}
