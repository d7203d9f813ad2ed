//! Builder for constructing machines.

use crate::builder::error::BuildError;
use crate::builder::transition::TransitionBuilder;
use crate::core::{Event, HistoryLog, State, SubscriberFn};
use crate::machine::{Machine, Transition};

/// Engine members that declared state, event, and child names may not
/// shadow. The comparison ignores case and underscores, so a declaration
/// named `AddTransition` collides with `add_transition`.
const RESERVED_MEMBERS: &[&str] = &[
    "send",
    "can",
    "is",
    "on",
    "once",
    "off",
    "current",
    "context",
    "history",
    "add_transition",
    "remove_transition",
    "inject",
    "children",
];

fn normalized(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_')
        .collect::<String>()
        .to_ascii_lowercase()
}

pub(crate) fn collides_with_reserved(name: &str) -> bool {
    let candidate = normalized(name);
    RESERVED_MEMBERS
        .iter()
        .any(|member| normalized(member) == candidate)
}

/// Builder for constructing machines with a fluent API.
///
/// `build` validates the declaration: the initial state and context are
/// required, at least one transition must be declared, and every declared
/// state, event, and child name is checked against the reserved engine
/// members.
pub struct MachineBuilder<S: State, E: Event, C> {
    initial: Option<S>,
    context: Option<C>,
    transitions: Vec<Transition<S, E, C>>,
    subscriptions: Vec<(String, SubscriberFn<E, C>, bool)>,
    children: Vec<(String, Machine<S, E, C>)>,
    history_capacity: Option<usize>,
}

impl<S, E, C> MachineBuilder<S, E, C>
where
    S: State + 'static,
    E: Event,
    C: Send + Sync + 'static,
{
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            initial: None,
            context: None,
            transitions: Vec::new(),
            subscriptions: Vec::new(),
            children: Vec::new(),
            history_capacity: None,
        }
    }

    /// Set the initial state (required).
    pub fn initial(mut self, state: S) -> Self {
        self.initial = Some(state);
        self
    }

    /// Set the machine's context record (required).
    pub fn context(mut self, context: C) -> Self {
        self.context = Some(context);
        self
    }

    /// Add a transition declaration.
    /// Returns an error if the declaration fails validation.
    pub fn transition(mut self, builder: TransitionBuilder<S, E, C>) -> Result<Self, BuildError> {
        self.transitions.extend(builder.build()?);
        Ok(self)
    }

    /// Add a pre-built transition entry.
    pub fn add_transition(mut self, transition: Transition<S, E, C>) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Add multiple pre-built transition entries at once.
    pub fn transitions(mut self, transitions: Vec<Transition<S, E, C>>) -> Self {
        self.transitions.extend(transitions);
        self
    }

    /// Register a subscriber for an event at construction time.
    pub fn subscribe(mut self, event: impl Into<String>, callback: SubscriberFn<E, C>) -> Self {
        self.subscriptions.push((event.into(), callback, false));
        self
    }

    /// Register a one-shot subscriber at construction time.
    pub fn subscribe_once(mut self, event: impl Into<String>, callback: SubscriberFn<E, C>) -> Self {
        self.subscriptions.push((event.into(), callback, true));
        self
    }

    /// Attach a child machine under a name.
    pub fn child(mut self, name: impl Into<String>, machine: Machine<S, E, C>) -> Self {
        self.children.push((name.into(), machine));
        self
    }

    /// Bound the history log to the most recent `capacity` transitions.
    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = Some(capacity);
        self
    }

    /// Build the machine.
    /// Returns an error if required fields are missing or a declared name
    /// collides with a reserved engine member.
    pub fn build(self) -> Result<Machine<S, E, C>, BuildError> {
        let initial = self.initial.ok_or(BuildError::MissingInitialState)?;
        let context = self.context.ok_or(BuildError::MissingContext)?;

        if self.transitions.is_empty() {
            return Err(BuildError::NoTransitions);
        }

        let mut declared: Vec<String> = vec![initial.name().to_string()];
        for transition in &self.transitions {
            declared.push(transition.from.name().to_string());
            declared.push(transition.to.name().to_string());
            declared.push(transition.event.clone());
        }
        for (event, _, _) in &self.subscriptions {
            declared.push(event.clone());
        }
        for (name, _) in &self.children {
            declared.push(name.clone());
        }
        for name in declared {
            if collides_with_reserved(&name) {
                return Err(BuildError::NameCollision { name });
            }
        }

        let mut machine = Machine::new(initial, context);
        if let Some(capacity) = self.history_capacity {
            machine.set_history(HistoryLog::with_capacity(capacity));
        }
        for transition in self.transitions {
            machine.add_transition(transition);
        }
        for (event, callback, once) in self.subscriptions {
            if once {
                machine.once(event, callback);
            } else {
                machine.on(event, callback);
            }
        }
        for (name, child) in self.children {
            machine.add_child(name, child);
        }

        Ok(machine)
    }
}

impl<S, E, C> Default for MachineBuilder<S, E, C>
where
    S: State + 'static,
    E: Event,
    C: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
