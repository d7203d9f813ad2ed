//! Builder API for ergonomic machine construction.
//!
//! This module provides fluent builders, positional shorthands, and the
//! declaration macros for states, events, and the synthesized call
//! surface. Construction-time validation lives here: required fields and
//! the reserved-name collision check both fail `build` with a
//! [`BuildError`].

pub mod error;
pub mod machine;
pub mod macros;
pub mod transition;

pub use error::BuildError;
pub use machine::MachineBuilder;
pub use transition::TransitionBuilder;

use crate::core::{Context, Event, State};
use crate::machine::Transition;

/// Create a simple unconditional transition.
///
/// # Example
///
/// ```
/// use statecraft::builder::transition;
/// use statecraft::{event_enum, state_enum};
///
/// state_enum! {
///     enum LightState { Red, Green }
/// }
///
/// event_enum! {
///     enum LightEvent { Advance }
/// }
///
/// let entry: statecraft::machine::Transition<LightState, LightEvent, ()> =
///     transition(LightState::Red, "Advance", LightState::Green);
/// assert_eq!(entry.event, "Advance");
/// ```
pub fn transition<S, E, C>(from: S, event: &str, to: S) -> Transition<S, E, C>
where
    S: State + 'static,
    E: Event,
    C: Send + Sync + 'static,
{
    TransitionBuilder::new()
        .from(from)
        .on(event)
        .to(to)
        .build()
        .expect("single-source transition should always build")
        .into_iter()
        .next()
        .expect("single-source declaration expands to one entry")
}

/// Create a transition guarded by a synchronous predicate.
pub fn guarded<S, E, C, F>(from: S, event: &str, to: S, predicate: F) -> Transition<S, E, C>
where
    S: State + 'static,
    E: Event,
    C: Send + Sync + 'static,
    F: Fn(&Context<C>, &E) -> bool + Send + Sync + 'static,
{
    TransitionBuilder::new()
        .from(from)
        .on(event)
        .to(to)
        .when(predicate)
        .build()
        .expect("single-source transition should always build")
        .into_iter()
        .next()
        .expect("single-source declaration expands to one entry")
}
