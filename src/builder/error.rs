//! Build errors for machine and transition builders.

use thiserror::Error;

/// Errors that can occur when building machines and transitions.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Initial state not specified. Call .initial(state) before .build()")]
    MissingInitialState,

    #[error("Context not specified. Call .context(ctx) before .build()")]
    MissingContext,

    #[error("No transitions defined. Add at least one transition")]
    NoTransitions,

    #[error("Transition source not specified. Call .from(state) or .from_any(states)")]
    MissingFromState,

    #[error("Transition event not specified. Call .on(event)")]
    MissingEvent,

    #[error("Transition target state not specified. Call .to(state)")]
    MissingToState,

    #[error("'{name}' collides with a reserved machine member")]
    NameCollision { name: String },
}
