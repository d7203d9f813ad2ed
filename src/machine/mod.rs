//! The imperative shell around the core types.
//!
//! This module hosts the dispatch engine and its collaborators:
//! - The declaration-ordered transition table
//! - The per-event subscriber registry
//! - The `Machine` itself, with the full runtime API
//! - The dispatch error taxonomy

mod engine;
mod error;
mod subscribers;
mod table;

pub use engine::Machine;
pub use error::{HandlerStage, MachineError};
pub use subscribers::{SubscriberEntry, SubscriberRegistry};
pub use table::{Transition, TransitionTable};
