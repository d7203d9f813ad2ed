//! Core state machine types.
//!
//! This module contains the data layer of the machine:
//! - State and event labels via the `State` and `Event` traits
//! - The mutable `Context` cell shared by all handlers
//! - Handler type aliases for guards, transition handlers, and subscribers
//! - The bounded transition history log

mod context;
mod event;
mod handlers;
mod history;
mod state;

pub use context::Context;
pub use event::Event;
pub use handlers::{
    guard, guard_async, handler, handler_async, subscriber, subscriber_async, BoxFuture, GuardFn,
    HandlerFn, HandlerResult, SubscriberFn,
};
pub use history::{HistoryLog, TransitionRecord};
pub use state::State;
