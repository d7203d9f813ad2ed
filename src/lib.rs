//! Statecraft: ergonomic finite state machines with a layered runtime.
//!
//! Representing states and transitions is the trivial part of a state
//! machine. Statecraft focuses on the runtime around them: transitions
//! carry guards and enter/exit handlers, subscribers fan out per event in
//! registration order, a mutable context cell threads through every
//! callback of a dispatch, nested child machines receive cascaded
//! events, and every committed transition lands in a bounded history log.
//!
//! # Core Concepts
//!
//! - **State / Event**: label traits over user enums; event variants
//!   carry the dispatch arguments as payload fields
//! - **Machine**: one current state plus table, subscribers, context,
//!   history, and children, driven by the async `send`
//! - **Guards**: predicates evaluated in declaration order; the first
//!   admitting candidate wins
//! - **Handlers and subscribers**: awaited in a fixed order
//!   (subscribers, exit, state change, enter) and able to return
//!   follow-up events that run after the dispatch commits
//! - **Synthesized surface**: the [`machine_surface!`] macro generates
//!   per-event methods and per-state predicates over `send`/`can`/`is`
//!
//! # Example
//!
//! ```rust
//! use statecraft::{event_enum, state_enum, MachineBuilder, TransitionBuilder};
//!
//! state_enum! {
//!     pub enum JobState {
//!         Queued,
//!         Running,
//!         Done,
//!     }
//! }
//!
//! event_enum! {
//!     pub enum JobEvent {
//!         Start,
//!         Finish { exit_code: i32 },
//!     }
//! }
//!
//! #[derive(Default)]
//! pub struct JobCtx {
//!     pub exit_code: Option<i32>,
//! }
//!
//! let machine = MachineBuilder::new()
//!     .initial(JobState::Queued)
//!     .context(JobCtx::default())
//!     .transition(
//!         TransitionBuilder::new()
//!             .from(JobState::Queued)
//!             .on("Start")
//!             .to(JobState::Running),
//!     )?
//!     .transition(
//!         TransitionBuilder::new()
//!             .from(JobState::Running)
//!             .on("Finish")
//!             .to(JobState::Done)
//!             .on_enter(|ctx: &mut statecraft::Context<JobCtx>, event| {
//!                 if let JobEvent::Finish { exit_code } = event {
//!                     ctx.data.exit_code = Some(*exit_code);
//!                 }
//!                 None
//!             }),
//!     )?
//!     .build()?;
//!
//! assert!(machine.is(&JobState::Queued));
//! assert!(machine.history().is_empty());
//! # Ok::<(), statecraft::BuildError>(())
//! ```
//!
//! Driving the machine is async: `machine.send(JobEvent::Start).await`
//! resolves the transition, runs the composed handlers, and records
//! history.

pub mod builder;
pub mod core;
pub mod machine;
pub mod persist;

// Re-export commonly used types
pub use crate::builder::{BuildError, MachineBuilder, TransitionBuilder};
pub use crate::core::{Context, Event, HistoryLog, State, TransitionRecord};
pub use crate::machine::{HandlerStage, Machine, MachineError, Transition};
