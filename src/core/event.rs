//! Core Event trait for state machine events.
//!
//! Events drive transitions. An event value carries its arguments as
//! enum-variant fields; the `name` identifies the event independently of
//! any payload, and all transition lookup is keyed by it.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Trait for state machine events.
///
/// Events are drawn from a finite set separate from the state set. A
/// variant may carry payload fields; those are the arguments handed to
/// guards, handlers, and subscribers along with the event itself.
///
/// `name` must return the same label for every value of a given variant,
/// regardless of payload. The transition table, unknown-event detection,
/// and subscription fan-out all dispatch on this label.
///
/// # Example
///
/// ```rust
/// use statecraft::core::Event;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, Debug, Serialize, Deserialize)]
/// enum UploadEvent {
///     Start,
///     Finish { url: String },
/// }
///
/// impl Event for UploadEvent {
///     fn name(&self) -> &str {
///         match self {
///             Self::Start => "Start",
///             Self::Finish { .. } => "Finish",
///         }
///     }
/// }
///
/// let event = UploadEvent::Finish { url: "https://x".into() };
/// assert_eq!(event.name(), "Finish");
/// ```
pub trait Event:
    Clone + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync + 'static
{
    /// Get the event's name, independent of any payload.
    fn name(&self) -> &str;
}
