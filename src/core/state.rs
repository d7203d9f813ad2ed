//! Core State trait for state machine states.
//!
//! All state machine states must implement this trait. States are opaque
//! labels drawn from a user-enumerated finite set, comparable by equality.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Trait for state machine states.
///
/// States are immutable values that describe the current position in a
/// state machine. The `name` is used for display, logging, and the
/// reserved-name validation performed at construction time.
///
/// # Required Traits
///
/// - `Clone`: States must be cloneable for history tracking
/// - `PartialEq`: States must be comparable for transition lookup
/// - `Debug`: States must be debuggable for diagnostics
/// - `Serialize` + `Deserialize`: States must be serializable so history
///   snapshots can be persisted
///
/// # Example
///
/// ```rust
/// use statecraft::core::State;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum UploadState {
///     Pending,
///     Uploading,
///     Completed,
///     Failed,
/// }
///
/// impl State for UploadState {
///     fn name(&self) -> &str {
///         match self {
///             Self::Pending => "Pending",
///             Self::Uploading => "Uploading",
///             Self::Completed => "Completed",
///             Self::Failed => "Failed",
///         }
///     }
/// }
///
/// assert_eq!(UploadState::Pending.name(), "Pending");
/// ```
pub trait State:
    Clone + PartialEq + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync
{
    /// Get the state's name for display/logging.
    ///
    /// Returns a static string reference for zero-cost naming.
    fn name(&self) -> &str;
}
