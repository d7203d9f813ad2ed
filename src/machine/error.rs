//! Dispatch errors.

use thiserror::Error;

/// Which callback of a dispatch failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerStage {
    Guard,
    Subscriber,
    Exit,
    Enter,
}

impl std::fmt::Display for HandlerStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Guard => write!(f, "guard"),
            Self::Subscriber => write!(f, "subscriber"),
            Self::Exit => write!(f, "exit"),
            Self::Enter => write!(f, "enter"),
        }
    }
}

/// Errors surfaced by `send` and its synthesized aliases.
///
/// Exactly one of aborted or committed obtains for a dispatch: the first
/// three variants leave the machine untouched, while a `Handler` failure
/// in the enter stage means the state already advanced and only the
/// history append was skipped.
#[derive(Debug, Error)]
pub enum MachineError {
    /// The event is not declared by any transition in the table.
    #[error("event '{event}' is not declared by any transition")]
    UnknownEvent { event: String },

    /// The event is declared, but not from the current state.
    #[error("no transition from state '{state}' on event '{event}'")]
    InvalidTransition { state: String, event: String },

    /// Every candidate's guard returned false.
    #[error("every guard rejected event '{event}' in state '{state}'")]
    GuardRejected { state: String, event: String },

    /// A user-supplied callback failed.
    #[error("{stage} handler failed for event '{event}' ({from} -> {to}): {source}")]
    Handler {
        stage: HandlerStage,
        event: String,
        from: String,
        to: String,
        #[source]
        source: anyhow::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_render_their_context() {
        let err = MachineError::InvalidTransition {
            state: "Pending".to_string(),
            event: "Finish".to_string(),
        };
        assert!(err.to_string().contains("Pending"));
        assert!(err.to_string().contains("Finish"));

        let err = MachineError::Handler {
            stage: HandlerStage::Enter,
            event: "Finish".to_string(),
            from: "Pending".to_string(),
            to: "Completed".to_string(),
            source: anyhow::anyhow!("disk full"),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("enter"));
        assert!(rendered.contains("Pending -> Completed"));
        assert!(rendered.contains("disk full"));
    }

    #[test]
    fn errors_are_pattern_matchable() {
        let err = MachineError::UnknownEvent {
            event: "Nope".to_string(),
        };
        match err {
            MachineError::UnknownEvent { event } => assert_eq!(event, "Nope"),
            _ => panic!("expected UnknownEvent"),
        }
    }
}
