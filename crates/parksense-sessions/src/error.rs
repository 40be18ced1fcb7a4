//! Error types for session handling.

use thiserror::Error;

use crate::state::ViewState;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors raised when a caller insists on a transition that did not happen.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The trigger is not accepted in the current view.
    #[error("Trigger '{trigger}' is not accepted in the {state} view")]
    TransitionRejected {
        state: ViewState,
        trigger: &'static str,
    },

    /// The session reached a view other than the one the caller needed.
    #[error("Expected the {expected} view, session is in {actual}")]
    UnexpectedView { expected: ViewState, actual: ViewState },
}
