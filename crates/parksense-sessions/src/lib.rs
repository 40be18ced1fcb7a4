//! ParkSense session flow
//!
//! A session walks one photo through `Home -> Camera -> Preview -> Analyzing ->
//! Results`. [`SessionState::apply`] holds the transition table;
//! [`SessionStateMachine`] wraps it for concurrent callers and runs the
//! analyzer while the session sits in `Analyzing`.

pub mod error;
pub mod machine;
pub mod state;

pub use error::{SessionError, SessionResult};
pub use machine::SessionStateMachine;
pub use state::{FailureKind, SessionEvent, SessionFailure, SessionState, Transition, ViewState};
