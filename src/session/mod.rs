//! Recognition session management
//!
//! Implements the listening session state machine:
//! - Idle: no recognizer running
//! - Listening / Speaking / Processing: one recognizer handle is live
//! - Retrying / NetworkRecovering: a restart timer owns the next step
//!
//! Only [`SessionController`] changes the state, and at most one restart
//! timer is ever pending.

mod controller;
mod state;
mod timer;

#[cfg(test)]
mod testing;

pub use controller::{ready_greeting, ControllerInput, SessionController};
pub use state::SessionState;
pub use timer::TokioScheduler;
