//! Session states

use serde::{Deserialize, Serialize};

/// The six states of a recognition session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No session running
    #[default]
    Idle,
    /// Recognizer started, waiting for speech
    Listening,
    /// Speech detected
    Speaking,
    /// Speech ended, waiting for the final result
    Processing,
    /// Transient error, restart pending
    Retrying,
    /// Network error, recovery restart pending
    NetworkRecovering,
}

impl SessionState {
    /// Whether a recognizer handle is currently capturing or processing
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            SessionState::Listening | SessionState::Speaking | SessionState::Processing
        )
    }

    /// Whether a restart timer owns the next step
    pub fn is_recovering(&self) -> bool {
        matches!(self, SessionState::Retrying | SessionState::NetworkRecovering)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Idle => write!(f, "Idle"),
            SessionState::Listening => write!(f, "Listening"),
            SessionState::Speaking => write!(f, "Speaking"),
            SessionState::Processing => write!(f, "Processing"),
            SessionState::Retrying => write!(f, "Retrying"),
            SessionState::NetworkRecovering => write!(f, "NetworkRecovering"),
        }
    }
}
