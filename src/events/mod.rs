//! Events module for assistant feedback
//!
//! Everything the daemon wants a front-end to show, say or do is published
//! as an [`AssistantEvent`] on a broadcast channel. Subscribed IPC clients
//! receive each event as a pushed frame.

mod feedback;

use serde::{Deserialize, Serialize};

use crate::dispatch::{ListItem, Product};
use crate::interpreter::Command;
use crate::recognizer::{RecognizerAction, SessionId};
use crate::session::SessionState;

pub use feedback::Feedback;

/// Category of a user-facing notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// The transcript matched no command
    UserInputUnrecognized,
    /// Recognizer error that clears on retry
    TransientRecognitionError,
    /// Recognizer error that needs user action
    FatalRecognitionError,
    /// Recognizer lost the network
    NetworkError,
    /// Nothing was heard within the session window
    InactivityTimeout,
    /// Listening was requested while offline
    Offline,
    /// A result was discarded for low confidence
    LowConfidence,
    /// The recognizer could not be created or started
    StartFailed,
}

impl NoticeKind {
    /// Whether the notice should be rendered as an error
    pub fn is_error(&self) -> bool {
        !matches!(self, NoticeKind::UserInputUnrecognized | NoticeKind::LowConfidence)
    }
}

/// Events published by the assistant
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AssistantEvent {
    /// The session controller changed state
    StateChanged {
        from: SessionState,
        to: SessionState,
        /// Time spent in `from`
        duration_ms: u64,
    },

    /// Replace the on-screen status line
    Status { message: String },

    /// Say something through speech output
    Speak { text: String, locale: String },

    /// Error or warning surfaced to the user
    Notice { kind: NoticeKind, message: String },

    /// Show or hide the manual retry control
    RetryControl { visible: bool },

    /// Request for the front-end hosting the platform recognizer
    Recognizer {
        session: SessionId,
        action: RecognizerAction,
    },

    /// A command reached the dispatcher
    CommandHandled { command: Command },

    /// The shopping list changed
    ListChanged { items: Vec<ListItem> },

    /// Catalog search results
    SearchResults { query: String, results: Vec<Product> },

    /// Refreshed suggestion tips
    Suggestions { tips: Vec<String> },

    /// Help text to display
    Help { text: String },

    /// Example phrases for every command in the active locale
    Hints {
        locale: String,
        name: String,
        add: String,
        remove: String,
        search: String,
        clear: String,
    },
}

impl std::fmt::Display for AssistantEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssistantEvent::StateChanged { from, to, duration_ms } => {
                write!(f, "STATE_CHANGED {} -> {} ({}ms)", from, to, duration_ms)
            }
            AssistantEvent::Status { message } => write!(f, "STATUS {}", message),
            AssistantEvent::Speak { text, locale } => write!(f, "SPEAK [{}] {}", locale, text),
            AssistantEvent::Notice { kind, message } => {
                write!(f, "NOTICE {:?}: {}", kind, message)
            }
            AssistantEvent::RetryControl { visible } => write!(f, "RETRY_CONTROL {}", visible),
            AssistantEvent::Recognizer { session, action } => {
                write!(f, "RECOGNIZER #{} {}", session, action)
            }
            AssistantEvent::CommandHandled { command } => {
                write!(f, "COMMAND_HANDLED {}", command.kind())
            }
            AssistantEvent::ListChanged { items } => write!(f, "LIST_CHANGED ({} items)", items.len()),
            AssistantEvent::SearchResults { query, results } => {
                write!(f, "SEARCH_RESULTS {:?} ({} results)", query, results.len())
            }
            AssistantEvent::Suggestions { tips } => write!(f, "SUGGESTIONS ({} tips)", tips.len()),
            AssistantEvent::Help { .. } => write!(f, "HELP"),
            AssistantEvent::Hints { locale, name, .. } => write!(f, "HINTS [{}] {}", locale, name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = AssistantEvent::StateChanged {
            from: SessionState::Listening,
            to: SessionState::Speaking,
            duration_ms: 1500,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("state_changed"));
        assert!(json.contains("listening"));
        assert!(json.contains("1500"));
    }

    #[test]
    fn test_notice_serialization() {
        let event = AssistantEvent::Notice {
            kind: NoticeKind::InactivityTimeout,
            message: "No speech detected. Stopping...".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"notice""#));
        assert!(json.contains("inactivity_timeout"));
    }

    #[test]
    fn test_event_deserialization() {
        let json = r#"{"type":"retry_control","visible":true}"#;
        let event: AssistantEvent = serde_json::from_str(json).unwrap();
        assert!(matches!(event, AssistantEvent::RetryControl { visible: true }));
    }

    #[test]
    fn test_notice_severity() {
        assert!(NoticeKind::FatalRecognitionError.is_error());
        assert!(!NoticeKind::UserInputUnrecognized.is_error());
    }
}
