//! IPC message protocol definitions
//!
//! All messages are JSON-encoded, prefixed with a 4-byte little-endian length.

use serde::{Deserialize, Serialize};

use crate::events::AssistantEvent;
use crate::recognizer::{LifecycleEvent, SessionId};
use crate::session::SessionState;

/// Largest accepted frame body
pub const MAX_FRAME_LEN: usize = 1024 * 1024;

/// Requests from a front-end to the daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Ping to check connectivity
    Ping,

    /// Request current daemon status
    GetStatus,

    /// Receive every assistant event and host recognizer sessions
    Subscribe,

    /// Microphone button: start listening
    StartListening,

    /// Microphone button while listening
    StopListening,

    /// Manual retry control
    RetryListening,

    /// Change the recognition locale
    SetLocale { locale: String },

    /// Connectivity changed on the front-end's side
    SetOnline { online: bool },

    /// Lifecycle event from the platform recognizer of `session`
    Lifecycle {
        session: SessionId,
        event: LifecycleEvent,
    },

    /// Typed command text
    Command { text: String },

    /// Search box query
    Search { query: String },

    /// Remove button on a list entry
    RemoveItem { id: u64 },
}

/// Responses from daemon to front-end
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Pong response to ping
    Pong,

    /// Current daemon status
    Status(DaemonStatus),

    /// Subscription confirmed
    Subscribed,

    /// Request forwarded to the session controller
    Accepted,

    /// Error response
    Error { code: String, message: String },
}

impl Response {
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Response::Error {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

/// Push notification from daemon to front-end (for subscribed clients)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    /// An assistant event occurred
    Event { event: AssistantEvent },
}

/// Full daemon status snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonStatus {
    /// Daemon version
    pub version: String,

    /// Current session state
    pub state: SessionState,

    /// Recognition locale
    pub locale: String,

    /// Last connectivity signal
    pub online: bool,

    /// Whether a subscribed front-end can host the recognizer
    pub frontend_attached: bool,

    /// Uptime in seconds
    pub uptime_secs: u64,
}

impl DaemonStatus {
    pub fn new(locale: &str) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            state: SessionState::Idle,
            locale: locale.to_string(),
            online: true,
            frontend_attached: false,
            uptime_secs: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let req = Request::SetLocale {
            locale: "es-ES".to_string(),
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("set_locale"));
        assert!(json.contains("es-ES"));
    }

    #[test]
    fn test_lifecycle_request_from_json() {
        let json = r#"{"type":"lifecycle","session":4,"event":{"type":"final_result","transcript":"add milk","confidence":0.92}}"#;
        match serde_json::from_str::<Request>(json).unwrap() {
            Request::Lifecycle {
                session: 4,
                event: LifecycleEvent::FinalResult { transcript, .. },
            } => assert_eq!(transcript, "add milk"),
            other => panic!("unexpected request: {other:?}"),
        }
    }

    #[test]
    fn test_response_serialization() {
        let resp = Response::Status(DaemonStatus::new("en-US"));
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains(r#""type":"status""#));
        assert!(json.contains(r#""state":"idle""#));
    }

    #[test]
    fn test_notification_nests_event() {
        let notification = Notification::Event {
            event: AssistantEvent::RetryControl { visible: true },
        };
        let json = serde_json::to_value(&notification).unwrap();
        assert_eq!(json["type"], "event");
        assert_eq!(json["event"]["type"], "retry_control");
    }
}
