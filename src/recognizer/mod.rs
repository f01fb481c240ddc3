//! Speech recognizer port
//!
//! The platform recognizer lives outside the daemon. The session controller
//! talks to it through [`Recognizer`], which opens one
//! [`RecognitionHandle`] per session, and receives [`LifecycleEvent`]s
//! tagged with the [`SessionId`] of the handle that produced them.

mod bridge;
mod error_code;

use serde::{Deserialize, Serialize};

pub use bridge::{BridgeRecognizer, FrontendGuard, FrontendPresence};
pub use error_code::{ErrorClass, RecognitionErrorCode};

/// Identifies one recognizer handle; a new id is minted on every start
pub type SessionId = u64;

/// How a recognizer handle is configured
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognizerSettings {
    /// Recognition language, e.g. `en-US`
    pub locale: String,
    /// Keep listening after the first utterance
    pub continuous: bool,
    /// Report partial hypotheses
    pub interim_results: bool,
    pub max_alternatives: u8,
}

impl RecognizerSettings {
    /// Single-shot, final-results-only settings for `locale`
    pub fn single_shot(locale: &str) -> Self {
        Self {
            locale: locale.to_string(),
            continuous: false,
            interim_results: false,
            max_alternatives: 1,
        }
    }
}

/// Control request sent to the platform recognizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RecognizerAction {
    Start { settings: RecognizerSettings },
    Stop,
    Abort,
}

impl std::fmt::Display for RecognizerAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecognizerAction::Start { settings } => write!(f, "start ({})", settings.locale),
            RecognizerAction::Stop => write!(f, "stop"),
            RecognizerAction::Abort => write!(f, "abort"),
        }
    }
}

/// Lifecycle callbacks reported by the platform recognizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LifecycleEvent {
    Started,
    SpeechDetected,
    SpeechEnded,
    /// Partial hypothesis; never interpreted
    InterimResult { transcript: String },
    FinalResult { transcript: String, confidence: f32 },
    Error { code: String },
    NoMatch,
    Ended,
}

impl LifecycleEvent {
    /// Whether the event ends the wait for speech
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LifecycleEvent::FinalResult { .. } | LifecycleEvent::Error { .. } | LifecycleEvent::Ended
        )
    }
}

/// Errors raised by a recognizer or one of its handles
#[derive(Debug, thiserror::Error)]
pub enum RecognizerError {
    #[error("speech recognition is not available - no recognizer front-end attached")]
    Unavailable,

    #[error("recognizer handle for session {0} is no longer live")]
    Detached(SessionId),

    #[error("recognizer rejected the request: {0}")]
    Rejected(String),
}

/// Factory for recognizer handles
pub trait Recognizer: Send {
    /// Create a fresh, not yet started handle for `session`
    fn open(
        &mut self,
        session: SessionId,
        settings: &RecognizerSettings,
    ) -> Result<Box<dyn RecognitionHandle>, RecognizerError>;
}

/// One single-shot recognition session
pub trait RecognitionHandle: Send {
    fn session(&self) -> SessionId;
    fn start(&mut self) -> Result<(), RecognizerError>;
    /// Finish gracefully, delivering any pending result
    fn stop(&mut self) -> Result<(), RecognizerError>;
    /// Finish immediately, discarding any pending result
    fn abort(&mut self) -> Result<(), RecognizerError>;
}
