//! Recognizer bridged to an IPC front-end
//!
//! The daemon cannot reach the platform speech recognizer itself. Instead,
//! each handle publishes start/stop/abort requests as
//! [`AssistantEvent::Recognizer`] and the front-end reports lifecycle events
//! back over IPC, tagged with the session id it was given.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::events::{AssistantEvent, Feedback};

use super::{
    RecognitionHandle, Recognizer, RecognizerAction, RecognizerError, RecognizerSettings,
    SessionId,
};

/// Counts the subscribed front-ends able to host a recognizer
#[derive(Debug, Clone, Default)]
pub struct FrontendPresence {
    attached: Arc<AtomicUsize>,
}

impl FrontendPresence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a front-end for as long as the guard lives
    pub fn attach(&self) -> FrontendGuard {
        self.attached.fetch_add(1, Ordering::SeqCst);
        FrontendGuard {
            attached: Arc::clone(&self.attached),
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst) > 0
    }
}

/// Keeps one front-end registered until dropped
#[derive(Debug)]
pub struct FrontendGuard {
    attached: Arc<AtomicUsize>,
}

impl Drop for FrontendGuard {
    fn drop(&mut self) {
        self.attached.fetch_sub(1, Ordering::SeqCst);
    }
}

/// [`Recognizer`] whose handles are driven by an IPC front-end
pub struct BridgeRecognizer {
    feedback: Feedback,
    presence: FrontendPresence,
}

impl BridgeRecognizer {
    pub fn new(feedback: Feedback, presence: FrontendPresence) -> Self {
        Self { feedback, presence }
    }
}

impl Recognizer for BridgeRecognizer {
    fn open(
        &mut self,
        session: SessionId,
        settings: &RecognizerSettings,
    ) -> Result<Box<dyn RecognitionHandle>, RecognizerError> {
        if !self.presence.is_attached() {
            return Err(RecognizerError::Unavailable);
        }

        Ok(Box::new(BridgeHandle {
            session,
            settings: settings.clone(),
            feedback: self.feedback.clone(),
            presence: self.presence.clone(),
            finished: false,
        }))
    }
}

struct BridgeHandle {
    session: SessionId,
    settings: RecognizerSettings,
    feedback: Feedback,
    presence: FrontendPresence,
    finished: bool,
}

impl BridgeHandle {
    fn request(&self, action: RecognizerAction) -> Result<(), RecognizerError> {
        if !self.presence.is_attached() {
            return Err(RecognizerError::Unavailable);
        }
        debug!(session = self.session, %action, "recognizer request");
        self.feedback.emit(AssistantEvent::Recognizer {
            session: self.session,
            action,
        });
        Ok(())
    }

    fn finish(&mut self, action: RecognizerAction) -> Result<(), RecognizerError> {
        if self.finished {
            return Err(RecognizerError::Detached(self.session));
        }
        self.finished = true;
        self.request(action)
    }
}

impl RecognitionHandle for BridgeHandle {
    fn session(&self) -> SessionId {
        self.session
    }

    fn start(&mut self) -> Result<(), RecognizerError> {
        if self.finished {
            return Err(RecognizerError::Detached(self.session));
        }
        self.request(RecognizerAction::Start {
            settings: self.settings.clone(),
        })
    }

    fn stop(&mut self) -> Result<(), RecognizerError> {
        self.finish(RecognizerAction::Stop)
    }

    fn abort(&mut self) -> Result<(), RecognizerError> {
        self.finish(RecognizerAction::Abort)
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::broadcast;

    use super::*;

    fn bridge() -> (BridgeRecognizer, FrontendPresence, broadcast::Receiver<AssistantEvent>) {
        let (tx, rx) = broadcast::channel(16);
        let presence = FrontendPresence::new();
        (BridgeRecognizer::new(Feedback::new(tx), presence.clone()), presence, rx)
    }

    #[test]
    fn test_open_requires_frontend() {
        let (mut recognizer, _presence, _rx) = bridge();
        let result = recognizer.open(1, &RecognizerSettings::single_shot("en-US"));
        assert!(matches!(result, Err(RecognizerError::Unavailable)));
    }

    #[test]
    fn test_handle_publishes_requests() {
        let (mut recognizer, presence, mut rx) = bridge();
        let _guard = presence.attach();

        let mut handle = recognizer
            .open(7, &RecognizerSettings::single_shot("es-ES"))
            .unwrap();
        handle.start().unwrap();
        handle.stop().unwrap();

        match rx.try_recv().unwrap() {
            AssistantEvent::Recognizer {
                session: 7,
                action: RecognizerAction::Start { settings },
            } => assert_eq!(settings.locale, "es-ES"),
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(matches!(
            rx.try_recv().unwrap(),
            AssistantEvent::Recognizer { session: 7, action: RecognizerAction::Stop }
        ));
    }

    #[test]
    fn test_finished_handle_is_detached() {
        let (mut recognizer, presence, _rx) = bridge();
        let _guard = presence.attach();

        let mut handle = recognizer
            .open(3, &RecognizerSettings::single_shot("en-US"))
            .unwrap();
        handle.abort().unwrap();
        assert!(matches!(handle.stop(), Err(RecognizerError::Detached(3))));
        assert!(matches!(handle.start(), Err(RecognizerError::Detached(3))));
    }

    #[test]
    fn test_guard_detaches_on_drop() {
        let presence = FrontendPresence::new();
        let guard = presence.attach();
        assert!(presence.is_attached());
        drop(guard);
        assert!(!presence.is_attached());
    }
}
