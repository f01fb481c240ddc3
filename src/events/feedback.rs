//! Speech and status feedback published to front-ends

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::{AssistantEvent, NoticeKind};

/// Cloneable handle for publishing [`AssistantEvent`]s.
///
/// Publishing never fails: with no subscriber attached the event is dropped.
#[derive(Debug, Clone)]
pub struct Feedback {
    event_tx: broadcast::Sender<AssistantEvent>,
}

impl Feedback {
    pub fn new(event_tx: broadcast::Sender<AssistantEvent>) -> Self {
        Self { event_tx }
    }

    /// New receiver for everything published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<AssistantEvent> {
        self.event_tx.subscribe()
    }

    /// Publish an event, returning the number of receivers that got it
    pub fn emit(&self, event: AssistantEvent) -> usize {
        debug!(%event, "emitting assistant event");
        self.event_tx.send(event).unwrap_or(0)
    }

    /// Replace the status line
    pub fn status(&self, message: impl Into<String>) {
        self.emit(AssistantEvent::Status {
            message: message.into(),
        });
    }

    /// Speak `text` in `locale`; fire and forget
    pub fn speak(&self, text: impl Into<String>, locale: &str) {
        self.emit(AssistantEvent::Speak {
            text: text.into(),
            locale: locale.to_string(),
        });
    }

    /// Surface a notice and mirror it on the status line
    pub fn notice(&self, kind: NoticeKind, message: impl Into<String>) {
        let message = message.into();
        if kind.is_error() {
            warn!(?kind, %message, "notice");
        } else {
            info!(?kind, %message, "notice");
        }
        self.status(message.clone());
        self.emit(AssistantEvent::Notice { kind, message });
    }

    /// Show or hide the manual retry control
    pub fn retry_control(&self, visible: bool) {
        self.emit(AssistantEvent::RetryControl { visible });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_without_subscribers_is_dropped() {
        let (tx, rx) = broadcast::channel(4);
        drop(rx);
        let feedback = Feedback::new(tx);
        assert_eq!(feedback.emit(AssistantEvent::RetryControl { visible: false }), 0);
    }

    #[test]
    fn test_notice_updates_status() {
        let (tx, mut rx) = broadcast::channel(4);
        let feedback = Feedback::new(tx);

        feedback.notice(NoticeKind::Offline, "offline");

        assert!(matches!(
            rx.try_recv().unwrap(),
            AssistantEvent::Status { message } if message == "offline"
        ));
        assert!(matches!(
            rx.try_recv().unwrap(),
            AssistantEvent::Notice { kind: NoticeKind::Offline, .. }
        ));
    }
}
