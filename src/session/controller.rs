//! Recognition session controller
//!
//! Drives one recognizer handle at a time through its lifecycle, enforces
//! the inactivity window, and schedules restarts after errors, network loss
//! and normal session ends. All inputs arrive on one channel and are handled
//! one at a time, so no state here needs locking.

use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::dispatch::ActionDispatcher;
use crate::events::{AssistantEvent, Feedback, NoticeKind};
use crate::interpreter::{self, Command, Interpreter, LocaleInfo};
use crate::recognizer::{
    ErrorClass, LifecycleEvent, RecognitionErrorCode, RecognitionHandle, Recognizer,
    RecognizerError, RecognizerSettings, SessionId,
};

use super::state::SessionState;
use super::timer::{Scheduler, TimerId};

/// Everything the controller reacts to
#[derive(Debug, Clone)]
pub enum ControllerInput {
    /// User asked to start listening
    Start,
    /// User asked to stop listening
    Stop,
    /// User pressed the manual retry control
    Retry,
    /// Preferred recognition locale changed
    SetLocale(String),
    /// Environment connectivity changed
    Connectivity(bool),
    /// Callback from the recognizer handle of `session`
    Lifecycle {
        session: SessionId,
        event: LifecycleEvent,
    },
    /// A timer armed through the scheduler fired
    TimerFired(TimerId),
    /// Typed command text, interpreted without a confidence gate
    Text(String),
    /// Already structured command, e.g. from a search box
    Dispatch(Command),
    /// Remove one list entry by id
    RemoveItem(u64),
}

const READY_GREETING: &str = "Voice shopping assistant ready. Click the microphone to start.";

/// Events that greet a newly attached front-end. The ready status is left
/// out while a session is running.
pub fn ready_greeting(locale: &str, listening: bool) -> Vec<AssistantEvent> {
    let mut events = Vec::new();
    if let Some(info) = interpreter::locale(locale) {
        if !listening {
            events.push(AssistantEvent::Status {
                message: ready_status(info),
            });
        }
        events.push(hints_event(info));
    }
    events.push(AssistantEvent::Speak {
        text: READY_GREETING.to_string(),
        locale: locale.to_string(),
    });
    events
}

fn ready_status(info: &LocaleInfo) -> String {
    format!("Ready to listen in {}. {}", info.name, info.hints.add)
}

fn hints_event(info: &LocaleInfo) -> AssistantEvent {
    AssistantEvent::Hints {
        locale: info.code.to_string(),
        name: info.name.to_string(),
        add: info.hints.add.to_string(),
        remove: info.hints.remove.to_string(),
        search: info.hints.search.to_string(),
        clear: info.hints.clear.to_string(),
    }
}

/// Why a restart timer was armed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Restart {
    /// Transient recognizer error
    AfterError,
    /// Recognizer ended while the user still wants to listen
    AfterEnd,
    /// Network error recovery
    Network,
    /// Manual retry control
    Manual,
}

/// The recognition session state machine
pub struct SessionController<R, S, D>
where
    R: Recognizer,
    S: Scheduler,
    D: ActionDispatcher,
{
    config: SessionConfig,
    interpreter: Interpreter,
    recognizer: R,
    scheduler: S,
    dispatcher: D,
    feedback: Feedback,
    /// Preferred locale for the next recognizer handle
    locale: String,
    state: SessionState,
    state_entered_at: Instant,
    /// The one live recognizer handle
    handle: Option<Box<dyn RecognitionHandle>>,
    /// Session whose handle was asked to stop or abort; only its `Ended`
    /// is still meaningful
    released: Option<SessionId>,
    next_session: SessionId,
    /// User intent: keep restarting single-shot sessions
    should_be_listening: bool,
    online: bool,
    inactivity_timer: Option<TimerId>,
    restart_timer: Option<(TimerId, Restart)>,
}

impl<R, S, D> SessionController<R, S, D>
where
    R: Recognizer,
    S: Scheduler,
    D: ActionDispatcher,
{
    /// Create a controller in the Idle state
    pub fn new(
        config: SessionConfig,
        locale: &str,
        recognizer: R,
        scheduler: S,
        dispatcher: D,
        feedback: Feedback,
    ) -> Self {
        let locale = match interpreter::locale(locale) {
            Some(info) => info.code.to_string(),
            None => {
                warn!(locale, "unsupported locale, falling back to default");
                interpreter::DEFAULT_LOCALE.to_string()
            }
        };

        Self {
            config,
            interpreter: Interpreter::new(),
            recognizer,
            scheduler,
            dispatcher,
            feedback,
            locale,
            state: SessionState::Idle,
            state_entered_at: Instant::now(),
            handle: None,
            released: None,
            next_session: 1,
            should_be_listening: false,
            online: true,
            inactivity_timer: None,
            restart_timer: None,
        }
    }

    /// Get the current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn should_be_listening(&self) -> bool {
        self.should_be_listening
    }

    /// Session id of the live recognizer handle, if any
    pub fn current_session(&self) -> Option<SessionId> {
        self.handle.as_ref().map(|handle| handle.session())
    }

    /// Run the controller until the input channel closes
    pub async fn run(&mut self, mut input_rx: mpsc::UnboundedReceiver<ControllerInput>) {
        info!(locale = %self.locale, "session controller started in Idle state");

        while let Some(input) = input_rx.recv().await {
            self.handle_input(input);
        }

        info!("session controller stopped");
    }

    pub fn handle_input(&mut self, input: ControllerInput) {
        match input {
            ControllerInput::Start => self.start(),
            ControllerInput::Stop => self.stop(),
            ControllerInput::Retry => self.retry(),
            ControllerInput::SetLocale(locale) => self.set_locale(&locale),
            ControllerInput::Connectivity(online) => self.set_online(online),
            ControllerInput::Lifecycle { session, event } => self.handle_event(session, event),
            ControllerInput::TimerFired(id) => self.handle_timer(id),
            ControllerInput::Text(text) => self.process_text(&text),
            ControllerInput::Dispatch(command) => self.dispatch(command),
            ControllerInput::RemoveItem(id) => self.remove_item(id),
        }
    }

    /// Start a new listening session with a fresh recognizer handle
    pub fn start(&mut self) {
        if self.state.is_active() {
            debug!(state = %self.state, "start ignored, session already active");
            return;
        }

        if !self.online {
            self.feedback.notice(
                NoticeKind::Offline,
                "No internet connection. Voice recognition requires internet.",
            );
            self.feedback
                .speak("No internet connection. Please check your network.", &self.locale);
            self.transition_to(SessionState::Idle);
            return;
        }

        self.cancel_timers();

        let session = self.next_session;
        self.next_session += 1;
        let settings = RecognizerSettings::single_shot(&self.locale);

        let handle = match self.recognizer.open(session, &settings) {
            Ok(handle) => handle,
            Err(e) => {
                self.start_failed(session, e);
                return;
            }
        };
        self.bind_lifecycle_handlers(handle);

        let started = match self.handle.as_mut() {
            Some(handle) => handle.start(),
            None => Err(RecognizerError::Detached(session)),
        };
        if let Err(e) = started {
            self.start_failed(session, e);
            return;
        }

        self.should_be_listening = true;
        self.transition_to(SessionState::Listening);
        self.inactivity_timer = Some(self.scheduler.arm(self.config.timings.inactivity_timeout));
        info!(session, locale = %self.locale, "listening session started");
    }

    /// Stop listening. Idempotent, never fails.
    pub fn stop(&mut self) {
        self.cancel_timers();
        self.should_be_listening = false;

        if self.state.is_active() {
            if let Some(handle) = self.handle.as_mut() {
                self.released = Some(handle.session());
                if let Err(e) = handle.stop() {
                    debug!(?e, "recognizer stop failed, ignoring");
                }
            }
        }

        self.transition_to(SessionState::Idle);
    }

    /// Manual retry: reset and start again after the manual retry delay
    pub fn retry(&mut self) {
        self.feedback.status("Manually retrying voice recognition...");
        self.feedback.retry_control(false);

        self.cancel_timers();
        self.should_be_listening = false;
        if self.state.is_active() {
            self.abort_handle();
        }
        self.transition_to(SessionState::Idle);

        self.schedule_restart(Restart::Manual, self.config.timings.manual_retry_delay);
    }

    /// Change the locale used for the next recognizer handle
    pub fn set_locale(&mut self, code: &str) {
        let Some(info) = interpreter::locale(code) else {
            warn!(locale = code, "unsupported locale requested");
            self.feedback
                .status(format!("Language {code} is not supported. Keeping {}.", self.locale_name()));
            return;
        };

        self.locale = info.code.to_string();
        info!(locale = %self.locale, "locale changed");

        self.feedback
            .speak(format!("Language changed to {}", info.name), &self.locale);
        if !self.state.is_active() {
            self.show_locale_hint();
        }
    }

    /// Apply an online/offline signal from the environment
    pub fn set_online(&mut self, online: bool) {
        if self.online == online {
            return;
        }
        self.online = online;

        if online {
            info!("connectivity restored");
            self.feedback
                .status("Internet connection restored. Voice recognition available.");
            self.feedback.speak("Internet connection restored", &self.locale);
        } else {
            warn!("connectivity lost");
            self.feedback
                .status("Internet connection lost. Voice recognition unavailable.");
            self.feedback.speak("Internet connection lost", &self.locale);
            if self.state.is_active() {
                self.stop();
            }
        }
    }

    /// Interpret typed text and dispatch the command
    pub fn process_text(&mut self, text: &str) {
        let transcript = text.trim().to_lowercase();
        let command = self.interpreter.parse(&transcript);
        self.dispatch(command);
    }

    /// Hand a command to the dispatcher
    pub fn dispatch(&mut self, command: Command) {
        info!(kind = %command.kind(), item = ?command.item(), "dispatching command");
        self.feedback.emit(AssistantEvent::CommandHandled {
            command: command.clone(),
        });
        self.dispatcher.dispatch(&command, &self.locale);
    }

    /// Remove one list entry by id
    pub fn remove_item(&mut self, id: u64) {
        info!(id, "removing list entry");
        self.dispatcher.remove_item(id, &self.locale);
    }

    /// Handle a lifecycle callback from the recognizer handle of `session`
    pub fn handle_event(&mut self, session: SessionId, event: LifecycleEvent) {
        let current = self.current_session();
        if current != Some(session) {
            debug!(session, ?current, ?event, "ignoring event from stale recognizer handle");
            return;
        }
        if self.released == Some(session) && !matches!(event, LifecycleEvent::Ended) {
            debug!(session, ?event, "ignoring event from released recognizer handle");
            return;
        }

        if event.is_terminal() {
            self.disarm_inactivity();
        }

        match event {
            LifecycleEvent::Started => {
                if self.state == SessionState::Listening {
                    self.feedback.status("Listening... Speak now!");
                    self.feedback.speak("Listening", &self.locale);
                }
            }
            LifecycleEvent::SpeechDetected => {
                if self.state == SessionState::Listening {
                    self.transition_to(SessionState::Speaking);
                    self.feedback.status("Speech detected... Keep speaking!");
                }
            }
            LifecycleEvent::SpeechEnded => {
                if matches!(self.state, SessionState::Listening | SessionState::Speaking) {
                    self.transition_to(SessionState::Processing);
                    self.feedback.status("Processing your command...");
                }
            }
            LifecycleEvent::InterimResult { transcript } => {
                debug!(%transcript, "ignoring interim result");
            }
            LifecycleEvent::FinalResult {
                transcript,
                confidence,
            } => self.handle_final_result(&transcript, confidence),
            LifecycleEvent::NoMatch => {
                self.feedback.status("No speech match found. Please try again.");
                self.feedback
                    .speak("No speech match found. Please try again.", &self.locale);
            }
            LifecycleEvent::Error { code } => self.handle_error(&code),
            LifecycleEvent::Ended => self.handle_ended(),
        }
    }

    /// Handle a fired timer; ids that are no longer pending are stale
    pub fn handle_timer(&mut self, id: TimerId) {
        if self.inactivity_timer == Some(id) {
            self.inactivity_timer = None;
            self.scheduler.disarm(id);
            self.on_inactivity();
            return;
        }

        match self.restart_timer {
            Some((pending, restart)) if pending == id => {
                self.restart_timer = None;
                self.scheduler.disarm(id);
                self.on_restart(restart);
            }
            _ => debug!(id, "ignoring stale timer"),
        }
    }

    /// Install `handle` as the only handle whose callbacks are accepted.
    /// Every path that creates a handle goes through here.
    fn bind_lifecycle_handlers(&mut self, handle: Box<dyn RecognitionHandle>) {
        let session = handle.session();
        if let Some(mut previous) = self.handle.replace(handle) {
            let previous_session = previous.session();
            if self.released != Some(previous_session) {
                if let Err(e) = previous.abort() {
                    debug!(?e, session = previous_session, "aborting replaced handle failed, ignoring");
                }
            }
            debug!(previous = previous_session, session, "recognizer handle replaced");
        }
        self.released = None;
    }

    fn start_failed(&mut self, session: SessionId, error: RecognizerError) {
        warn!(session, ?error, "failed to start recognizer");
        self.handle = None;
        self.should_be_listening = false;

        let message = match error {
            RecognizerError::Unavailable => {
                "Speech recognition not available. Connect a recognizer front-end and try again."
            }
            _ => "Error starting voice recognition. Please try again.",
        };
        self.feedback.notice(NoticeKind::StartFailed, message);
        self.transition_to(SessionState::Idle);
    }

    fn handle_final_result(&mut self, transcript: &str, confidence: f32) {
        if !self.state.is_active() {
            debug!(state = %self.state, "ignoring final result outside an active session");
            return;
        }
        self.transition_to(SessionState::Processing);

        let transcript = transcript.trim().to_lowercase();
        info!(%transcript, confidence, "final result");
        self.feedback.status(format!("Heard: \"{transcript}\""));

        let recognized = self.interpreter.is_recognized(&transcript);
        if !recognized && confidence < self.config.confidence_floor {
            self.transition_to(SessionState::Idle);
            self.feedback
                .notice(NoticeKind::LowConfidence, "Command unclear. Please try again.");
            self.feedback
                .speak("Command unclear. Please try again.", &self.locale);
            return;
        }

        if recognized && confidence <= self.config.confidence_warning {
            warn!(%transcript, confidence, "low confidence but command looks valid");
            self.feedback.status(format!(
                "Processing: \"{transcript}\" (confidence was low but command looks valid)"
            ));
        }

        self.transition_to(SessionState::Idle);
        let command = self.interpreter.parse(&transcript);
        self.dispatch(command);
    }

    fn handle_error(&mut self, code: &str) {
        let code = RecognitionErrorCode::parse(code);
        let class = code.class();
        warn!(%code, ?class, "recognizer error");

        match class {
            ErrorClass::Network => self.handle_network_error(),
            ErrorClass::Transient => {
                self.feedback
                    .notice(NoticeKind::TransientRecognitionError, code.message());
                if self.should_be_listening {
                    let delay = self.config.timings.retry_delay;
                    self.feedback.speak(
                        format!("Voice recognition error. Retrying in {} seconds...", delay.as_secs()),
                        &self.locale,
                    );
                    self.transition_to(SessionState::Retrying);
                    self.schedule_restart(Restart::AfterError, delay);
                } else {
                    self.feedback
                        .speak("Voice recognition error. Please try again.", &self.locale);
                    self.transition_to(SessionState::Idle);
                }
            }
            ErrorClass::Fatal => {
                self.feedback
                    .notice(NoticeKind::FatalRecognitionError, code.message());
                self.feedback
                    .speak("Voice recognition error. Please try again.", &self.locale);
                self.cancel_timers();
                self.should_be_listening = false;
                self.transition_to(SessionState::Idle);
            }
        }
    }

    fn handle_network_error(&mut self) {
        self.feedback.notice(
            NoticeKind::NetworkError,
            "Network error detected. Trying alternative approach...",
        );
        self.feedback.retry_control(true);
        self.abort_handle();

        self.transition_to(SessionState::NetworkRecovering);
        self.schedule_restart(Restart::Network, self.config.timings.network_recovery_delay);
    }

    fn handle_ended(&mut self) {
        if let Some(handle) = self.handle.take() {
            debug!(session = handle.session(), "recognizer session ended");
        }
        self.released = None;

        if self.state.is_recovering() {
            debug!(state = %self.state, "session ended, restart already pending");
            return;
        }

        self.feedback.status("Ready to listen");
        self.transition_to(SessionState::Idle);
        if self.should_be_listening {
            self.schedule_restart(Restart::AfterEnd, self.config.timings.restart_delay);
        }
    }

    fn on_inactivity(&mut self) {
        if !self.state.is_active() {
            return;
        }
        info!(timeout_ms = self.config.timings.inactivity_timeout.as_millis() as u64, "no speech, stopping");
        self.feedback
            .notice(NoticeKind::InactivityTimeout, "No speech detected. Stopping...");
        self.feedback.speak("No speech detected. Stopping.", &self.locale);
        self.stop();
    }

    fn on_restart(&mut self, restart: Restart) {
        debug!(?restart, should_be_listening = self.should_be_listening, "restart timer fired");
        match restart {
            Restart::AfterError => {
                if self.should_be_listening {
                    self.feedback.status("Retrying voice recognition...");
                    self.start();
                } else {
                    self.transition_to(SessionState::Idle);
                }
            }
            Restart::AfterEnd => {
                if self.should_be_listening {
                    self.start();
                }
            }
            Restart::Network => {
                self.feedback.status("Retrying with network recovery...");
                self.transition_to(SessionState::Idle);
                self.start();
            }
            Restart::Manual => self.start(),
        }
    }

    /// Arm the single restart timer, replacing any pending one
    fn schedule_restart(&mut self, restart: Restart, delay: Duration) {
        if let Some((pending, _)) = self.restart_timer.take() {
            self.scheduler.disarm(pending);
        }
        let id = self.scheduler.arm(delay);
        debug!(id, ?restart, delay_ms = delay.as_millis() as u64, "restart scheduled");
        self.restart_timer = Some((id, restart));
    }

    fn disarm_inactivity(&mut self) {
        if let Some(id) = self.inactivity_timer.take() {
            self.scheduler.disarm(id);
        }
    }

    fn cancel_timers(&mut self) {
        self.disarm_inactivity();
        if let Some((id, _)) = self.restart_timer.take() {
            self.scheduler.disarm(id);
        }
    }

    fn abort_handle(&mut self) {
        if let Some(handle) = self.handle.as_mut() {
            self.released = Some(handle.session());
            if let Err(e) = handle.abort() {
                debug!(?e, "recognizer abort failed, ignoring");
            }
        }
    }

    fn locale_name(&self) -> &'static str {
        interpreter::locale_name(&self.locale)
    }

    fn show_locale_hint(&self) {
        if let Some(info) = interpreter::locale(&self.locale) {
            self.feedback.status(ready_status(info));
            self.feedback.emit(hints_event(info));
        }
    }

    /// Perform a state transition
    fn transition_to(&mut self, new_state: SessionState) {
        let old_state = self.state;
        if old_state == new_state {
            return;
        }
        let duration_ms = self.state_entered_at.elapsed().as_millis() as u64;

        info!(
            from = %old_state,
            to = %new_state,
            duration_ms = duration_ms,
            "session transition"
        );

        self.state = new_state;
        self.state_entered_at = Instant::now();
        self.feedback.emit(AssistantEvent::StateChanged {
            from: old_state,
            to: new_state,
            duration_ms,
        });
    }
}

impl<R, S, D> Drop for SessionController<R, S, D>
where
    R: Recognizer,
    S: Scheduler,
    D: ActionDispatcher,
{
    fn drop(&mut self) {
        self.stop();
    }
}
