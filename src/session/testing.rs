//! Test doubles for the session controller ports

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::dispatch::ActionDispatcher;
use crate::interpreter::Command;
use crate::recognizer::{
    RecognitionHandle, Recognizer, RecognizerError, RecognizerSettings, SessionId,
};

use super::timer::{Scheduler, TimerId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleCall {
    Start(SessionId),
    Stop(SessionId),
    Abort(SessionId),
}

#[derive(Debug, Default)]
struct RecognizerLog {
    opened: Vec<(SessionId, RecognizerSettings)>,
    calls: Vec<HandleCall>,
    fail_open: bool,
    fail_stop: bool,
}

/// Recognizer that records what the controller asks of it
#[derive(Debug, Clone, Default)]
pub struct FakeRecognizer {
    log: Arc<Mutex<RecognizerLog>>,
}

impl FakeRecognizer {
    pub fn opened(&self) -> Vec<(SessionId, RecognizerSettings)> {
        self.log.lock().unwrap().opened.clone()
    }

    pub fn calls(&self) -> Vec<HandleCall> {
        self.log.lock().unwrap().calls.clone()
    }

    pub fn fail_open(&self) {
        self.log.lock().unwrap().fail_open = true;
    }

    /// Make stop and abort fail
    pub fn fail_stop(&self) {
        self.log.lock().unwrap().fail_stop = true;
    }
}

impl Recognizer for FakeRecognizer {
    fn open(
        &mut self,
        session: SessionId,
        settings: &RecognizerSettings,
    ) -> Result<Box<dyn RecognitionHandle>, RecognizerError> {
        let mut log = self.log.lock().unwrap();
        if log.fail_open {
            return Err(RecognizerError::Rejected("open refused".to_string()));
        }
        log.opened.push((session, settings.clone()));
        Ok(Box::new(FakeHandle {
            session,
            log: Arc::clone(&self.log),
        }))
    }
}

struct FakeHandle {
    session: SessionId,
    log: Arc<Mutex<RecognizerLog>>,
}

impl FakeHandle {
    fn record(&self, call: HandleCall, may_fail: bool) -> Result<(), RecognizerError> {
        let mut log = self.log.lock().unwrap();
        log.calls.push(call);
        if may_fail && log.fail_stop {
            return Err(RecognizerError::Detached(self.session));
        }
        Ok(())
    }
}

impl RecognitionHandle for FakeHandle {
    fn session(&self) -> SessionId {
        self.session
    }

    fn start(&mut self) -> Result<(), RecognizerError> {
        self.record(HandleCall::Start(self.session), false)
    }

    fn stop(&mut self) -> Result<(), RecognizerError> {
        self.record(HandleCall::Stop(self.session), true)
    }

    fn abort(&mut self) -> Result<(), RecognizerError> {
        self.record(HandleCall::Abort(self.session), true)
    }
}

#[derive(Debug, Default)]
struct Clock {
    now: Duration,
    next_id: TimerId,
    /// id -> (due, delay)
    armed: BTreeMap<TimerId, (Duration, Duration)>,
}

/// Scheduler on a virtual clock, advanced by the test
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    clock: Arc<Mutex<Clock>>,
}

impl ManualScheduler {
    pub fn now(&self) -> Duration {
        self.clock.lock().unwrap().now
    }

    pub fn set_now(&self, now: Duration) {
        self.clock.lock().unwrap().now = now;
    }

    /// Remove and return the earliest timer due at or before `until`,
    /// moving the clock to its due time
    pub fn pop_due(&self, until: Duration) -> Option<TimerId> {
        let mut clock = self.clock.lock().unwrap();
        let (id, due) = clock
            .armed
            .iter()
            .filter(|(_, (due, _))| *due <= until)
            .min_by_key(|(id, (due, _))| (*due, **id))
            .map(|(id, (due, _))| (*id, *due))?;
        clock.armed.remove(&id);
        clock.now = due;
        Some(id)
    }

    /// Delays of the timers still armed, in arming order
    pub fn armed_delays(&self) -> Vec<Duration> {
        self.clock
            .lock()
            .unwrap()
            .armed
            .values()
            .map(|(_, delay)| *delay)
            .collect()
    }

    pub fn armed_ids(&self) -> Vec<TimerId> {
        self.clock.lock().unwrap().armed.keys().copied().collect()
    }
}

impl Scheduler for ManualScheduler {
    fn arm(&mut self, delay: Duration) -> TimerId {
        let mut clock = self.clock.lock().unwrap();
        clock.next_id += 1;
        let id = clock.next_id;
        let due = clock.now + delay;
        clock.armed.insert(id, (due, delay));
        id
    }

    fn disarm(&mut self, id: TimerId) {
        self.clock.lock().unwrap().armed.remove(&id);
    }
}

/// Dispatcher that only records commands and removed ids
#[derive(Debug, Clone, Default)]
pub struct RecordingDispatcher {
    commands: Arc<Mutex<Vec<Command>>>,
    removed: Arc<Mutex<Vec<u64>>>,
}

impl RecordingDispatcher {
    pub fn commands(&self) -> Vec<Command> {
        self.commands.lock().unwrap().clone()
    }

    pub fn removed_ids(&self) -> Vec<u64> {
        self.removed.lock().unwrap().clone()
    }
}

impl ActionDispatcher for RecordingDispatcher {
    fn dispatch(&mut self, command: &Command, _locale: &str) {
        self.commands.lock().unwrap().push(command.clone());
    }

    fn remove_item(&mut self, id: u64, _locale: &str) {
        self.removed.lock().unwrap().push(id);
    }
}
