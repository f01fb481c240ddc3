//! Timer scheduling for the session controller
//!
//! The controller never sleeps. It arms timers through a [`Scheduler`] and
//! is told about each firing by id through its input channel.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::trace;

use super::controller::ControllerInput;

/// Identifies one armed timer
pub type TimerId = u64;

/// Arms and disarms one-shot timers
pub trait Scheduler: Send {
    /// Arm a timer that fires once after `delay`
    fn arm(&mut self, delay: Duration) -> TimerId;

    /// Forget a timer; it must not fire afterwards. Disarming an unknown
    /// or already fired timer is a no-op.
    fn disarm(&mut self, id: TimerId);
}

/// [`Scheduler`] backed by tokio tasks that post
/// [`ControllerInput::TimerFired`] back to the controller
pub struct TokioScheduler {
    input_tx: mpsc::UnboundedSender<ControllerInput>,
    next_id: TimerId,
    tasks: HashMap<TimerId, JoinHandle<()>>,
}

impl TokioScheduler {
    pub fn new(input_tx: mpsc::UnboundedSender<ControllerInput>) -> Self {
        Self {
            input_tx,
            next_id: 1,
            tasks: HashMap::new(),
        }
    }

    /// Number of timers that have not fired or been disarmed
    pub fn pending(&self) -> usize {
        self.tasks.values().filter(|task| !task.is_finished()).count()
    }
}

impl Scheduler for TokioScheduler {
    fn arm(&mut self, delay: Duration) -> TimerId {
        self.tasks.retain(|_, task| !task.is_finished());

        let id = self.next_id;
        self.next_id += 1;

        let input_tx = self.input_tx.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = input_tx.send(ControllerInput::TimerFired(id));
        });
        self.tasks.insert(id, task);

        trace!(id, delay_ms = delay.as_millis() as u64, "timer armed");
        id
    }

    fn disarm(&mut self, id: TimerId) {
        if let Some(task) = self.tasks.remove(&id) {
            task.abort();
            trace!(id, "timer disarmed");
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for task in self.tasks.values() {
            task.abort();
        }
    }
}
