//! Reminder state machine.
//!
//! ```text
//! Idle    --due-->                   Showing
//! Showing --Acknowledged/TimedOut--> Idle
//! Showing --Snoozed-->               Snoozed (+ snooze timer)
//! Snoozed --snooze elapsed-->        Showing
//! Snoozed --due-->                   Showing (pending snooze cancelled)
//! Showing --due/snooze elapsed-->    Showing (suppressed)
//! Idle    --snooze elapsed-->        Idle (stale timer, ignored)
//! any     --force show-->            Idle, then Showing
//! any     --shutdown-->              terminal (no further shows)
//! ```
//!
//! All transitions go through one mutex. The lock is released before the
//! sink is called and re-taken to apply the result; each show gets a
//! generation number so results and auto-dismiss timers belonging to a
//! superseded show are ignored. The auto-dismiss timer is armed before the
//! sink is called, so a sink that never returns cannot pin the machine in
//! Showing.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

use crate::clock::ReminderClock;
use crate::config::ReminderConfig;
use crate::notification::{ActionResult, NotificationRequest, NotificationSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Due,
    SnoozeElapsed,
    Forced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderState {
    Idle,
    Showing,
    Snoozed,
}

/// What a call to [`ReminderStateMachine::request_show`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowOutcome {
    /// The sink was called. Holds the action it reported, if any.
    Shown(Option<ActionResult>),
    /// A reminder was already showing, or a snooze timer outlived its
    /// snooze; nothing happened.
    Suppressed,
    /// The sink failed; state was returned to Idle.
    Failed,
    /// The machine has been shut down.
    Stopped,
}

/// Point-in-time view of the machine for status displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReminderSnapshot {
    pub state: ReminderState,
    pub running: bool,
    pub shown_count: u64,
    pub suppressed_count: u64,
    pub snoozed_count: u64,
    pub failed_count: u64,
    pub last_shown_at: Option<DateTime<Utc>>,
}

struct MachineInner {
    state: ReminderState,
    running: bool,
    generation: u64,
    shown_count: u64,
    suppressed_count: u64,
    snoozed_count: u64,
    failed_count: u64,
    last_shown_at: Option<DateTime<Utc>>,
}

pub struct ReminderStateMachine {
    config: ReminderConfig,
    sink: Arc<dyn NotificationSink>,
    clock: Arc<ReminderClock>,
    inner: Mutex<MachineInner>,
}

impl ReminderStateMachine {
    pub fn new(
        config: ReminderConfig,
        sink: Arc<dyn NotificationSink>,
        clock: Arc<ReminderClock>,
    ) -> Self {
        Self {
            config,
            sink,
            clock,
            inner: Mutex::new(MachineInner {
                state: ReminderState::Idle,
                running: true,
                generation: 0,
                shown_count: 0,
                suppressed_count: 0,
                snoozed_count: 0,
                failed_count: 0,
                last_shown_at: None,
            }),
        }
    }

    pub fn state(&self) -> ReminderState {
        self.lock().state
    }

    pub fn is_running(&self) -> bool {
        self.lock().running
    }

    pub fn snapshot(&self) -> ReminderSnapshot {
        let inner = self.lock();
        ReminderSnapshot {
            state: inner.state,
            running: inner.running,
            shown_count: inner.shown_count,
            suppressed_count: inner.suppressed_count,
            snoozed_count: inner.snoozed_count,
            failed_count: inner.failed_count,
            last_shown_at: inner.last_shown_at,
        }
    }

    /// Shows a reminder unless one is already showing.
    pub fn request_show(&self) -> ShowOutcome {
        self.show(Trigger::Due)
    }

    /// Discards any showing state and shows a reminder immediately.
    pub fn force_show(&self) -> ShowOutcome {
        self.show(Trigger::Forced)
    }

    /// Snooze timer fired. Only acts while Snoozed; a timer that outlived
    /// its snooze (the reminder was re-shown or acknowledged meanwhile) is
    /// suppressed.
    pub fn on_snooze_elapsed(&self) -> ShowOutcome {
        debug!("Snooze elapsed");
        self.show(Trigger::SnoozeElapsed)
    }

    /// Auto-dismiss timer fired for `generation`. Stale timers are ignored.
    pub fn on_auto_dismiss(&self, generation: u64) {
        debug!(generation, "Auto-dismiss timer fired");
        self.apply(generation, ActionResult::TimedOut);
    }

    /// Stops all further shows and cancels pending timers. A notification
    /// already on screen is left alone.
    pub fn shutdown(&self) {
        {
            let mut inner = self.lock();
            if !inner.running {
                return;
            }
            inner.running = false;
        }
        self.clock.stop();
        info!("Reminder shutdown requested");
    }

    fn show(&self, trigger: Trigger) -> ShowOutcome {
        let generation = {
            let mut inner = self.lock();
            if !inner.running {
                return ShowOutcome::Stopped;
            }
            let previous = inner.state;
            if trigger == Trigger::SnoozeElapsed && previous != ReminderState::Snoozed {
                inner.suppressed_count += 1;
                debug!(state = ?previous, "Stale snooze timer; suppressed");
                return ShowOutcome::Suppressed;
            }
            if trigger == Trigger::Forced {
                if previous != ReminderState::Idle {
                    debug!(from = ?previous, "Forced show resets state");
                }
                inner.state = ReminderState::Idle;
            }
            if inner.state == ReminderState::Showing {
                inner.suppressed_count += 1;
                debug!("Reminder already showing; suppressed");
                return ShowOutcome::Suppressed;
            }
            if previous == ReminderState::Snoozed {
                self.clock.cancel_snooze();
            }
            inner.state = ReminderState::Showing;
            inner.generation += 1;
            inner.shown_count += 1;
            inner.last_shown_at = Some(Utc::now());
            // Replaces any timer left by a superseded show.
            self.clock.schedule_auto_dismiss(self.config.auto_dismiss(), inner.generation);
            inner.generation
        };

        let offer_actions = self.sink.supports_actions();
        let request = NotificationRequest::reminder(&self.config, offer_actions);
        debug!(generation, actions = request.actions.len(), "Showing reminder");

        match self.sink.notify(&request) {
            Ok(Some(result)) => {
                self.apply(generation, result);
                ShowOutcome::Shown(Some(result))
            }
            Ok(None) => ShowOutcome::Shown(None),
            Err(err) => {
                warn!(error = %err, "Failed to show reminder notification");
                self.lock().failed_count += 1;
                self.apply(generation, ActionResult::TimedOut);
                ShowOutcome::Failed
            }
        }
    }

    fn apply(&self, generation: u64, result: ActionResult) {
        let mut inner = self.lock();
        if inner.generation != generation || inner.state != ReminderState::Showing {
            debug!(generation, result = ?result, "Ignoring result for superseded reminder");
            return;
        }
        if result != ActionResult::TimedOut {
            self.clock.cancel_auto_dismiss();
        }

        match result {
            ActionResult::Acknowledged => {
                inner.state = ReminderState::Idle;
                info!("Break acknowledged");
            }
            ActionResult::TimedOut => {
                inner.state = ReminderState::Idle;
                debug!("Reminder dismissed");
            }
            ActionResult::Snoozed if inner.running => {
                inner.state = ReminderState::Snoozed;
                inner.snoozed_count += 1;
                self.clock.schedule_snooze();
                info!(snooze_secs = self.config.snooze().as_secs(), "Reminder snoozed");
            }
            ActionResult::Snoozed => {
                inner.state = ReminderState::Idle;
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, MachineInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
