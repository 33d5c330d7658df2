//! Runnable reminder service.
//!
//! Wires clock events and external control requests into the state machine
//! and runs the process-lifetime loop. Shows are dispatched onto their own
//! threads so a sink that blocks waiting for the user never delays the run
//! loop or shutdown.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use tracing::{debug, info};

use crate::clock::{ClockEvent, ReminderClock};
use crate::config::ReminderConfig;
use crate::error::{EyesError, Result};
use crate::machine::{ReminderSnapshot, ReminderState, ReminderStateMachine, ShowOutcome};
use crate::notification::NotificationSink;

pub struct ReminderService {
    config: ReminderConfig,
    clock: Arc<ReminderClock>,
    machine: Arc<ReminderStateMachine>,
    events: Mutex<Option<Receiver<ClockEvent>>>,
}

impl ReminderService {
    /// Builds a service. Fails with [`EyesError::SinkUnavailable`] if the
    /// sink's probe reports no notification capability.
    pub fn new(config: ReminderConfig, sink: Arc<dyn NotificationSink>) -> Result<Self> {
        sink.probe().map_err(EyesError::SinkUnavailable)?;

        let (tx, rx) = mpsc::channel();
        let clock = Arc::new(ReminderClock::new(config.interval(), config.snooze(), tx));
        let machine = Arc::new(ReminderStateMachine::new(
            config.clone(),
            sink,
            Arc::clone(&clock),
        ));

        Ok(Self {
            config,
            clock,
            machine,
            events: Mutex::new(Some(rx)),
        })
    }

    pub fn config(&self) -> &ReminderConfig {
        &self.config
    }

    pub fn state(&self) -> ReminderState {
        self.machine.state()
    }

    pub fn snapshot(&self) -> ReminderSnapshot {
        self.machine.snapshot()
    }

    /// Handle for driving the service from other threads (signal watchers,
    /// tray menus).
    pub fn control(&self) -> ServiceControl {
        ServiceControl {
            machine: Arc::clone(&self.machine),
        }
    }

    pub fn on_external_show_request(&self) -> JoinHandle<ShowOutcome> {
        self.control().show_now()
    }

    pub fn on_external_stop_request(&self) {
        self.control().stop();
    }

    /// Starts the clock and processes events until shutdown. Can only be
    /// called once per service.
    pub fn run(&self) -> Result<()> {
        let events = self
            .events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(EyesError::AlreadyRunning)?;

        info!(
            interval_secs = self.config.interval().as_secs(),
            snooze_secs = self.config.snooze().as_secs(),
            advanced_mode = self.config.advanced_mode(),
            "Eye break reminder started"
        );
        self.clock.start();

        let poll = self.config.poll_interval();
        while self.machine.is_running() {
            match events.recv_timeout(poll) {
                Ok(event) => self.dispatch(event),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        self.clock.stop();
        let snapshot = self.machine.snapshot();
        info!(
            shown = snapshot.shown_count,
            snoozed = snapshot.snoozed_count,
            failed = snapshot.failed_count,
            "Eye break reminder stopped"
        );
        Ok(())
    }

    fn dispatch(&self, event: ClockEvent) {
        // Event may have been queued before shutdown.
        if !self.machine.is_running() {
            return;
        }

        match event {
            ClockEvent::Due => {
                debug!("Reminder due");
                let machine = Arc::clone(&self.machine);
                thread::spawn(move || machine.request_show());
            }
            ClockEvent::SnoozeElapsed => {
                let machine = Arc::clone(&self.machine);
                thread::spawn(move || machine.on_snooze_elapsed());
            }
            ClockEvent::AutoDismiss { generation } => self.machine.on_auto_dismiss(generation),
        }
    }
}

/// Cloneable control surface for a [`ReminderService`].
#[derive(Clone)]
pub struct ServiceControl {
    machine: Arc<ReminderStateMachine>,
}

impl ServiceControl {
    /// Shows a reminder now, even if one is already showing.
    pub fn show_now(&self) -> JoinHandle<ShowOutcome> {
        info!("Received request to show reminder");
        let machine = Arc::clone(&self.machine);
        thread::spawn(move || machine.force_show())
    }

    /// Graceful stop. The run loop exits within one poll interval.
    pub fn stop(&self) {
        info!("Received shutdown request");
        self.machine.shutdown();
    }

    pub fn is_running(&self) -> bool {
        self.machine.is_running()
    }

    pub fn state(&self) -> ReminderState {
        self.machine.state()
    }
}
