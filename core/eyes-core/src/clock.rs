//! Reminder timing.
//!
//! One background thread produces a `Due` event every interval. One-shot
//! timers (snooze, auto-dismiss) each get a short-lived thread and a slot
//! token; re-arming a slot replaces the token, which wakes and retires the
//! previous timer. Events are sent while holding the clock lock, so once
//! [`ReminderClock::stop`] returns nothing else is delivered.

use std::sync::mpsc::Sender;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEvent {
    Due,
    SnoozeElapsed,
    AutoDismiss { generation: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Snooze,
    AutoDismiss,
}

struct ClockInner {
    events: Sender<ClockEvent>,
    running: bool,
    stopped: bool,
    next_token: u64,
    snooze: Option<u64>,
    auto_dismiss: Option<u64>,
}

impl ClockInner {
    fn slot(&self, slot: Slot) -> Option<u64> {
        match slot {
            Slot::Snooze => self.snooze,
            Slot::AutoDismiss => self.auto_dismiss,
        }
    }

    fn slot_mut(&mut self, slot: Slot) -> &mut Option<u64> {
        match slot {
            Slot::Snooze => &mut self.snooze,
            Slot::AutoDismiss => &mut self.auto_dismiss,
        }
    }

    fn emit(&self, event: ClockEvent) {
        if self.events.send(event).is_err() {
            debug!(event = ?event, "Clock event dropped (receiver gone)");
        }
    }
}

struct Shared {
    inner: Mutex<ClockInner>,
    wake: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, ClockInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub struct ReminderClock {
    interval: Duration,
    snooze: Duration,
    shared: Arc<Shared>,
}

impl ReminderClock {
    pub fn new(interval: Duration, snooze: Duration, events: Sender<ClockEvent>) -> Self {
        Self {
            interval,
            snooze,
            shared: Arc::new(Shared {
                inner: Mutex::new(ClockInner {
                    events,
                    running: false,
                    stopped: false,
                    next_token: 0,
                    snooze: None,
                    auto_dismiss: None,
                }),
                wake: Condvar::new(),
            }),
        }
    }

    /// Starts the interval thread. Returns false (and does nothing) if the
    /// clock is already running or has been stopped.
    pub fn start(&self) -> bool {
        {
            let mut inner = self.shared.lock();
            if inner.running || inner.stopped {
                return false;
            }
            inner.running = true;
        }

        let shared = Arc::clone(&self.shared);
        let interval = self.interval;
        thread::spawn(move || interval_loop(shared, interval));
        debug!(interval_ms = self.interval.as_millis() as u64, "Clock started");
        true
    }

    /// Cancels the interval wait and every pending one-shot. Terminal: a
    /// stopped clock cannot be restarted.
    pub fn stop(&self) {
        {
            let mut inner = self.shared.lock();
            if inner.stopped {
                return;
            }
            inner.stopped = true;
            inner.running = false;
            inner.snooze = None;
            inner.auto_dismiss = None;
        }
        self.shared.wake.notify_all();
        debug!("Clock stopped");
    }

    /// Arms the snooze timer from now, replacing any pending one.
    pub fn schedule_snooze(&self) -> bool {
        self.arm(Slot::Snooze, self.snooze, ClockEvent::SnoozeElapsed)
    }

    /// Arms the auto-dismiss timer for the given show generation, replacing
    /// any pending one.
    pub fn schedule_auto_dismiss(&self, timeout: Duration, generation: u64) -> bool {
        self.arm(Slot::AutoDismiss, timeout, ClockEvent::AutoDismiss { generation })
    }

    pub fn cancel_auto_dismiss(&self) {
        self.disarm(Slot::AutoDismiss);
    }

    pub fn cancel_snooze(&self) {
        self.disarm(Slot::Snooze);
    }

    pub fn is_running(&self) -> bool {
        self.shared.lock().running
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.lock().stopped
    }

    pub fn has_pending_snooze(&self) -> bool {
        self.shared.lock().snooze.is_some()
    }

    pub fn has_pending_auto_dismiss(&self) -> bool {
        self.shared.lock().auto_dismiss.is_some()
    }

    fn arm(&self, slot: Slot, delay: Duration, event: ClockEvent) -> bool {
        let token = {
            let mut inner = self.shared.lock();
            if inner.stopped {
                return false;
            }
            inner.next_token += 1;
            let token = inner.next_token;
            *inner.slot_mut(slot) = Some(token);
            token
        };
        // Retire the timer this one replaces.
        self.shared.wake.notify_all();

        let shared = Arc::clone(&self.shared);
        let deadline = Instant::now() + delay;
        thread::spawn(move || {
            let guard = shared.lock();
            let (mut guard, due) = wait_until(&shared.wake, guard, deadline, |inner| {
                inner.stopped || inner.slot(slot) != Some(token)
            });
            if due {
                *guard.slot_mut(slot) = None;
                guard.emit(event);
            }
        });
        true
    }

    fn disarm(&self, slot: Slot) {
        self.shared.lock().slot_mut(slot).take();
        self.shared.wake.notify_all();
    }
}

impl Drop for ReminderClock {
    fn drop(&mut self) {
        self.stop();
    }
}

fn interval_loop(shared: Arc<Shared>, interval: Duration) {
    let mut deadline = Instant::now() + interval;
    let mut guard = shared.lock();
    loop {
        let (next, due) = wait_until(&shared.wake, guard, deadline, |inner| inner.stopped);
        guard = next;
        if !due {
            return;
        }

        guard.emit(ClockEvent::Due);

        deadline += interval;
        let now = Instant::now();
        if deadline <= now {
            // Fell behind (suspend, long stall): skip missed ticks.
            deadline = now + interval;
        }
    }
}

/// Waits on `wake` until `deadline` passes or `cancelled` holds. The second
/// value is true only when the deadline was reached without cancellation.
fn wait_until<'a>(
    wake: &Condvar,
    mut guard: MutexGuard<'a, ClockInner>,
    deadline: Instant,
    cancelled: impl Fn(&ClockInner) -> bool,
) -> (MutexGuard<'a, ClockInner>, bool) {
    loop {
        if cancelled(&guard) {
            return (guard, false);
        }
        let now = Instant::now();
        if now >= deadline {
            return (guard, true);
        }
        guard = match wake.wait_timeout(guard, deadline - now) {
            Ok((guard, _)) => guard,
            Err(err) => err.into_inner().0,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::{self, Receiver};

    const MS: Duration = Duration::from_millis(1);

    fn clock(interval_ms: u32, snooze_ms: u32) -> (ReminderClock, Receiver<ClockEvent>) {
        let (tx, rx) = mpsc::channel();
        (ReminderClock::new(MS * interval_ms, MS * snooze_ms, tx), rx)
    }

    #[test]
    fn start_is_idempotent() {
        let (clock, _rx) = clock(1_000, 1_000);
        assert!(clock.start());
        assert!(!clock.start());
        assert!(clock.is_running());
    }

    #[test]
    fn interval_delivers_due_events() {
        let (clock, rx) = clock(30, 1_000);
        clock.start();
        let event = rx.recv_timeout(MS * 1_000).expect("due event");
        assert_eq!(event, ClockEvent::Due);
        let event = rx.recv_timeout(MS * 1_000).expect("second due event");
        assert_eq!(event, ClockEvent::Due);
    }

    #[test]
    fn nothing_fires_after_stop() {
        let (clock, rx) = clock(40, 40);
        clock.start();
        clock.schedule_snooze();
        clock.schedule_auto_dismiss(MS * 40, 1);
        clock.stop();

        assert!(rx.recv_timeout(MS * 200).is_err());
        assert!(!clock.is_running());
        assert!(!clock.has_pending_snooze());
    }

    #[test]
    fn stopped_clock_cannot_restart_or_arm() {
        let (clock, _rx) = clock(40, 40);
        clock.stop();
        assert!(!clock.start());
        assert!(!clock.schedule_snooze());
    }

    #[test]
    fn rescheduling_snooze_replaces_pending_timer() {
        let (clock, rx) = clock(10_000, 80);
        clock.schedule_snooze();
        thread::sleep(MS * 40);
        clock.schedule_snooze();

        let started = Instant::now();
        let event = rx.recv_timeout(MS * 1_000).expect("snooze elapsed");
        assert_eq!(event, ClockEvent::SnoozeElapsed);
        // Measured from the second arm, not the first.
        assert!(started.elapsed() >= MS * 60);
        assert!(rx.recv_timeout(MS * 200).is_err());
    }

    #[test]
    fn auto_dismiss_carries_generation() {
        let (clock, rx) = clock(10_000, 10_000);
        clock.schedule_auto_dismiss(MS * 10, 7);
        let event = rx.recv_timeout(MS * 1_000).expect("auto dismiss");
        assert_eq!(event, ClockEvent::AutoDismiss { generation: 7 });
        assert!(!clock.has_pending_auto_dismiss());
    }

    #[test]
    fn cancelled_auto_dismiss_never_fires() {
        let (clock, rx) = clock(10_000, 10_000);
        clock.schedule_auto_dismiss(MS * 30, 1);
        clock.cancel_auto_dismiss();
        assert!(rx.recv_timeout(MS * 150).is_err());
    }
}
