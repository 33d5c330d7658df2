//! OS signal wiring.
//!
//! Handlers only flip shared flags; a watcher thread turns them into
//! [`ServiceControl`] calls. SIGUSR1 shows a reminder now, SIGTERM and
//! SIGINT stop the daemon.

use eyes_core::ServiceControl;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, warn};

const WATCH_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlRequest {
    Show,
    Stop,
}

/// Flags set by the installed handlers.
#[derive(Debug, Clone, Default)]
pub struct SignalRequests {
    show: Arc<AtomicBool>,
    stop: Arc<AtomicBool>,
}

impl SignalRequests {
    /// Takes the pending request, if any. Stop wins over show.
    pub fn take_pending(&self) -> Option<ControlRequest> {
        if self.stop.swap(false, Ordering::SeqCst) {
            return Some(ControlRequest::Stop);
        }
        if self.show.swap(false, Ordering::SeqCst) {
            return Some(ControlRequest::Show);
        }
        None
    }
}

/// Installs the stop handler everywhere ctrlc supports and the show handler
/// on Unix. Can only succeed once per process. A missing show handler is
/// logged rather than fatal, since stop must keep working.
pub fn install() -> Result<SignalRequests, String> {
    let requests = SignalRequests::default();

    let stop = Arc::clone(&requests.stop);
    ctrlc::set_handler(move || stop.store(true, Ordering::SeqCst))
        .map_err(|err| format!("Failed to install stop handler: {}", err))?;

    if let Err(err) = install_show_handler(&requests) {
        warn!(error = %err, "Show-now signal unavailable");
    }
    Ok(requests)
}

#[cfg(unix)]
fn install_show_handler(requests: &SignalRequests) -> Result<(), String> {
    signal_hook::flag::register(signal_hook::consts::SIGUSR1, Arc::clone(&requests.show))
        .map(|_| ())
        .map_err(|err| format!("Failed to install SIGUSR1 handler: {}", err))
}

#[cfg(not(unix))]
fn install_show_handler(_requests: &SignalRequests) -> Result<(), String> {
    debug!("Show-now signal is only available on Unix hosts");
    Ok(())
}

/// Polls for signal requests until the service stops.
pub fn spawn_watcher(requests: SignalRequests, control: ServiceControl) -> JoinHandle<()> {
    thread::spawn(move || {
        while control.is_running() {
            match requests.take_pending() {
                Some(ControlRequest::Stop) => control.stop(),
                Some(ControlRequest::Show) => {
                    let _ = control.show_now();
                }
                None => thread::sleep(WATCH_INTERVAL),
            }
        }
        debug!("Signal watcher exiting");
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_wins_over_show() {
        let requests = SignalRequests::default();
        assert_eq!(requests.take_pending(), None);

        requests.show.store(true, Ordering::SeqCst);
        requests.stop.store(true, Ordering::SeqCst);
        assert_eq!(requests.take_pending(), Some(ControlRequest::Stop));
        assert_eq!(requests.take_pending(), Some(ControlRequest::Show));
        assert_eq!(requests.take_pending(), None);
    }

    #[cfg(unix)]
    #[test]
    fn raised_signals_become_requests() {
        let requests = install().expect("install handlers");
        assert!(install().is_err());
        assert_eq!(requests.take_pending(), None);

        // SAFETY: raise(3) delivers to this process; handlers are installed above.
        unsafe {
            libc::raise(libc::SIGUSR1);
        }
        assert_eq!(requests.take_pending(), Some(ControlRequest::Show));
        assert_eq!(requests.take_pending(), None);

        unsafe {
            libc::raise(libc::SIGTERM);
        }
        // ctrlc runs its handler on its own thread.
        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        let mut seen = None;
        while seen.is_none() && std::time::Instant::now() < deadline {
            seen = requests.take_pending();
            thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(seen, Some(ControlRequest::Stop));
    }
}
