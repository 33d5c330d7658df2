//! Eyes daemon entrypoint.
//!
//! Loads settings, probes the desktop notification service, publishes a
//! daemon record for front-ends, and runs the reminder service until
//! SIGTERM/SIGINT. SIGUSR1 shows a reminder immediately.

use std::sync::Arc;
use tracing::{error, info, warn};

use eyes_core::control::{self, DaemonRecord};
use eyes_core::ReminderService;

mod desktop;
mod logging;
mod settings;
mod signals;

use desktop::DesktopSink;

fn main() {
    let _logging_guard = logging::init();

    let settings_path = match settings::settings_path() {
        Ok(path) => path,
        Err(err) => {
            error!(error = %err, "Failed to resolve settings path");
            std::process::exit(1);
        }
    };

    let settings = match settings::load_settings(&settings_path) {
        Ok(settings) => settings,
        Err(err) => {
            error!(error = %err, "Failed to load settings");
            std::process::exit(1);
        }
    };

    let config = match settings.reminder_config() {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "Invalid reminder settings");
            std::process::exit(1);
        }
    };

    let sink = match DesktopSink::detect() {
        Ok(sink) => sink,
        Err(err) => {
            error!(error = %err, "No desktop notification support");
            std::process::exit(1);
        }
    };

    let service = match ReminderService::new(config, Arc::new(sink)) {
        Ok(service) => service,
        Err(err) => {
            error!(error = %err, "Failed to create reminder service");
            std::process::exit(1);
        }
    };

    let record_path = match control::default_record_path() {
        Ok(path) => path,
        Err(err) => {
            error!(error = %err, "Failed to resolve daemon record path");
            std::process::exit(1);
        }
    };
    let record = DaemonRecord::for_current_process(
        settings.interval_minutes,
        settings.snooze_minutes,
        settings.advanced_mode,
    );
    if let Err(err) = control::write_daemon_record(&record_path, &record) {
        error!(error = %err, path = %record_path.display(), "Failed to write daemon record");
        std::process::exit(1);
    }

    let requests = match signals::install() {
        Ok(requests) => requests,
        Err(err) => {
            warn!(error = %err, "Signal control unavailable");
            signals::SignalRequests::default()
        }
    };
    let watcher = signals::spawn_watcher(requests, service.control());

    info!(
        pid = record.pid,
        settings = %settings_path.display(),
        "Eyes daemon started"
    );
    let result = service.run();

    if let Err(err) = control::remove_daemon_record(&record_path, record.pid) {
        warn!(error = %err, "Failed to remove daemon record");
    }
    if watcher.join().is_err() {
        warn!("Signal watcher panicked");
    }

    if let Err(err) = result {
        error!(error = %err, "Reminder service failed");
        std::process::exit(1);
    }
}
