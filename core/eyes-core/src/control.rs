//! External control of a running daemon.
//!
//! The daemon publishes a small JSON record (`~/.eyes/daemon.json`) naming
//! its PID. Front-ends read it and deliver SIGUSR1 (show now) or SIGTERM
//! (graceful stop).

use chrono::{DateTime, Utc};
use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{EyesError, Result};

const EYES_DIR: &str = ".eyes";
const DAEMON_RECORD_FILE: &str = "daemon.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaemonRecord {
    pub pid: u32,
    pub started_at: DateTime<Utc>,
    pub interval_minutes: u64,
    pub snooze_minutes: u64,
    pub advanced_mode: bool,
}

impl DaemonRecord {
    pub fn for_current_process(
        interval_minutes: u64,
        snooze_minutes: u64,
        advanced_mode: bool,
    ) -> Self {
        Self {
            pid: std::process::id(),
            started_at: Utc::now(),
            interval_minutes,
            snooze_minutes,
            advanced_mode,
        }
    }
}

/// Returns `~/.eyes`.
pub fn eyes_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(EYES_DIR))
        .ok_or(EyesError::HomeDirNotFound)
}

pub fn default_record_path() -> Result<PathBuf> {
    Ok(eyes_dir()?.join(DAEMON_RECORD_FILE))
}

/// Writes the record atomically (temp file + rename).
pub fn write_daemon_record(path: &Path, record: &DaemonRecord) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| EyesError::Io {
            context: "Failed to create daemon record dir".to_string(),
            source,
        })?;
    }

    let payload = serde_json::to_vec_pretty(record).map_err(|source| EyesError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, payload).map_err(|source| EyesError::Io {
        context: "Failed to write daemon record".to_string(),
        source,
    })?;
    fs::rename(&tmp_path, path).map_err(|source| EyesError::Io {
        context: "Failed to commit daemon record".to_string(),
        source,
    })
}

/// Reads the record. A missing file is `Ok(None)`.
pub fn read_daemon_record(path: &Path) -> Result<Option<DaemonRecord>> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(EyesError::Io {
                context: "Failed to read daemon record".to_string(),
                source,
            })
        }
    };

    serde_json::from_slice(&data)
        .map(Some)
        .map_err(|source| EyesError::Json {
            path: path.to_path_buf(),
            source,
        })
}

/// Removes the record if it still names `pid`, so a newer daemon's record
/// is never deleted by an exiting one.
pub fn remove_daemon_record(path: &Path, pid: u32) -> Result<bool> {
    match read_daemon_record(path)? {
        Some(record) if record.pid == pid => {
            fs::remove_file(path).map_err(|source| EyesError::Io {
                context: "Failed to remove daemon record".to_string(),
                source,
            })?;
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// Asks the daemon with `pid` to show a reminder now.
pub fn request_show(pid: u32) -> Result<()> {
    send_signal(checked_target(pid)?, ControlSignal::Show)
}

/// Asks the daemon with `pid` to stop gracefully.
pub fn request_stop(pid: u32) -> Result<()> {
    send_signal(checked_target(pid)?, ControlSignal::Stop)
}

/// PID 0 addresses the caller's whole process group, and our own PID would
/// signal the caller; a corrupt record must reach neither.
fn checked_target(pid: u32) -> Result<u32> {
    if pid == 0 || pid == std::process::id() {
        return Err(EyesError::Signal {
            pid,
            source: std::io::Error::from(std::io::ErrorKind::InvalidInput),
        });
    }
    Ok(pid)
}

#[derive(Debug, Clone, Copy)]
enum ControlSignal {
    Show,
    Stop,
}

#[cfg(unix)]
fn send_signal(pid: u32, signal: ControlSignal) -> Result<()> {
    let signum = match signal {
        ControlSignal::Show => libc::SIGUSR1,
        ControlSignal::Stop => libc::SIGTERM,
    };
    let target = libc::pid_t::try_from(pid).map_err(|_| EyesError::Signal {
        pid,
        source: std::io::Error::from(std::io::ErrorKind::InvalidInput),
    })?;
    // SAFETY: kill(2) has no memory-safety preconditions; failure is reported via errno.
    let rc = unsafe { libc::kill(target, signum) };
    if rc == 0 {
        Ok(())
    } else {
        Err(EyesError::Signal {
            pid,
            source: std::io::Error::last_os_error(),
        })
    }
}

#[cfg(not(unix))]
fn send_signal(_pid: u32, signal: ControlSignal) -> Result<()> {
    Err(EyesError::UnsupportedPlatform(format!(
        "{:?} signal delivery requires a Unix host",
        signal
    )))
}
