//! Error types for eyes-core operations.

use std::path::PathBuf;

// ═══════════════════════════════════════════════════════════════════════════════
// Sink Error (returned by NotificationSink implementations)
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors a notification sink can report.
///
/// `Unavailable` is only meaningful at startup (see [`crate::NotificationSink::probe`]);
/// a `Failed` notify call during normal operation is recovered by the state machine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotificationError {
    #[error("Notification capability unavailable: {0}")]
    Unavailable(String),

    #[error("Notification failed: {0}")]
    Failed(String),
}

// ═══════════════════════════════════════════════════════════════════════════════
// Internal Error
// ═══════════════════════════════════════════════════════════════════════════════

/// All errors that can occur in eyes-core operations.
#[derive(Debug, thiserror::Error)]
pub enum EyesError {
    // ─────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Interval must be at least 1 unit (got {0})")]
    InvalidInterval(u64),

    #[error("Snooze duration must be at least 1 unit (got {0})")]
    InvalidSnooze(u64),

    #[error("Time unit must be greater than zero")]
    InvalidUnit,

    // ─────────────────────────────────────────────────────────────────────
    // Service Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("No notification capability on this host: {0}")]
    SinkUnavailable(#[source] NotificationError),

    #[error("Reminder service is already running")]
    AlreadyRunning,

    // ─────────────────────────────────────────────────────────────────────
    // Daemon Control Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to signal process {pid}: {source}")]
    Signal {
        pid: u32,
        #[source]
        source: std::io::Error,
    },

    #[error("Platform not supported for this operation: {0}")]
    UnsupportedPlatform(String),
}

/// Convenience type alias for Results using EyesError.
pub type Result<T> = std::result::Result<T, EyesError>;
