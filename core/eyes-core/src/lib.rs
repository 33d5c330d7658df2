//! # eyes-core
//!
//! Reminder scheduling and state machine for Eyes, a background utility that
//! prompts 20-20-20 eye breaks.
//!
//! ## Design Principles
//!
//! - **Synchronous**: std threads and channels, no async runtime.
//! - **Single writer**: only [`ReminderStateMachine`] mutates reminder state,
//!   always under its own lock, never across a sink call.
//! - **Platform-agnostic**: rendering lives behind [`NotificationSink`];
//!   front-ends pick an implementation for the host.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use eyes_core::{ReminderConfig, ReminderService};
//!
//! let config = ReminderConfig::from_minutes(20, 5, true)?;
//! let service = ReminderService::new(config, sink)?;
//! let control = service.control(); // hand to a signal watcher
//! service.run()?;
//! ```

pub mod clock;
pub mod config;
pub mod control;
pub mod error;
pub mod machine;
pub mod notification;
pub mod service;

pub use clock::{ClockEvent, ReminderClock};
pub use config::ReminderConfig;
pub use control::DaemonRecord;
pub use error::{EyesError, NotificationError, Result};
pub use machine::{ReminderSnapshot, ReminderState, ReminderStateMachine, ShowOutcome};
pub use notification::{ActionResult, NotificationAction, NotificationRequest, NotificationSink};
pub use service::{ReminderService, ServiceControl};
