//! Notification request/result types and the sink capability.
//!
//! The platform layer implements [`NotificationSink`]; the core only builds
//! [`NotificationRequest`]s and interprets the [`ActionResult`] it gets back.

use serde::Serialize;
use std::time::Duration;

use crate::config::ReminderConfig;
use crate::error::NotificationError;

pub const ACTION_ACKNOWLEDGE: &str = "acknowledge";
pub const ACTION_SNOOZE: &str = "snooze";

const ACKNOWLEDGE_LABEL: &str = "Take Break";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationAction {
    pub label: String,
    pub id: String,
}

impl NotificationAction {
    pub fn new(label: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            id: id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationRequest {
    pub title: String,
    pub body: String,
    pub timeout: Option<Duration>,
    pub actions: Vec<NotificationAction>,
}

impl NotificationRequest {
    /// Builds the reminder request. Actions are only attached when both
    /// advanced mode is on and the sink can report which one was chosen.
    pub fn reminder(config: &ReminderConfig, offer_actions: bool) -> Self {
        let actions = if config.advanced_mode() && offer_actions {
            vec![
                NotificationAction::new(ACKNOWLEDGE_LABEL, ACTION_ACKNOWLEDGE),
                NotificationAction::new(config.snooze_label(), ACTION_SNOOZE),
            ]
        } else {
            Vec::new()
        };

        Self {
            title: config.title().to_string(),
            body: config.body().to_string(),
            timeout: Some(config.timeout()),
            actions,
        }
    }

    pub fn has_actions(&self) -> bool {
        !self.actions.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionResult {
    Acknowledged,
    Snoozed,
    TimedOut,
}

impl ActionResult {
    /// Maps an action id back to a result. Unknown ids yield `None`.
    pub fn from_action_id(id: &str) -> Option<Self> {
        match id {
            ACTION_ACKNOWLEDGE => Some(Self::Acknowledged),
            ACTION_SNOOZE => Some(Self::Snoozed),
            _ => None,
        }
    }
}

/// Platform notification capability.
///
/// `notify` may block (e.g. while waiting for the user to click an action);
/// the state machine never holds its lock across the call.
///
/// Returning `Ok(None)` means no action was reported; the auto-dismiss timer
/// armed when the reminder was shown returns the machine to Idle. An answer
/// that arrives after auto-dismiss is ignored.
pub trait NotificationSink: Send + Sync {
    fn notify(
        &self,
        request: &NotificationRequest,
    ) -> Result<Option<ActionResult>, NotificationError>;

    /// Whether this sink can report back which action the user chose.
    fn supports_actions(&self) -> bool {
        false
    }

    /// Checked once when a service is built.
    fn probe(&self) -> Result<(), NotificationError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advanced_request_offers_snooze_aware_actions() {
        let config = ReminderConfig::from_minutes(20, 7, true).unwrap();
        let request = NotificationRequest::reminder(&config, true);
        assert_eq!(
            request.actions,
            vec![
                NotificationAction::new("Take Break", ACTION_ACKNOWLEDGE),
                NotificationAction::new("Snooze 7 min", ACTION_SNOOZE),
            ]
        );
        assert_eq!(request.timeout, Some(Duration::from_secs(10)));
    }

    #[test]
    fn simple_mode_never_offers_actions() {
        let config = ReminderConfig::from_minutes(20, 5, false).unwrap();
        let request = NotificationRequest::reminder(&config, true);
        assert!(!request.has_actions());
        assert_eq!(request.title, crate::config::DEFAULT_TITLE);
    }

    #[test]
    fn actions_dropped_when_sink_cannot_report_them() {
        let config = ReminderConfig::from_minutes(20, 5, true).unwrap();
        let request = NotificationRequest::reminder(&config, false);
        assert!(!request.has_actions());
    }

    #[test]
    fn action_ids_map_to_results() {
        assert_eq!(
            ActionResult::from_action_id("acknowledge"),
            Some(ActionResult::Acknowledged)
        );
        assert_eq!(
            ActionResult::from_action_id("snooze"),
            Some(ActionResult::Snoozed)
        );
        assert_eq!(ActionResult::from_action_id("default"), None);
    }
}
