//! Desktop notification sink backed by notify-rust.
//!
//! Freedesktop servers that advertise `actions` get the reminder's action
//! buttons and the sink waits for the user's choice. Everywhere else the
//! notification is fire-and-forget and the core's auto-dismiss takes over.

use eyes_core::{ActionResult, NotificationError, NotificationRequest, NotificationSink};
use notify_rust::{Notification, Timeout};
use tracing::info;

const APP_NAME: &str = "Eyes";

pub struct DesktopSink {
    actions: bool,
}

impl DesktopSink {
    /// Probes the host notification service.
    pub fn detect() -> Result<Self, NotificationError> {
        let actions = platform::detect_action_support()?;
        info!(actions, "Desktop notifications available");
        Ok(Self { actions })
    }
}

impl NotificationSink for DesktopSink {
    fn notify(
        &self,
        request: &NotificationRequest,
    ) -> Result<Option<ActionResult>, NotificationError> {
        let mut notification = Notification::new();
        notification
            .appname(APP_NAME)
            .summary(&request.title)
            .body(&request.body);
        if let Some(timeout) = request.timeout {
            let millis = u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX);
            notification.timeout(Timeout::Milliseconds(millis));
        }

        if self.actions {
            platform::show_with_actions(&mut notification, request)
        } else {
            notification
                .show()
                .map(|_| None)
                .map_err(|err| NotificationError::Failed(err.to_string()))
        }
    }

    fn supports_actions(&self) -> bool {
        self.actions
    }
}

#[cfg(all(unix, not(target_os = "macos")))]
mod platform {
    use super::*;
    use tracing::debug;

    const CLOSED_ACTION: &str = "__closed";
    const DEFAULT_ACTION: &str = "default";

    pub(super) fn detect_action_support() -> Result<bool, NotificationError> {
        let server = notify_rust::get_server_information()
            .map_err(|err| NotificationError::Unavailable(err.to_string()))?;
        debug!(name = %server.name, vendor = %server.vendor, "Notification server found");

        let capabilities = notify_rust::get_capabilities()
            .map_err(|err| NotificationError::Unavailable(err.to_string()))?;
        Ok(capabilities.iter().any(|capability| capability == "actions"))
    }

    /// Shows the notification and blocks until an action is invoked or the
    /// notification closes.
    pub(super) fn show_with_actions(
        notification: &mut Notification,
        request: &NotificationRequest,
    ) -> Result<Option<ActionResult>, NotificationError> {
        for action in &request.actions {
            notification.action(&action.id, &action.label);
        }
        let handle = notification
            .show()
            .map_err(|err| NotificationError::Failed(err.to_string()))?;
        if !request.has_actions() {
            return Ok(None);
        }

        let mut result = None;
        handle.wait_for_action(|action| result = action_result(action));
        Ok(result)
    }

    pub(super) fn action_result(action: &str) -> Option<ActionResult> {
        match action {
            CLOSED_ACTION => Some(ActionResult::TimedOut),
            // Clicking the notification body counts as taking the break.
            DEFAULT_ACTION => Some(ActionResult::Acknowledged),
            id => ActionResult::from_action_id(id),
        }
    }
}

#[cfg(not(all(unix, not(target_os = "macos"))))]
mod platform {
    use super::*;

    pub(super) fn detect_action_support() -> Result<bool, NotificationError> {
        Ok(false)
    }

    pub(super) fn show_with_actions(
        notification: &mut Notification,
        _request: &NotificationRequest,
    ) -> Result<Option<ActionResult>, NotificationError> {
        notification
            .show()
            .map(|_| None)
            .map_err(|err| NotificationError::Failed(err.to_string()))
    }
}
