//! Reminder configuration.
//!
//! A [`ReminderConfig`] is validated once at construction and never mutated
//! while a service is running. Intervals are expressed in whole "units"
//! (minutes for real use, milliseconds in tests).

use std::time::Duration;

use crate::error::{EyesError, Result};

pub const DEFAULT_INTERVAL_MINUTES: u64 = 20;
pub const DEFAULT_SNOOZE_MINUTES: u64 = 5;

/// A shown reminder still unanswered after this long returns to Idle.
pub const DEFAULT_AUTO_DISMISS: Duration = Duration::from_secs(30);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
/// Floor for the run-loop poll interval.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);
pub const DEFAULT_NOTIFICATION_TIMEOUT: Duration = Duration::from_secs(10);

pub const DEFAULT_TITLE: &str = "👁️ Eye Break Time!";
pub const DEFAULT_BODY: &str = "Look at something 20 feet away for 20 seconds (20-20-20 rule)";

const MINUTE: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderConfig {
    unit: Duration,
    interval: Duration,
    snooze: Duration,
    advanced_mode: bool,
    auto_dismiss: Duration,
    poll_interval: Duration,
    notification_timeout: Duration,
    title: String,
    body: String,
}

impl ReminderConfig {
    /// Builds a config whose unit is one minute.
    pub fn from_minutes(
        interval_minutes: u64,
        snooze_minutes: u64,
        advanced_mode: bool,
    ) -> Result<Self> {
        Self::with_unit(interval_minutes, snooze_minutes, advanced_mode, MINUTE)
    }

    /// Builds a config with an arbitrary time unit.
    ///
    /// Fails if `unit` is zero or either `interval` or `snooze` is below one
    /// unit. The run-loop poll interval never exceeds one unit.
    pub fn with_unit(
        interval: u64,
        snooze: u64,
        advanced_mode: bool,
        unit: Duration,
    ) -> Result<Self> {
        if unit.is_zero() {
            return Err(EyesError::InvalidUnit);
        }
        if interval < 1 {
            return Err(EyesError::InvalidInterval(interval));
        }
        if snooze < 1 {
            return Err(EyesError::InvalidSnooze(snooze));
        }

        Ok(Self {
            unit,
            interval: scale(unit, interval),
            snooze: scale(unit, snooze),
            advanced_mode,
            auto_dismiss: DEFAULT_AUTO_DISMISS,
            poll_interval: max_poll(unit),
            notification_timeout: DEFAULT_NOTIFICATION_TIMEOUT,
            title: DEFAULT_TITLE.to_string(),
            body: DEFAULT_BODY.to_string(),
        })
    }

    pub fn auto_dismiss_after(mut self, timeout: Duration) -> Self {
        self.auto_dismiss = timeout;
        self
    }

    /// Overrides the run-loop poll interval. Clamped to one unit (and at
    /// most one second), never below [`MIN_POLL_INTERVAL`].
    pub fn poll_every(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(MIN_POLL_INTERVAL).min(max_poll(self.unit));
        self
    }

    pub fn notification_timeout(mut self, timeout: Duration) -> Self {
        self.notification_timeout = timeout;
        self
    }

    pub fn with_message(mut self, title: impl Into<String>, body: impl Into<String>) -> Self {
        self.title = title.into();
        self.body = body.into();
        self
    }

    pub fn unit(&self) -> Duration {
        self.unit
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn snooze(&self) -> Duration {
        self.snooze
    }

    pub fn advanced_mode(&self) -> bool {
        self.advanced_mode
    }

    pub fn auto_dismiss(&self) -> Duration {
        self.auto_dismiss
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn timeout(&self) -> Duration {
        self.notification_timeout
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Label for the snooze action button, e.g. "Snooze 5 min".
    pub fn snooze_label(&self) -> String {
        let secs = self.snooze.as_secs();
        if secs >= 60 && secs % 60 == 0 {
            format!("Snooze {} min", secs / 60)
        } else if secs >= 1 {
            format!("Snooze {} s", secs)
        } else {
            "Snooze".to_string()
        }
    }
}

fn max_poll(unit: Duration) -> Duration {
    DEFAULT_POLL_INTERVAL.min(unit).max(MIN_POLL_INTERVAL)
}

fn scale(unit: Duration, count: u64) -> Duration {
    let count = u32::try_from(count).unwrap_or(u32::MAX);
    unit.saturating_mul(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_minutes_scales_to_minutes() {
        let config = ReminderConfig::from_minutes(20, 5, true).unwrap();
        assert_eq!(config.interval(), Duration::from_secs(20 * 60));
        assert_eq!(config.snooze(), Duration::from_secs(5 * 60));
        assert!(config.advanced_mode());
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.auto_dismiss(), DEFAULT_AUTO_DISMISS);
    }

    #[test]
    fn zero_interval_is_rejected() {
        let err = ReminderConfig::from_minutes(0, 5, true).unwrap_err();
        assert!(matches!(err, EyesError::InvalidInterval(0)));
    }

    #[test]
    fn zero_snooze_is_rejected() {
        let err = ReminderConfig::from_minutes(20, 0, false).unwrap_err();
        assert!(matches!(err, EyesError::InvalidSnooze(0)));
    }

    #[test]
    fn poll_interval_never_exceeds_one_unit() {
        let unit = Duration::from_millis(10);
        let config = ReminderConfig::with_unit(3, 1, false, unit).unwrap();
        assert_eq!(config.poll_interval(), unit);

        let config = config.poll_every(Duration::from_millis(500));
        assert_eq!(config.poll_interval(), unit);

        let config = ReminderConfig::from_minutes(20, 5, false)
            .unwrap()
            .poll_every(Duration::from_secs(5));
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
    }

    #[test]
    fn zero_poll_interval_is_raised_to_floor() {
        let config = ReminderConfig::with_unit(3, 1, false, Duration::from_millis(10))
            .unwrap()
            .poll_every(Duration::ZERO);
        assert_eq!(config.poll_interval(), MIN_POLL_INTERVAL);
    }

    #[test]
    fn zero_unit_is_rejected() {
        let err = ReminderConfig::with_unit(20, 5, true, Duration::ZERO).unwrap_err();
        assert!(matches!(err, EyesError::InvalidUnit));
    }

    #[test]
    fn snooze_label_follows_duration() {
        let config = ReminderConfig::from_minutes(20, 5, true).unwrap();
        assert_eq!(config.snooze_label(), "Snooze 5 min");

        let config = ReminderConfig::with_unit(1, 45, true, Duration::from_secs(1)).unwrap();
        assert_eq!(config.snooze_label(), "Snooze 45 s");

        let config = ReminderConfig::with_unit(1, 5, true, Duration::from_millis(10)).unwrap();
        assert_eq!(config.snooze_label(), "Snooze");
    }

    #[test]
    fn with_message_overrides_defaults() {
        let config = ReminderConfig::from_minutes(20, 5, false)
            .unwrap()
            .with_message("Break", "Rest your eyes");
        assert_eq!(config.title(), "Break");
        assert_eq!(config.body(), "Rest your eyes");
    }
}
