//! Daemon settings file (`~/.eyes/config.toml`, or `$EYES_CONFIG`).

use eyes_core::config::{DEFAULT_INTERVAL_MINUTES, DEFAULT_SNOOZE_MINUTES};
use eyes_core::{ReminderConfig, Result as EyesResult};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_CONFIG_RELATIVE_PATH: &str = ".eyes/config.toml";
const CONFIG_ENV: &str = "EYES_CONFIG";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct DaemonSettings {
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u64,
    #[serde(default = "default_snooze_minutes")]
    pub snooze_minutes: u64,
    #[serde(default = "default_advanced_mode")]
    pub advanced_mode: bool,
    #[serde(default)]
    pub notification: NotificationSettings,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct NotificationSettings {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub auto_dismiss_secs: Option<u64>,
}

impl Default for DaemonSettings {
    fn default() -> Self {
        Self {
            interval_minutes: default_interval_minutes(),
            snooze_minutes: default_snooze_minutes(),
            advanced_mode: default_advanced_mode(),
            notification: NotificationSettings::default(),
        }
    }
}

impl DaemonSettings {
    /// Validates the settings into a reminder config.
    pub fn reminder_config(&self) -> EyesResult<ReminderConfig> {
        let mut config = ReminderConfig::from_minutes(
            self.interval_minutes,
            self.snooze_minutes,
            self.advanced_mode,
        )?;

        let notification = &self.notification;
        if notification.title.is_some() || notification.body.is_some() {
            let title = notification
                .title
                .clone()
                .unwrap_or_else(|| config.title().to_string());
            let body = notification
                .body
                .clone()
                .unwrap_or_else(|| config.body().to_string());
            config = config.with_message(title, body);
        }
        if let Some(secs) = notification.timeout_secs {
            config = config.notification_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = notification.auto_dismiss_secs {
            config = config.auto_dismiss_after(Duration::from_secs(secs));
        }
        Ok(config)
    }
}

fn default_interval_minutes() -> u64 {
    DEFAULT_INTERVAL_MINUTES
}

fn default_snooze_minutes() -> u64 {
    DEFAULT_SNOOZE_MINUTES
}

fn default_advanced_mode() -> bool {
    true
}

pub fn settings_path() -> Result<PathBuf, String> {
    if let Ok(path) = env::var(CONFIG_ENV) {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }
    let home = dirs::home_dir().ok_or_else(|| "Home directory not found".to_string())?;
    Ok(home.join(DEFAULT_CONFIG_RELATIVE_PATH))
}

/// Loads settings, falling back to defaults when the file does not exist.
pub fn load_settings(path: &Path) -> Result<DaemonSettings, String> {
    if !path.exists() {
        return Ok(DaemonSettings::default());
    }

    let content = fs_err::read_to_string(path)
        .map_err(|err| format!("Failed to read settings {}: {}", path.display(), err))?;
    toml::from_str::<DaemonSettings>(&content)
        .map_err(|err| format!("Failed to parse settings {}: {}", path.display(), err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use eyes_core::EyesError;

    #[test]
    fn load_settings_defaults_when_file_missing() {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let path = temp_dir.path().join("missing.toml");
        let settings = load_settings(&path).expect("load settings");
        assert_eq!(settings, DaemonSettings::default());
        assert_eq!(settings.interval_minutes, 20);
        assert_eq!(settings.snooze_minutes, 5);
        assert!(settings.advanced_mode);
    }

    #[test]
    fn load_settings_parses_values_and_notification_table() {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let path = temp_dir.path().join("config.toml");
        fs_err::write(
            &path,
            r#"
interval_minutes = 30
advanced_mode = false

[notification]
title = "Rest"
timeout_secs = 15
auto_dismiss_secs = 45
"#,
        )
        .expect("write settings");

        let settings = load_settings(&path).expect("load settings");
        assert_eq!(settings.interval_minutes, 30);
        assert_eq!(settings.snooze_minutes, 5);
        assert!(!settings.advanced_mode);

        let config = settings.reminder_config().expect("valid config");
        assert_eq!(config.interval(), Duration::from_secs(30 * 60));
        assert_eq!(config.title(), "Rest");
        assert_eq!(config.body(), eyes_core::config::DEFAULT_BODY);
        assert_eq!(config.timeout(), Duration::from_secs(15));
        assert_eq!(config.auto_dismiss(), Duration::from_secs(45));
    }

    #[test]
    fn malformed_settings_are_an_error() {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let path = temp_dir.path().join("config.toml");
        fs_err::write(&path, "interval_minutes = \"soon\"").expect("write settings");
        let err = load_settings(&path).unwrap_err();
        assert!(err.contains("Failed to parse settings"));
    }

    #[test]
    fn zero_snooze_fails_validation() {
        let settings = DaemonSettings {
            snooze_minutes: 0,
            ..DaemonSettings::default()
        };
        assert!(matches!(
            settings.reminder_config(),
            Err(EyesError::InvalidSnooze(0))
        ));
    }
}
