use std::{env, path::PathBuf, time::Duration};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationPermission {
    Granted,
    Denied,
}

impl NotificationPermission {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "granted" | "on" | "true" | "1" => Some(Self::Granted),
            "denied" | "off" | "false" | "0" => Some(Self::Denied),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub reminder_interval: Duration,
    pub notifications: NotificationPermission,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            data_path: PathBuf::from("data/items.json"),
            reminder_interval: Duration::from_secs(60 * 60),
            notifications: NotificationPermission::Granted,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            port: lookup("PORT")
                .and_then(|value| value.parse::<u16>().ok())
                .unwrap_or(defaults.port),
            data_path: lookup("APP_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_path),
            reminder_interval: lookup("REMINDER_INTERVAL_SECS")
                .and_then(|value| value.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.reminder_interval),
            notifications: lookup("APP_NOTIFICATIONS")
                .as_deref()
                .and_then(NotificationPermission::parse)
                .unwrap_or(defaults.notifications),
        }
    }
}
