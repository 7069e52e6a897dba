//! TOML configuration.
//!
//! Every key is optional; a missing default file yields `Config::default()`.
//! Unknown keys are rejected so that typos surface with a line/column error
//! instead of being silently ignored.
//!
//! ```toml
//! app_name = "PasteBridge"
//!
//! [timeouts]
//! key_press_ms = 1000
//! text_ms = 5000
//!
//! [clipboard]
//! settle_ms = 100
//!
//! [keep_alive]
//! gap_ms = 100
//! interval_secs = 60
//!
//! [notifications]
//! enabled = true
//! sound_file = "assets/notification.wav"
//!
//! [delivery]
//! auto_submit = false
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::platform::AdapterSettings;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub app_name: String,
    pub timeouts: TimeoutConfig,
    pub clipboard: ClipboardConfig,
    pub keep_alive: KeepAliveConfig,
    pub notifications: NotificationConfig,
    pub delivery: DeliveryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "PasteBridge".into(),
            timeouts: TimeoutConfig::default(),
            clipboard: ClipboardConfig::default(),
            keep_alive: KeepAliveConfig::default(),
            notifications: NotificationConfig::default(),
            delivery: DeliveryConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimeoutConfig {
    /// Single key-press invocation.
    pub key_press_ms: u64,
    /// Typing a whole string, or writing the clipboard.
    pub text_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            key_press_ms: 1000,
            text_ms: 5000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClipboardConfig {
    pub settle_ms: u64,
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self { settle_ms: 100 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeepAliveConfig {
    /// Gap between the two Scroll Lock taps.
    pub gap_ms: u64,
    /// Period of the `keep-alive` CLI loop.
    pub interval_secs: u64,
}

impl Default for KeepAliveConfig {
    fn default() -> Self {
        Self {
            gap_ms: 100,
            interval_secs: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotificationConfig {
    pub enabled: bool,
    pub sound_file: PathBuf,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sound_file: PathBuf::from("assets/notification.wav"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeliveryConfig {
    /// Send Ctrl+Enter after a successful paste.
    pub auto_submit: bool,
}

/// `<config_dir>/pastebridge/config.toml`.
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pastebridge").join("config.toml"))
}

impl Config {
    /// Loads `path`, or the default location when `None`.
    ///
    /// An explicit path must exist; the default one may be absent.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => match default_path() {
                Some(path) if path.is_file() => Self::from_file(&path),
                _ => {
                    log::debug!("config: no config file, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("config: loaded {}", path.display());
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn adapter_settings(&self) -> AdapterSettings {
        AdapterSettings {
            app_name: self.app_name.clone(),
            key_timeout: Duration::from_millis(self.timeouts.key_press_ms),
            text_timeout: Duration::from_millis(self.timeouts.text_ms),
            keep_alive_gap: Duration::from_millis(self.keep_alive.gap_ms),
            clipboard_settle: Duration::from_millis(self.clipboard.settle_ms),
            sound_file: self.notifications.sound_file.clone(),
        }
    }

    pub fn keep_alive_interval(&self) -> Duration {
        Duration::from_secs(self.keep_alive.interval_secs)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
