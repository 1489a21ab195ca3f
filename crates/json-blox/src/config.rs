//! TOML configuration.
//!
//! ```toml
//! [view]
//! row_height = 48.0
//! viewport_height = 720.0
//!
//! [share]
//! ttl_days = 90
//! origin = "https://blox.example"
//! store_dir = "shares"
//!
//! [confirm]
//! window_ms = 2000
//! ```
//!
//! Every key is optional. A missing file is the same as an empty one.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::confirm::MAX_WINDOW;
use crate::error::ConfigError;
use crate::share::MAX_TTL_DAYS;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub view: ViewConfig,
    pub share: ShareConfig,
    pub confirm: ConfirmConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub row_height: f64,
    pub viewport_height: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        ViewConfig {
            row_height: 48.0,
            viewport_height: 720.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareConfig {
    pub ttl_days: i64,
    /// Base of generated share links.
    pub origin: String,
    /// Directory for the file-backed store.
    pub store_dir: PathBuf,
}

impl Default for ShareConfig {
    fn default() -> Self {
        ShareConfig {
            ttl_days: crate::share::DEFAULT_TTL_DAYS,
            origin: "http://localhost:3000".to_string(),
            store_dir: PathBuf::from(".json-blox/shares"),
        }
    }
}

impl ShareConfig {
    /// `ttl_days` as a duration, clamped to `1..=MAX_TTL_DAYS`.
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::days(self.ttl_days.clamp(1, MAX_TTL_DAYS))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfirmConfig {
    pub window_ms: u64,
}

impl Default for ConfirmConfig {
    fn default() -> Self {
        ConfirmConfig {
            window_ms: crate::confirm::DEFAULT_WINDOW.as_millis() as u64,
        }
    }
}

impl ConfirmConfig {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms).min(MAX_WINDOW)
    }
}

impl Config {
    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.display().to_string(),
            source,
        })?;
        config.validate().map_err(|reason| ConfigError::Invalid {
            path: origin.display().to_string(),
            reason,
        })?;
        Ok(config)
    }

    /// Rejects values the share and confirm layers cannot represent.
    pub fn validate(&self) -> Result<(), String> {
        if !(1..=MAX_TTL_DAYS).contains(&self.share.ttl_days) {
            return Err(format!(
                "share.ttl_days must be between 1 and {MAX_TTL_DAYS}, got {}",
                self.share.ttl_days
            ));
        }
        let max_window_ms = MAX_WINDOW.as_millis() as u64;
        if self.confirm.window_ms > max_window_ms {
            return Err(format!(
                "confirm.window_ms must be at most {max_window_ms}, got {}",
                self.confirm.window_ms
            ));
        }
        Ok(())
    }

    /// Loads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml_str(&text, path),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "config not found, using defaults");
                Ok(Config::default())
            }
            Err(source) => Err(ConfigError::Read {
                path: path.display().to_string(),
                source,
            }),
        }
    }
}
